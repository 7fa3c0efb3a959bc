//! JSON protocol types for the Lichess API.
//!
//! This module defines the resources exchanged with the Lichess web service.
//!
//! # Payload Families
//!
//! - Game exports: [`Game`] and its nested player, clock and analysis records
//! - Game move stream: [`GameDescription`] snapshots and [`GameMove`] deltas
//! - Games-by-users stream: [`GameStream`]
//! - Puzzles: [`Puzzle`], [`PuzzleRound`] and [`DailyPuzzle`]
//!
//! # Example
//!
//! ```
//! use liblichess::protocol::GameMove;
//!
//! let json = r#"{"fen": "8/8/8/8/8/8/8/8 w - - 0 1", "lm": "e2e4", "wc": 60, "bc": 58}"#;
//! let mv: GameMove = serde_json::from_str(json).unwrap();
//! assert_eq!(mv.last_move, "e2e4");
//! ```

mod events;
mod games;
mod puzzles;
mod users;

// Re-export all public types
pub use events::{GameDescription, GameMove, StatusInfo, VariantInfo};
pub use games::{
    Game, GameAnalysis, GameAnalysisJudgment, GameClock, GameOpening, GamePlayers, GameSpeed,
    GameStatus, GameStream, GameUser, GameUserAnalysis, GameVariant,
};
pub use puzzles::{
    DailyPuzzle, DailyPuzzleGame, DailyPuzzleGamePerf, DailyPuzzleGamePlayer, Puzzle, PuzzleRound,
};
pub use users::LightUser;
