//! Puzzle types.

use serde::{Deserialize, Serialize};

/// A Lichess puzzle.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Puzzle {
    #[serde(default)]
    pub id: String,
    /// Ply of the source game at which the puzzle starts.
    #[serde(default)]
    pub initial_ply: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fen: Option<String>,
    #[serde(default)]
    pub plays: u32,
    #[serde(default)]
    pub rating: u32,
    /// Expected moves in UCI notation.
    #[serde(default)]
    pub solution: Vec<String>,
    #[serde(default)]
    pub themes: Vec<String>,
}

/// One attempt at a puzzle from the puzzle activity feed.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PuzzleRound {
    /// Attempt time in milliseconds since Unix epoch.
    #[serde(default)]
    pub date: i64,
    #[serde(default)]
    pub win: bool,
    #[serde(default)]
    pub puzzle: Puzzle,
}

/// The daily puzzle together with the game it was taken from.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DailyPuzzle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game: Option<DailyPuzzleGame>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub puzzle: Option<Puzzle>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DailyPuzzleGame {
    /// Clock as displayed, e.g. `"3+0"`.
    #[serde(default)]
    pub clock: String,
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub perf: Option<DailyPuzzleGamePerf>,
    #[serde(default)]
    pub pgn: String,
    #[serde(default)]
    pub players: Vec<DailyPuzzleGamePlayer>,
    #[serde(default)]
    pub rated: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DailyPuzzleGamePerf {
    /// A speed or variant key.
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DailyPuzzleGamePlayer {
    #[serde(default)]
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flair: Option<String>,
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patron: Option<bool>,
    #[serde(default)]
    pub rating: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}
