//! # liblichess
//!
//! Async Rust client for the Lichess API.
//!
//! This library provides a typed interface to lichess.org, supporting:
//! - Long-lived NDJSON streams as cancellable async iterators
//! - Plain JSON and NDJSON resource requests
//! - Token authentication
//! - Pluggable HTTP transport for testing
//!
//! ## Quick Start
//!
//! ```ignore
//! use liblichess::{ExportByIdOptions, LichessClient, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let client = LichessClient::new()?;
//!     let game = client
//!         .games()
//!         .export_by_id("q7ZvsdUF", &ExportByIdOptions::default())
//!         .await?;
//!     println!("{} ({})", game.id, game.status);
//!     Ok(())
//! }
//! ```
//!
//! ## Streaming
//!
//! ```ignore
//! use futures::StreamExt;
//! use liblichess::{GameStreamEvent, LichessClient};
//! use tokio_util::sync::CancellationToken;
//!
//! let client = LichessClient::new()?;
//! let cancel = CancellationToken::new();
//! let (mut stream, _meta) = client.games().stream_game_moves(&cancel, "LuGQwhBb").await?;
//! while let Some(event) = stream.next().await {
//!     match event {
//!         GameStreamEvent::Description(game) => println!("position {}", game.fen),
//!         GameStreamEvent::MoveDelta(mv) => println!("{}", mv.last_move),
//!         GameStreamEvent::DecodeError(err) => eprintln!("{err}"),
//!     }
//! }
//! ```
//!
//! Cancelling the token, or dropping the stream, closes the connection.
//!
//! ## Configuration
//!
//! ```ignore
//! use std::time::Duration;
//! use liblichess::LichessClient;
//!
//! let client = LichessClient::builder()
//!     .token_from_env()
//!     .timeout(Duration::from_secs(30))
//!     .stream_buffer(16)
//!     .build()?;
//! ```

mod client;
pub mod config;
mod error;
mod games;
pub mod protocol;
mod puzzles;
pub mod stream;
pub mod transport;

pub use error::{Error, Result};

// Re-export the main client types at crate root
pub use client::{ClientBuilder, LichessClient};
pub use games::Games;
pub use puzzles::Puzzles;

// Re-export commonly used config types at crate root
pub use config::{
    AuthMethod, ClientConfig, ClientConfigBuilder, Color, ExportByIdOptions,
    ExportByUsernameOptions, PuzzleActivityOptions, QueryOptions, SortOrder,
    StreamGamesOfUsersOptions,
};

// Re-export commonly used protocol types at crate root
pub use protocol::{DailyPuzzle, Game, GameDescription, GameMove, GameStream, PuzzleRound};

// Re-export commonly used stream types at crate root
pub use stream::{
    with_deadline, with_timeout, CollectedGame, Deadline, EventStream, GameEventStream,
    GameStreamEvent,
};

// Re-export transport types at crate root
pub use transport::{HttpTransport, ResponseMeta, Transport};
