//! Events delivered by game move streams.

use crate::protocol::{GameDescription, GameMove};
use crate::Error;

/// A decoded frame of a game move stream.
///
/// # Event Order
///
/// 1. `Description` - when the stream starts
/// 2. `MoveDelta` - once per move, in the order the moves were played
/// 3. `Description` - again when the game ends (not guaranteed)
///
/// `DecodeError` may appear anywhere a frame could not be decoded. If the
/// connection fails mid-stream, a `DecodeError` wrapping [`Error::Io`] is the
/// last event before the stream ends. A stream that simply ends without one
/// completed cleanly.
///
/// # Example
///
/// ```ignore
/// use futures::StreamExt;
/// use liblichess::GameStreamEvent;
///
/// let (mut stream, _meta) = client.games().stream_game_moves(&cancel, "LuGQwhBb").await?;
/// while let Some(event) = stream.next().await {
///     match event {
///         GameStreamEvent::Description(game) => println!("{} ({})", game.id, game.fen),
///         GameStreamEvent::MoveDelta(mv) => println!("{} {}s/{}s", mv.last_move, mv.white_clock, mv.black_clock),
///         GameStreamEvent::DecodeError(err) => eprintln!("bad frame: {err}"),
///     }
/// }
/// ```
#[derive(Debug)]
pub enum GameStreamEvent {
    /// Full snapshot of the game.
    Description(GameDescription),
    /// One move played.
    MoveDelta(GameMove),
    /// A frame failed to decode, or the body failed to read.
    DecodeError(Error),
}

impl GameStreamEvent {
    /// Check if this is a description event.
    pub fn is_description(&self) -> bool {
        matches!(self, GameStreamEvent::Description(_))
    }

    /// Check if this is a move event.
    pub fn is_move(&self) -> bool {
        matches!(self, GameStreamEvent::MoveDelta(_))
    }

    /// Check if this is an error marker.
    pub fn is_error(&self) -> bool {
        matches!(self, GameStreamEvent::DecodeError(_))
    }

    /// Get the description if this is a Description event.
    pub fn as_description(&self) -> Option<&GameDescription> {
        match self {
            GameStreamEvent::Description(d) => Some(d),
            _ => None,
        }
    }

    /// Get the move if this is a MoveDelta event.
    pub fn as_move(&self) -> Option<&GameMove> {
        match self {
            GameStreamEvent::MoveDelta(m) => Some(m),
            _ => None,
        }
    }

    /// Get the error if this is a DecodeError event.
    pub fn as_error(&self) -> Option<&Error> {
        match self {
            GameStreamEvent::DecodeError(e) => Some(e),
            _ => None,
        }
    }

    /// Current position after this event, if it carries one.
    pub fn fen(&self) -> Option<&str> {
        match self {
            GameStreamEvent::Description(d) => Some(&d.fen),
            GameStreamEvent::MoveDelta(m) => Some(&m.fen),
            GameStreamEvent::DecodeError(_) => None,
        }
    }
}

/// Everything a move stream delivered, gathered in order.
#[derive(Debug, Default)]
pub struct CollectedGame {
    /// Description snapshots (start, and end if the game finished).
    pub descriptions: Vec<GameDescription>,
    /// Moves in the order received.
    pub moves: Vec<GameMove>,
    /// Frame decode errors, in the order received.
    pub errors: Vec<Error>,
    /// The read failure that ended the stream, if any.
    pub io_error: Option<Error>,
}

impl CollectedGame {
    pub(crate) fn push(&mut self, event: GameStreamEvent) {
        match event {
            GameStreamEvent::Description(d) => self.descriptions.push(d),
            GameStreamEvent::MoveDelta(m) => self.moves.push(m),
            GameStreamEvent::DecodeError(e @ Error::Io(_)) => self.io_error = Some(e),
            GameStreamEvent::DecodeError(e) => self.errors.push(e),
        }
    }

    /// Check if the stream ended without a read failure.
    pub fn completed_cleanly(&self) -> bool {
        self.io_error.is_none()
    }

    /// The most recent description received.
    pub fn latest_description(&self) -> Option<&GameDescription> {
        self.descriptions.last()
    }

    /// Position after the last event received.
    pub fn final_fen(&self) -> Option<&str> {
        self.moves
            .last()
            .map(|m| m.fen.as_str())
            .or_else(|| self.latest_description().map(|d| d.fen.as_str()))
    }
}
