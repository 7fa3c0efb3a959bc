//! Frame classification and decoding.
//!
//! Two decoding policies exist and they deliberately differ:
//!
//! - [`GameEventDecoder`] (move streams) reports every undecodable frame, and
//!   a body read failure, in-band as [`GameStreamEvent::DecodeError`].
//! - [`ResourceDecoder`] (game streams) drops undecodable frames silently and
//!   discards read failures, so the channel only ever carries resources.
//!
//! Existing callers rely on both behaviors. Changing either one is a
//! behavior change, not a cleanup.

use std::marker::PhantomData;

use serde::de::DeserializeOwned;

use super::events::GameStreamEvent;
use crate::protocol::{GameDescription, GameMove};
use crate::Error;

/// Turns raw frames into channel items for the stream pump.
pub trait FrameDecoder<T>: Send + Sync {
    /// Decode one frame. `None` drops the frame.
    fn decode(&self, frame: &str) -> Option<T>;

    /// Wrap a terminal error as a channel item.
    ///
    /// `None` means the item type cannot carry errors and the error is discarded.
    fn error_marker(&self, error: Error) -> Option<T>;
}

/// Shape of a move stream frame, decided from its raw text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameKind {
    Move,
    Description,
}

/// One entry of the classification table.
pub struct FrameShape {
    pub kind: FrameKind,
    /// Raw text that must appear in the frame for this shape to match.
    pub fingerprint: &'static str,
    decode: fn(&str) -> Result<GameStreamEvent, serde_json::Error>,
}

/// Move stream shapes in match order. The first fingerprint found wins.
pub static FRAME_SHAPES: [FrameShape; 2] = [
    FrameShape {
        kind: FrameKind::Move,
        fingerprint: r#""wc":"#,
        decode: decode_move,
    },
    FrameShape {
        kind: FrameKind::Description,
        fingerprint: r#""variant":"#,
        decode: decode_description,
    },
];

fn decode_move(frame: &str) -> Result<GameStreamEvent, serde_json::Error> {
    serde_json::from_str::<GameMove>(frame).map(GameStreamEvent::MoveDelta)
}

fn decode_description(frame: &str) -> Result<GameStreamEvent, serde_json::Error> {
    serde_json::from_str::<GameDescription>(frame).map(GameStreamEvent::Description)
}

fn find_shape(frame: &str) -> Option<&'static FrameShape> {
    FRAME_SHAPES
        .iter()
        .find(|shape| frame.contains(shape.fingerprint))
}

/// Classify a frame without decoding it.
pub fn classify(frame: &str) -> Option<FrameKind> {
    find_shape(frame).map(|shape| shape.kind)
}

/// Classify a move stream frame and decode it into an event.
///
/// A frame whose fingerprint matched but whose JSON does not decode yields a
/// [`GameStreamEvent::DecodeError`] for that shape; the next shape is not
/// tried. A frame with no known fingerprint yields
/// [`Error::UnrecognizedFrame`] carrying the raw frame.
pub fn classify_and_decode(frame: &str) -> GameStreamEvent {
    match find_shape(frame) {
        Some(shape) => (shape.decode)(frame)
            .unwrap_or_else(|e| GameStreamEvent::DecodeError(Error::json_parse(e, frame))),
        None => GameStreamEvent::DecodeError(Error::UnrecognizedFrame {
            frame: frame.to_string(),
        }),
    }
}

/// Lichess writes empty lines to keep idle streams open.
fn is_keep_alive(frame: &str) -> bool {
    frame.trim().is_empty()
}

/// Decoder for game move streams.
///
/// Whitespace-only frames are keep-alives and produce no event. Every other
/// frame produces exactly one event, an error event if it does not decode.
#[derive(Debug, Clone, Copy, Default)]
pub struct GameEventDecoder;

impl FrameDecoder<GameStreamEvent> for GameEventDecoder {
    fn decode(&self, frame: &str) -> Option<GameStreamEvent> {
        if is_keep_alive(frame) {
            tracing::trace!("skipping keep-alive frame");
            return None;
        }
        Some(classify_and_decode(frame))
    }

    fn error_marker(&self, error: Error) -> Option<GameStreamEvent> {
        Some(GameStreamEvent::DecodeError(error))
    }
}

/// Decoder for streams where every frame is the same resource.
///
/// Malformed frames are skipped, not reported. Keep-alive frames are
/// skipped without logging.
pub struct ResourceDecoder<R> {
    _marker: PhantomData<fn() -> R>,
}

impl<R> ResourceDecoder<R> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<R> Default for ResourceDecoder<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: DeserializeOwned> FrameDecoder<R> for ResourceDecoder<R> {
    fn decode(&self, frame: &str) -> Option<R> {
        if is_keep_alive(frame) {
            return None;
        }
        match serde_json::from_str(frame) {
            Ok(resource) => Some(resource),
            Err(e) => {
                tracing::debug!(error = %e, "skipping undecodable frame");
                None
            }
        }
    }

    fn error_marker(&self, error: Error) -> Option<R> {
        tracing::debug!(error = %error, "resource stream cannot carry errors; discarding");
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{Game, GameStatus, GameVariant};

    const MOVE: &str = r#"{"fen":"rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1","lm":"e2e4","wc":300,"bc":298}"#;
    const DESCRIPTION: &str = r#"{"id":"LuGQwhBb","variant":{"key":"crazyhouse","name":"Crazyhouse"},"speed":"blitz","perf":"crazyhouse","rated":true,"initialFen":"rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1","fen":"rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1","player":"white","turns":0,"startedAtTurn":0,"source":"lobby","status":{"id":20,"name":"started"},"createdAt":1600000000000,"lastMove":"","players":{"white":{"user":{"name":"Alice","id":"alice"},"rating":1800},"black":{"user":{"name":"Bob","id":"bob"},"rating":1750}}}"#;

    #[test]
    fn decoders_are_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<GameEventDecoder>();
        assert_send_sync::<ResourceDecoder<Game>>();
    }

    #[test]
    fn table_order_is_move_then_description() {
        assert_eq!(FRAME_SHAPES[0].kind, FrameKind::Move);
        assert_eq!(FRAME_SHAPES[0].fingerprint, r#""wc":"#);
        assert_eq!(FRAME_SHAPES[1].kind, FrameKind::Description);
        assert_eq!(FRAME_SHAPES[1].fingerprint, r#""variant":"#);
    }

    #[test]
    fn classify_by_fingerprint() {
        assert_eq!(classify(MOVE), Some(FrameKind::Move));
        assert_eq!(classify(DESCRIPTION), Some(FrameKind::Description));
        assert_eq!(classify(r#"{"id":"x"}"#), None);
    }

    #[test]
    fn first_fingerprint_wins() {
        let both = r#"{"fen":"8/8/8/8/8/8/8/8 w - - 0 1","lm":"a1a2","wc":1,"bc":2,"variant":"standard"}"#;
        assert_eq!(classify(both), Some(FrameKind::Move));
        assert!(classify_and_decode(both).is_move());
    }

    #[test]
    fn decodes_move_fields_exactly() {
        match classify_and_decode(MOVE) {
            GameStreamEvent::MoveDelta(mv) => {
                assert_eq!(
                    mv.fen,
                    "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1"
                );
                assert_eq!(mv.last_move, "e2e4");
                assert_eq!(mv.white_clock, 300);
                assert_eq!(mv.black_clock, 298);
            }
            other => panic!("Expected MoveDelta, got {other:?}"),
        }
    }

    #[test]
    fn decodes_description_fields_exactly() {
        match classify_and_decode(DESCRIPTION) {
            GameStreamEvent::Description(desc) => {
                assert_eq!(desc.id, "LuGQwhBb");
                assert_eq!(desc.variant.key, GameVariant::Crazyhouse);
                assert_eq!(desc.variant.name.as_deref(), Some("Crazyhouse"));
                assert_eq!(desc.perf, "crazyhouse");
                assert!(desc.rated);
                assert_eq!(desc.player, "white");
                assert_eq!(desc.source, "lobby");
                assert_eq!(desc.status.id, Some(20));
                assert_eq!(desc.status.name, GameStatus::Started);
                assert_eq!(desc.created_at, 1600000000000);
                assert_eq!(desc.players.white.rating, Some(1800));
                assert_eq!(desc.players.black.display_name(), Some("Bob"));
            }
            other => panic!("Expected Description, got {other:?}"),
        }
    }

    #[test]
    fn unrecognized_frame_carries_raw_text() {
        let frame = r#"{"error":"No such game"}"#;
        match classify_and_decode(frame) {
            GameStreamEvent::DecodeError(Error::UnrecognizedFrame { frame: raw }) => {
                assert_eq!(raw, frame);
            }
            other => panic!("Expected UnrecognizedFrame, got {other:?}"),
        }
    }

    #[test]
    fn matched_shape_with_bad_json_does_not_fall_through() {
        // Contains both fingerprints but is not a valid move object.
        let frame = r#"{"wc": "not a number", "variant": {"key": "standard"}}"#;
        match classify_and_decode(frame) {
            GameStreamEvent::DecodeError(Error::JsonParse { .. }) => {}
            other => panic!("Expected JsonParse, got {other:?}"),
        }
    }

    #[test]
    fn truncated_description_is_decode_error() {
        let frame = &DESCRIPTION[..DESCRIPTION.len() / 2];
        assert_eq!(classify(frame), Some(FrameKind::Description));
        let event = classify_and_decode(frame);
        assert!(event.is_error());
    }

    #[test]
    fn game_event_decoder_always_yields_an_event() {
        let decoder = GameEventDecoder;
        assert!(decoder.decode("garbage").unwrap().is_error());
        assert!(decoder.decode(MOVE).unwrap().is_move());
        let marker = decoder.error_marker(Error::io(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            "eof",
        )));
        assert!(matches!(
            marker,
            Some(GameStreamEvent::DecodeError(Error::Io(_)))
        ));
    }

    #[test]
    fn resource_decoder_skips_malformed_frames() {
        let decoder = ResourceDecoder::<Game>::new();
        let good = r#"{"id":"abc","variant":"standard","speed":"blitz","status":"mate"}"#;
        assert_eq!(decoder.decode(good).map(|g| g.id), Some("abc".to_string()));
        assert!(decoder.decode("{not json").is_none());
        assert!(decoder.decode(r#"{"id":"missing-fields"}"#).is_none());
    }

    #[test]
    fn resource_decoder_discards_error_markers() {
        let decoder = ResourceDecoder::<Game>::new();
        let marker = decoder.error_marker(Error::io(std::io::Error::new(
            std::io::ErrorKind::ConnectionReset,
            "reset",
        )));
        assert!(marker.is_none());
    }

    #[test]
    fn keep_alive_frames_decode_to_nothing() {
        for frame in ["", "  ", "\t"] {
            assert!(GameEventDecoder.decode(frame).is_none());
            assert!(ResourceDecoder::<Game>::new().decode(frame).is_none());
        }
        // Anything else on the move stream yields an event.
        assert!(GameEventDecoder.decode("x").unwrap().is_error());
    }
}
