//! Payloads of the game move stream.
//!
//! The move stream carries two object shapes with no `type` field. See
//! [`crate::stream::decode`] for how frames are told apart.

use serde::{Deserialize, Serialize};

use super::games::{GameClock, GamePlayers, GameSpeed, GameStatus, GameVariant};

/// Full snapshot of a game, sent when a move stream starts and when the game ends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameDescription {
    pub id: String,
    pub variant: VariantInfo,
    pub speed: GameSpeed,
    #[serde(default)]
    pub perf: String,
    #[serde(default)]
    pub rated: bool,
    #[serde(default)]
    pub initial_fen: String,
    /// Current position.
    #[serde(default)]
    pub fen: String,
    /// Side to move: `"white"` or `"black"`.
    #[serde(default)]
    pub player: String,
    #[serde(default)]
    pub turns: u32,
    #[serde(default)]
    pub started_at_turn: u32,
    #[serde(default)]
    pub source: String,
    pub status: StatusInfo,
    #[serde(default)]
    pub created_at: i64,
    /// Last move in UCI notation; empty before the first move.
    #[serde(default)]
    pub last_move: String,
    #[serde(default)]
    pub players: GamePlayers,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clock: Option<GameClock>,
}

impl GameDescription {
    /// Check if the described game has finished.
    pub fn is_finished(&self) -> bool {
        !self.status.name.is_ongoing()
    }
}

/// Variant object embedded in a [`GameDescription`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantInfo {
    pub key: GameVariant,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short: Option<String>,
}

/// Status object embedded in a [`GameDescription`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: GameStatus,
}

/// Incremental update: one move played.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameMove {
    /// Position after the move.
    pub fen: String,
    /// The move in UCI notation.
    #[serde(rename = "lm", default)]
    pub last_move: String,
    /// White's remaining clock, in seconds.
    #[serde(rename = "wc")]
    pub white_clock: u32,
    /// Black's remaining clock, in seconds.
    #[serde(rename = "bc")]
    pub black_clock: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_game_move() {
        let json = r#"{"fen":"rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1","lm":"e2e4","wc":180,"bc":180}"#;
        let mv: GameMove = serde_json::from_str(json).unwrap();
        assert_eq!(mv.last_move, "e2e4");
        assert_eq!(mv.white_clock, 180);
        assert_eq!(mv.black_clock, 180);
    }

    #[test]
    fn game_move_serializes_to_wire_names() {
        let mv = GameMove {
            fen: "8/8/8/8/8/8/8/8 w - - 0 1".to_string(),
            last_move: "a2a4".to_string(),
            white_clock: 10,
            black_clock: 20,
        };
        let value = serde_json::to_value(&mv).unwrap();
        assert_eq!(value["lm"], "a2a4");
        assert_eq!(value["wc"], 10);
        assert_eq!(value["bc"], 20);
    }

    #[test]
    fn parse_game_description() {
        let json = r#"{
            "id": "LuGQwhBb",
            "variant": {"key": "standard", "name": "Standard", "short": "Std"},
            "speed": "blitz",
            "perf": "blitz",
            "rated": true,
            "initialFen": "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
            "fen": "r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq - 2 3",
            "player": "white",
            "turns": 4,
            "startedAtTurn": 0,
            "source": "pool",
            "status": {"id": 20, "name": "started"},
            "createdAt": 1600000000000,
            "lastMove": "b8c6",
            "players": {
                "white": {"user": {"name": "Alice", "id": "alice"}, "rating": 1800},
                "black": {"user": {"name": "Bob", "id": "bob"}, "rating": 1750}
            }
        }"#;
        let desc: GameDescription = serde_json::from_str(json).unwrap();
        assert_eq!(desc.id, "LuGQwhBb");
        assert_eq!(desc.variant.key, GameVariant::Standard);
        assert_eq!(desc.status.name, GameStatus::Started);
        assert_eq!(desc.turns, 4);
        assert_eq!(desc.last_move, "b8c6");
        assert!(!desc.is_finished());
    }
}
