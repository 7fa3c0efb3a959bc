//! Game records as exported and streamed by Lichess.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::users::LightUser;

/// Chess variant, with escape hatch for variants added after this crate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum GameVariant {
    #[default]
    Standard,
    Chess960,
    Crazyhouse,
    Antichess,
    Atomic,
    Horde,
    KingOfTheHill,
    RacingKings,
    ThreeCheck,
    FromPosition,
    /// Variant key not known to this crate.
    #[serde(untagged)]
    Other(String),
}

impl GameVariant {
    /// The wire key of this variant.
    pub fn as_str(&self) -> &str {
        match self {
            GameVariant::Standard => "standard",
            GameVariant::Chess960 => "chess960",
            GameVariant::Crazyhouse => "crazyhouse",
            GameVariant::Antichess => "antichess",
            GameVariant::Atomic => "atomic",
            GameVariant::Horde => "horde",
            GameVariant::KingOfTheHill => "kingOfTheHill",
            GameVariant::RacingKings => "racingKings",
            GameVariant::ThreeCheck => "threeCheck",
            GameVariant::FromPosition => "fromPosition",
            GameVariant::Other(s) => s,
        }
    }
}

impl fmt::Display for GameVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Time control category of a game.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GameSpeed {
    UltraBullet,
    Bullet,
    Blitz,
    Rapid,
    Classical,
    Correspondence,
    #[serde(untagged)]
    Other(String),
}

impl GameSpeed {
    /// The wire key of this speed.
    pub fn as_str(&self) -> &str {
        match self {
            GameSpeed::UltraBullet => "ultraBullet",
            GameSpeed::Bullet => "bullet",
            GameSpeed::Blitz => "blitz",
            GameSpeed::Rapid => "rapid",
            GameSpeed::Classical => "classical",
            GameSpeed::Correspondence => "correspondence",
            GameSpeed::Other(s) => s,
        }
    }
}

impl fmt::Display for GameSpeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Game status name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GameStatus {
    Created,
    Started,
    Aborted,
    Mate,
    Resign,
    Stalemate,
    Timeout,
    Draw,
    #[serde(rename = "outoftime")]
    OutOfTime,
    Cheat,
    NoStart,
    UnknownFinish,
    VariantEnd,
    #[serde(untagged)]
    Other(String),
}

impl GameStatus {
    /// The wire name of this status.
    pub fn as_str(&self) -> &str {
        match self {
            GameStatus::Created => "created",
            GameStatus::Started => "started",
            GameStatus::Aborted => "aborted",
            GameStatus::Mate => "mate",
            GameStatus::Resign => "resign",
            GameStatus::Stalemate => "stalemate",
            GameStatus::Timeout => "timeout",
            GameStatus::Draw => "draw",
            GameStatus::OutOfTime => "outoftime",
            GameStatus::Cheat => "cheat",
            GameStatus::NoStart => "noStart",
            GameStatus::UnknownFinish => "unknownFinish",
            GameStatus::VariantEnd => "variantEnd",
            GameStatus::Other(s) => s,
        }
    }

    /// Check if the game is still in progress.
    pub fn is_ongoing(&self) -> bool {
        matches!(self, GameStatus::Created | GameStatus::Started)
    }
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A Lichess game as returned by the export endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Game {
    pub id: String,
    #[serde(default)]
    pub rated: bool,
    pub variant: GameVariant,
    pub speed: GameSpeed,
    #[serde(default)]
    pub perf: String,
    /// Creation time in milliseconds since Unix epoch.
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub last_move_at: i64,
    pub status: GameStatus,
    #[serde(default)]
    pub players: GamePlayers,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_fen: Option<String>,
    /// `"white"` or `"black"`; absent for draws and ongoing games.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winner: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opening: Option<GameOpening>,
    /// Space separated moves in SAN (or UCI, depending on export options).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub moves: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pgn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days_per_turn: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub analysis: Vec<GameAnalysis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tournament: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub swiss: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clock: Option<GameClock>,
}

impl Game {
    /// Check if the game has finished.
    pub fn is_finished(&self) -> bool {
        !self.status.is_ongoing()
    }
}

/// Both sides of a game.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GamePlayers {
    #[serde(default)]
    pub white: GameUser,
    #[serde(default)]
    pub black: GameUser,
}

/// One side of a game: a registered user, an anonymous player or the AI.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameUser {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<LightUser>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating_diff: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provisional: Option<bool>,
    /// Stockfish level when this side is played by the AI.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_level: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<GameUserAnalysis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team: Option<String>,
}

impl GameUser {
    /// Best available display name for this side.
    pub fn display_name(&self) -> Option<&str> {
        self.user
            .as_ref()
            .map(|u| u.name.as_str())
            .or(self.name.as_deref())
    }
}

/// Per-player accuracy summary from computer analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GameUserAnalysis {
    #[serde(default)]
    pub inaccuracy: u32,
    #[serde(default)]
    pub mistake: u32,
    #[serde(default)]
    pub blunder: u32,
    /// Average centipawn loss.
    #[serde(default)]
    pub acpl: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GameOpening {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eco: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ply: Option<u32>,
}

/// Computer evaluation of a single ply.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GameAnalysis {
    /// Evaluation in centipawns; absent when a mate score is given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eval: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mate: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub best: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub judgment: Option<GameAnalysisJudgment>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GameAnalysisJudgment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// Clock configuration. Seconds unless noted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameClock {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub increment: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_time: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

/// Game record as sent by the games-by-users stream.
///
/// Unlike [`Game`], the status is numeric with the name alongside.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameStream {
    pub id: String,
    #[serde(default)]
    pub rated: bool,
    pub variant: GameVariant,
    pub speed: GameSpeed,
    #[serde(default)]
    pub perf: String,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub status: i64,
    pub status_name: GameStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clock: Option<GameClock>,
    #[serde(default)]
    pub players: GamePlayers,
}
