//! User types shared by game and puzzle payloads.

use serde::{Deserialize, Serialize};

/// Minimal user record embedded in games.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LightUser {
    /// User ID (lowercase username).
    #[serde(default)]
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Title such as `GM` or `BOT`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub patron: bool,
}
