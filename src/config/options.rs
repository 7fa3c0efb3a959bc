//! Query options for API requests.
//!
//! Option structs are serialized straight into the query string with
//! `serde_urlencoded`. Every field is optional; unset fields are left out.
//! Booleans are sent as `true`/`false`, keys use the API's camelCase names.

use reqwest::Url;
use serde::{Deserialize, Serialize, Serializer};

use crate::{Error, Result};

/// An options struct that maps onto query-string parameters.
///
/// Parameters appear in field declaration order.
pub trait QueryOptions: Serialize {
    /// Encode as an `application/x-www-form-urlencoded` query string.
    fn to_query(&self) -> Result<String> {
        serde_urlencoded::to_string(self)
            .map_err(|e| Error::InvalidArgument(format!("cannot encode query parameters: {e}")))
    }
}

/// Append the parameters of `options` to `url`.
///
/// Leaves the URL untouched when there are no parameters.
pub(crate) fn append_query<O: QueryOptions>(url: &mut Url, options: &O) -> Result<()> {
    let query = options.to_query()?;
    if query.is_empty() {
        return Ok(());
    }
    let merged = match url.query() {
        Some(existing) if !existing.is_empty() => format!("{existing}&{query}"),
        _ => query,
    };
    url.set_query(Some(&merged));
    Ok(())
}

/// `perfType` is a single comma-separated parameter.
fn comma_separated<S: Serializer>(
    values: &[String],
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&values.join(","))
}

/// Side of the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    White,
    Black,
}

/// Order of exported games.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum SortOrder {
    DateAsc,
    /// Most recent first.
    #[default]
    DateDesc,
}

/// Parameters for [`Games::export_by_id`](crate::Games::export_by_id).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportByIdOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub moves: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pgn_in_json: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clocks: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evals: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opening: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub literate: Option<bool>,
    /// URL of a text file with real names and ratings to replace player names.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub players: Option<String>,
}

impl QueryOptions for ExportByIdOptions {}

/// Parameters for exporting or streaming a user's games.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportByUsernameOptions {
    /// Games played since this timestamp (milliseconds).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub since: Option<i64>,
    /// Games played until this timestamp (milliseconds).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub until: Option<i64>,
    /// How many games to download.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<u32>,
    /// Only games played against this opponent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vs: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rated: Option<bool>,
    /// Perf keys such as `blitz` or `chess960`, sent comma-separated.
    #[serde(
        skip_serializing_if = "Vec::is_empty",
        serialize_with = "comma_separated"
    )]
    pub perf_type: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub moves: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pgn_in_json: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clocks: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evals: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opening: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ongoing: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub literate: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_fen: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<SortOrder>,
}

impl ExportByUsernameOptions {
    /// Limit the number of games.
    pub fn max(mut self, max: u32) -> Self {
        self.max = Some(max);
        self
    }

    /// Only rated (or only casual) games.
    pub fn rated(mut self, rated: bool) -> Self {
        self.rated = Some(rated);
        self
    }

    /// Add a perf key filter.
    pub fn perf_type(mut self, perf: impl Into<String>) -> Self {
        self.perf_type.push(perf.into());
        self
    }
}

impl QueryOptions for ExportByUsernameOptions {}

/// Parameters for [`Games::stream_games_of_users`](crate::Games::stream_games_of_users).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamGamesOfUsersOptions {
    /// Also include games already in progress when the stream opens.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub with_current_games: Option<bool>,
}

impl QueryOptions for StreamGamesOfUsersOptions {}

/// Parameters for [`Puzzles::activity`](crate::Puzzles::activity).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PuzzleActivityOptions {
    /// How many entries to download. All activity if unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<u32>,
    /// Entries before this timestamp (milliseconds). Use with `max` to paginate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub before: Option<i64>,
}

impl QueryOptions for PuzzleActivityOptions {}
