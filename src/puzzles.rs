//! Puzzle endpoints.

use reqwest::Method;

use crate::client::LichessClient;
use crate::config::{append_query, PuzzleActivityOptions};
use crate::protocol::{DailyPuzzle, PuzzleRound};
use crate::transport::{JSON, NDJSON};
use crate::Result;

/// Puzzle endpoints. Obtained from [`LichessClient::puzzles`].
#[derive(Debug, Clone, Copy)]
pub struct Puzzles<'a> {
    client: &'a LichessClient,
}

impl<'a> Puzzles<'a> {
    pub(crate) fn new(client: &'a LichessClient) -> Self {
        Self { client }
    }

    /// Today's daily puzzle.
    ///
    /// `GET api/puzzle/daily`
    pub async fn daily(&self) -> Result<DailyPuzzle> {
        let request = self
            .client
            .request(Method::GET, "api/puzzle/daily", None, JSON)?;
        self.client.get_json(request).await
    }

    /// The authenticated user's puzzle history, most recent first.
    ///
    /// Requires a token with the `puzzle:read` scope. Fails on the first
    /// line that does not decode.
    ///
    /// `GET api/puzzle/activity`
    pub async fn activity(&self, options: &PuzzleActivityOptions) -> Result<Vec<PuzzleRound>> {
        let mut request = self
            .client
            .request(Method::GET, "api/puzzle/activity", None, NDJSON)?;
        append_query(&mut request.url, options)?;
        self.client.get_ndjson_vec(request).await
    }
}
