//! Game endpoints.
//!
//! Three of these endpoints stream: the response stays open and the server
//! keeps writing NDJSON lines to it. They all take a [`CancellationToken`]
//! and return as soon as the response status arrives, handing back an
//! [`EventStream`] that fills in the background.

use reqwest::Method;
use tokio_util::sync::CancellationToken;

use crate::client::LichessClient;
use crate::config::{
    append_query, ExportByIdOptions, ExportByUsernameOptions, StreamGamesOfUsersOptions,
};
use crate::protocol::{Game, GameStream};
use crate::stream::{EventStream, GameEventDecoder, GameEventStream, ResourceDecoder};
use crate::transport::{RequestBody, ResponseMeta, JSON, NDJSON};
use crate::{Error, Result};

/// Game export and game streams. Obtained from [`LichessClient::games`].
#[derive(Debug, Clone, Copy)]
pub struct Games<'a> {
    client: &'a LichessClient,
}

fn require(name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::InvalidArgument(format!("{name} must not be empty")));
    }
    Ok(())
}

impl<'a> Games<'a> {
    pub(crate) fn new(client: &'a LichessClient) -> Self {
        Self { client }
    }

    /// Export one game as JSON.
    ///
    /// `GET game/export/{id}`
    pub async fn export_by_id(&self, id: &str, options: &ExportByIdOptions) -> Result<Game> {
        require("game id", id)?;
        let mut request = self
            .client
            .request(Method::GET, "game/export/", Some(id), JSON)?;
        append_query(&mut request.url, options)?;
        self.client.get_json(request).await
    }

    /// Export a user's games, waiting for the whole response.
    ///
    /// Fails on the first line that does not decode. Use
    /// [`stream_user_games`](Self::stream_user_games) for large exports.
    ///
    /// `GET api/games/user/{username}`
    pub async fn export_by_username(
        &self,
        username: &str,
        options: &ExportByUsernameOptions,
    ) -> Result<Vec<Game>> {
        require("username", username)?;
        let mut request = self
            .client
            .request(Method::GET, "api/games/user/", Some(username), NDJSON)?;
        append_query(&mut request.url, options)?;
        self.client.get_ndjson_vec(request).await
    }

    /// Stream the moves of one game.
    ///
    /// The stream opens with a [`Description`](crate::GameStreamEvent::Description),
    /// then yields one [`MoveDelta`](crate::GameStreamEvent::MoveDelta) per move.
    /// Undecodable frames and a mid-stream read failure are delivered as
    /// [`DecodeError`](crate::GameStreamEvent::DecodeError) events; a read
    /// failure is always the last event.
    ///
    /// `GET api/stream/game/{id}`
    ///
    /// # Example
    ///
    /// ```ignore
    /// let cancel = CancellationToken::new();
    /// let (stream, _meta) = client.games().stream_game_moves(&cancel, "LuGQwhBb").await?;
    /// let game = stream.collect_all().await;
    /// ```
    pub async fn stream_game_moves(
        &self,
        cancel: &CancellationToken,
        id: &str,
    ) -> Result<(GameEventStream, ResponseMeta)> {
        require("game id", id)?;
        let request = self
            .client
            .request(Method::GET, "api/stream/game/", Some(id), NDJSON)?;
        self.client
            .open_stream(cancel, request, GameEventDecoder)
            .await
    }

    /// Stream a user's games as they are exported.
    ///
    /// Lines that do not decode as a [`Game`] are skipped, and a mid-stream
    /// read failure simply ends the stream.
    ///
    /// `GET api/games/user/{username}`
    pub async fn stream_user_games(
        &self,
        cancel: &CancellationToken,
        username: &str,
        options: &ExportByUsernameOptions,
    ) -> Result<(EventStream<Game>, ResponseMeta)> {
        require("username", username)?;
        let mut request =
            self.client
                .request(Method::GET, "api/games/user/", Some(username), NDJSON)?;
        append_query(&mut request.url, options)?;
        self.client
            .open_stream(cancel, request, ResourceDecoder::<Game>::new())
            .await
    }

    /// Stream games played between any of the given users.
    ///
    /// Lines that do not decode as a [`GameStream`] are skipped, and a
    /// mid-stream read failure simply ends the stream.
    ///
    /// `POST api/stream/games-by-users` with the usernames as a comma-separated
    /// `text/plain` body.
    pub async fn stream_games_of_users<S: AsRef<str>>(
        &self,
        cancel: &CancellationToken,
        usernames: &[S],
        options: &StreamGamesOfUsersOptions,
    ) -> Result<(EventStream<GameStream>, ResponseMeta)> {
        if usernames.is_empty() {
            return Err(Error::InvalidArgument(
                "at least one username is required".into(),
            ));
        }
        let names = usernames
            .iter()
            .map(|name| {
                let name = name.as_ref().trim();
                require("username", name).map(|()| name)
            })
            .collect::<Result<Vec<_>>>()?;

        let mut request =
            self.client
                .request(Method::POST, "api/stream/games-by-users", None, NDJSON)?;
        append_query(&mut request.url, options)?;
        request.body = Some(RequestBody::text(names.join(",")));

        self.client
            .open_stream(cancel, request, ResourceDecoder::<GameStream>::new())
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> LichessClient {
        LichessClient::builder().anonymous().build().unwrap()
    }

    #[tokio::test]
    async fn empty_game_id_rejected_before_sending() {
        let client = client();
        let cancel = CancellationToken::new();
        let result = client.games().stream_game_moves(&cancel, "  ").await;
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
    }

    #[tokio::test]
    async fn empty_username_rejected() {
        let client = client();
        let cancel = CancellationToken::new();
        let result = client
            .games()
            .stream_user_games(&cancel, "", &ExportByUsernameOptions::default())
            .await;
        assert!(matches!(result, Err(Error::InvalidArgument(_))));

        let result = client
            .games()
            .export_by_username("", &ExportByUsernameOptions::default())
            .await;
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
    }

    #[tokio::test]
    async fn empty_username_list_rejected() {
        let client = client();
        let cancel = CancellationToken::new();
        let none: [&str; 0] = [];
        let result = client
            .games()
            .stream_games_of_users(&cancel, &none, &StreamGamesOfUsersOptions::default())
            .await;
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
    }

    #[tokio::test]
    async fn empty_name_inside_list_rejected() {
        let client = client();
        let cancel = CancellationToken::new();
        let result = client
            .games()
            .stream_games_of_users(
                &cancel,
                &["alice", " "],
                &StreamGamesOfUsersOptions::default(),
            )
            .await;
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
    }

    #[tokio::test]
    async fn empty_export_id_rejected() {
        let client = client();
        let result = client
            .games()
            .export_by_id("", &ExportByIdOptions::default())
            .await;
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
    }
}
