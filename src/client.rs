//! Lichess API client.
//!
//! This module provides [`LichessClient`], the main entry point. Endpoints are
//! grouped into services reached through [`LichessClient::games`] and
//! [`LichessClient::puzzles`].
//!
//! # Example
//!
//! ```ignore
//! use futures::StreamExt;
//! use liblichess::{GameStreamEvent, LichessClient, Result};
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let client = LichessClient::new()?;
//!
//!     // Plain request
//!     let daily = client.puzzles().daily().await?;
//!     if let Some(puzzle) = daily.puzzle {
//!         println!("daily puzzle {}", puzzle.id);
//!     }
//!
//!     // Streaming request
//!     let cancel = CancellationToken::new();
//!     let (mut stream, _meta) = client.games().stream_game_moves(&cancel, "LuGQwhBb").await?;
//!     while let Some(event) = stream.next().await {
//!         if let GameStreamEvent::MoveDelta(mv) = event {
//!             println!("{}", mv.last_move);
//!         }
//!     }
//!
//!     Ok(())
//! }
//! ```

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{Method, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;

use crate::config::{AuthMethod, ClientConfig, ClientConfigBuilder};
use crate::games::Games;
use crate::puzzles::Puzzles;
use crate::stream::{with_timeout, EventStream, FrameDecoder, LineFramer};
use crate::transport::{HttpRequest, HttpResponse, HttpTransport, ResponseMeta, Transport};
use crate::{Error, Result};

/// A client for the Lichess API.
///
/// `LichessClient` holds the configuration and the transport. Cloning it is
/// cheap and clones share the underlying connection pool.
///
/// # Thread Safety
///
/// `LichessClient` is `Send + Sync` and can be safely shared across tasks.
/// Every stream runs on its own task, so any number can be open at once.
///
/// # Example
///
/// ```ignore
/// use liblichess::LichessClient;
///
/// let client = LichessClient::builder()
///     .token_from_env()
///     .stream_buffer(8)
///     .build()?;
/// ```
#[derive(Clone)]
pub struct LichessClient {
    config: Arc<ClientConfig>,
    transport: Arc<dyn Transport>,
}

impl LichessClient {
    /// Create a new client with default configuration.
    ///
    /// Uses `LICHESS_TOKEN` when it is set and sends anonymous requests
    /// otherwise.
    pub fn new() -> Result<Self> {
        Self::builder().build()
    }

    /// Create a new client over the default HTTP transport.
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        let transport = HttpTransport::new(config.user_agent(), config.connect_timeout())?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Create a new client over a custom transport.
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            config: Arc::new(config),
            transport,
        }
    }

    /// Create a builder for configuring a new client.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Game export and game streams.
    pub fn games(&self) -> Games<'_> {
        Games::new(self)
    }

    /// Puzzle endpoints.
    pub fn puzzles(&self) -> Puzzles<'_> {
        Puzzles::new(self)
    }

    /// Get a reference to the client's configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    // -------------------------------------------------------------------------
    // Request plumbing shared by the services
    // -------------------------------------------------------------------------

    /// Build a request for `path` (relative, no leading slash).
    ///
    /// `segment` is appended as one escaped path segment.
    pub(crate) fn request(
        &self,
        method: Method,
        path: &str,
        segment: Option<&str>,
        accept: &'static str,
    ) -> Result<HttpRequest> {
        let mut url = self.config.endpoint(path)?;
        if let Some(segment) = segment {
            push_segment(&mut url, segment)?;
        }

        let mut request = HttpRequest::new(method, url);
        request
            .headers
            .insert(ACCEPT, HeaderValue::from_static(accept));
        if let Some(authorization) = self.config.resolved_auth.authorization() {
            let mut value = HeaderValue::from_str(&authorization).map_err(|_| {
                Error::InvalidConfig("API token contains invalid header characters".into())
            })?;
            value.set_sensitive(true);
            request.headers.insert(AUTHORIZATION, value);
        }
        Ok(request)
    }

    /// Send a request and reject non-success statuses.
    ///
    /// With a token, the whole exchange races its cancellation, including
    /// reading the body of a rejected request.
    async fn send(
        &self,
        request: HttpRequest,
        cancel: Option<&CancellationToken>,
    ) -> Result<HttpResponse> {
        tracing::debug!(method = %request.method, url = %request.url, "sending request");

        let exchange = async {
            let response = self.transport.send(request).await?;
            tracing::debug!(status = %response.meta.status, url = %response.meta.url, "received response");
            check_status(response).await
        };
        match cancel {
            Some(cancel) => tokio::select! {
                biased;
                _ = cancel.cancelled() => Err(Error::Cancelled),
                result = exchange => result,
            },
            None => exchange.await,
        }
    }

    /// Apply the configured timeout to a non-streaming request.
    async fn bounded<F, T>(&self, future: F) -> Result<T>
    where
        F: std::future::Future<Output = Result<T>>,
    {
        match self.config.timeout() {
            Some(timeout) => with_timeout(timeout, future).await,
            None => future.await,
        }
    }

    /// Fetch and decode one JSON document.
    pub(crate) async fn get_json<T: DeserializeOwned>(&self, request: HttpRequest) -> Result<T> {
        self.bounded(async {
            let text = self.send(request, None).await?.text().await?;
            serde_json::from_str(&text).map_err(|e| Error::json_parse(e, &text))
        })
        .await
    }

    /// Fetch an NDJSON body and decode every line.
    ///
    /// Strict: the first malformed line fails the whole call.
    pub(crate) async fn get_ndjson_vec<T: DeserializeOwned>(
        &self,
        request: HttpRequest,
    ) -> Result<Vec<T>> {
        self.bounded(async {
            let response = self.send(request, None).await?;
            let mut framer = LineFramer::from_body(response.body);
            let mut items = Vec::new();
            while let Some(line) = framer.next_frame().await? {
                if line.trim().is_empty() {
                    continue;
                }
                let item = serde_json::from_str(&line).map_err(|e| Error::json_parse(e, &line))?;
                items.push(item);
            }
            tracing::debug!(count = items.len(), "decoded NDJSON response");
            Ok(items)
        })
        .await
    }

    /// Send a streaming request and start pumping its body.
    ///
    /// Returns as soon as the status line arrives.
    pub(crate) async fn open_stream<T, D>(
        &self,
        cancel: &CancellationToken,
        request: HttpRequest,
        decoder: D,
    ) -> Result<(EventStream<T>, ResponseMeta)>
    where
        T: Send + 'static,
        D: FrameDecoder<T> + 'static,
    {
        let HttpResponse { meta, body } = self.send(request, Some(cancel)).await?;
        let stream = EventStream::spawn(
            LineFramer::from_body(body),
            decoder,
            cancel,
            self.config.stream_buffer(),
        );
        Ok((stream, meta))
    }
}

impl fmt::Debug for LichessClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LichessClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

fn push_segment(url: &mut Url, segment: &str) -> Result<()> {
    if url.cannot_be_a_base() {
        return Err(Error::InvalidUrl {
            url: url.to_string(),
            message: "base URL cannot have path segments".into(),
        });
    }
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.pop_if_empty().push(segment);
    }
    Ok(())
}

/// Lichess error body: `{"error": "..."}`.
#[derive(Deserialize)]
struct ApiErrorBody {
    error: String,
}

/// Most of an error body that is read.
const ERROR_BODY_LIMIT: usize = 4096;

/// Turn a non-2xx response into [`Error::Api`].
async fn check_status(response: HttpResponse) -> Result<HttpResponse> {
    if response.meta.is_success() {
        return Ok(response);
    }

    let status = response.meta.status;
    let headers = response.meta.headers.clone();
    let message = match response.text_limited(ERROR_BODY_LIMIT).await {
        Ok(body) => api_error_message(&body),
        Err(e) => {
            tracing::debug!(error = %e, "failed to read error body");
            None
        }
    }
    .or_else(|| status.canonical_reason().map(String::from))
    .unwrap_or_else(|| "request failed".to_string());

    tracing::debug!(status = status.as_u16(), %message, "request rejected");
    Err(Error::Api {
        status: status.as_u16(),
        message,
        headers,
    })
}

fn api_error_message(body: &str) -> Option<String> {
    let body = body.trim();
    if body.is_empty() {
        return None;
    }
    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(parsed) => Some(parsed.error),
        Err(_) => Some(body.chars().take(200).collect()),
    }
}

/// Builder for [`LichessClient`].
///
/// This wraps [`ClientConfigBuilder`] and builds directly into a [`LichessClient`].
///
/// # Example
///
/// ```ignore
/// let client = LichessClient::builder()
///     .token("lip_...")
///     .timeout(Duration::from_secs(30))
///     .build()?;
/// ```
#[derive(Clone, Default)]
pub struct ClientBuilder {
    inner: ClientConfigBuilder,
    transport: Option<Arc<dyn Transport>>,
}

impl ClientBuilder {
    /// Create a new client builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the client.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Authentication cannot be resolved
    /// - The configuration is invalid (e.g. base URL without trailing slash)
    /// - The HTTP client cannot be created
    pub fn build(self) -> Result<LichessClient> {
        let config = self.inner.build()?;
        match self.transport {
            Some(transport) => Ok(LichessClient::with_transport(config, transport)),
            None => LichessClient::with_config(config),
        }
    }

    // -------------------------------------------------------------------------
    // Authentication methods (delegated to ClientConfigBuilder)
    // -------------------------------------------------------------------------

    /// Use a personal API token.
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.inner = self.inner.token(token);
        self
    }

    /// Read the token from LICHESS_TOKEN.
    pub fn token_from_env(mut self) -> Self {
        self.inner = self.inner.token_from_env();
        self
    }

    /// Send no credentials.
    pub fn anonymous(mut self) -> Self {
        self.inner = self.inner.anonymous();
        self
    }

    /// Set the auth method directly.
    pub fn auth(mut self, auth: AuthMethod) -> Self {
        self.inner = self.inner.auth(auth);
        self
    }

    /// Add fallback auth method.
    pub fn fallback(mut self, auth: AuthMethod) -> Self {
        self.inner = self.inner.fallback(auth);
        self
    }

    // -------------------------------------------------------------------------
    // HTTP options
    // -------------------------------------------------------------------------

    /// API root. Must end with `/`.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.inner = self.inner.base_url(url);
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.inner = self.inner.user_agent(agent);
        self
    }

    /// Bound connection establishment.
    pub fn connect_timeout(mut self, duration: Duration) -> Self {
        self.inner = self.inner.connect_timeout(duration);
        self
    }

    /// Bound non-streaming requests.
    pub fn timeout(mut self, duration: Duration) -> Self {
        self.inner = self.inner.timeout(duration);
        self
    }

    /// Channel capacity of each stream.
    pub fn stream_buffer(mut self, capacity: usize) -> Self {
        self.inner = self.inner.stream_buffer(capacity);
        self
    }

    /// Send requests through a custom transport instead of `reqwest`.
    ///
    /// `user_agent` and `connect_timeout` only configure the default transport.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }
}

impl fmt::Debug for ClientBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientBuilder")
            .field("inner", &self.inner)
            .field("custom_transport", &self.transport.is_some())
            .finish()
    }
}
