//! Client configuration and builder.
//!
//! # Example
//!
//! ```ignore
//! use std::time::Duration;
//! use liblichess::config::ClientConfig;
//!
//! let config = ClientConfig::builder()
//!     .token_from_env()
//!     .timeout(Duration::from_secs(30))
//!     .stream_buffer(16)
//!     .build()?;
//! ```

use std::time::Duration;

use reqwest::Url;

use super::auth::{resolve_auth, AuthMethod, ResolvedAuth};
use crate::{Error, Result};

/// Default API root. Must keep its trailing slash.
pub const DEFAULT_BASE_URL: &str = "https://lichess.org/";

/// Default `User-Agent` header.
pub const DEFAULT_USER_AGENT: &str = concat!("liblichess/", env!("CARGO_PKG_VERSION"));

/// Default capacity of a stream's channel.
pub const DEFAULT_STREAM_BUFFER: usize = 1;

/// Configuration for the Lichess client.
///
/// Use [`ClientConfig::builder()`] to create a new configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub(crate) resolved_auth: ResolvedAuth,
    pub(crate) base_url: Url,
    pub(crate) user_agent: String,
    pub(crate) connect_timeout: Option<Duration>,
    pub(crate) timeout: Option<Duration>,
    pub(crate) stream_buffer: usize,
}

impl ClientConfig {
    /// Create a new builder for ClientConfig.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Root that request paths are resolved against.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Get the connect timeout if set.
    pub fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout
    }

    /// Get the timeout for non-streaming requests, if set.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Capacity of each stream's channel.
    pub fn stream_buffer(&self) -> usize {
        self.stream_buffer
    }

    /// Check if requests are sent without credentials.
    pub fn is_anonymous(&self) -> bool {
        self.resolved_auth.is_anonymous()
    }

    /// Resolve a relative API path against the base URL.
    ///
    /// Paths are written without a leading slash.
    pub(crate) fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url.join(path).map_err(|e| Error::InvalidUrl {
            url: path.to_string(),
            message: e.to_string(),
        })
    }
}

/// Builder for [`ClientConfig`].
///
/// This builder validates the configuration when [`build()`](ClientConfigBuilder::build) is called.
#[derive(Debug, Clone)]
pub struct ClientConfigBuilder {
    // Authentication
    auth_method: AuthMethod,
    fallbacks: Vec<AuthMethod>,

    // HTTP
    base_url: String,
    user_agent: String,
    connect_timeout: Option<Duration>,
    timeout: Option<Duration>,

    // Streaming
    stream_buffer: usize,
}

impl Default for ClientConfigBuilder {
    fn default() -> Self {
        Self {
            auth_method: AuthMethod::default(),
            fallbacks: Vec::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            connect_timeout: None,
            timeout: None,
            stream_buffer: DEFAULT_STREAM_BUFFER,
        }
    }
}

impl ClientConfigBuilder {
    // -------------------------------------------------------------------------
    // Authentication methods
    // -------------------------------------------------------------------------

    /// Use a personal API token.
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.auth_method = AuthMethod::Token(token.into());
        self
    }

    /// Read the token from LICHESS_TOKEN; fail at build time if it is not set.
    pub fn token_from_env(mut self) -> Self {
        self.auth_method = AuthMethod::TokenFromEnv;
        self
    }

    /// Send no credentials.
    pub fn anonymous(mut self) -> Self {
        self.auth_method = AuthMethod::None;
        self
    }

    /// Set the auth method directly.
    pub fn auth(mut self, auth: AuthMethod) -> Self {
        self.auth_method = auth;
        self
    }

    /// Add fallback auth method if primary is unavailable.
    ///
    /// Multiple fallbacks can be chained.
    pub fn fallback(mut self, auth: AuthMethod) -> Self {
        self.fallbacks.push(auth);
        self
    }

    // -------------------------------------------------------------------------
    // HTTP options
    // -------------------------------------------------------------------------

    /// API root, for example a local lila instance. Must end with `/`.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = agent.into();
        self
    }

    /// Bound connection establishment. Applies to streams too.
    pub fn connect_timeout(mut self, duration: Duration) -> Self {
        self.connect_timeout = Some(duration);
        self
    }

    /// Bound non-streaming requests end to end.
    ///
    /// Streams are never timed out; use a cancellation token or
    /// [`with_deadline`](crate::with_deadline) instead.
    pub fn timeout(mut self, duration: Duration) -> Self {
        self.timeout = Some(duration);
        self
    }

    // -------------------------------------------------------------------------
    // Streaming
    // -------------------------------------------------------------------------

    /// Channel capacity of each stream (default: 1).
    ///
    /// Larger values let the pump read ahead of a slow consumer.
    pub fn stream_buffer(mut self, capacity: usize) -> Self {
        self.stream_buffer = capacity;
        self
    }

    // -------------------------------------------------------------------------
    // Build
    // -------------------------------------------------------------------------

    /// Build the configuration.
    ///
    /// This validates:
    /// - Authentication can be resolved
    /// - The base URL parses, is http(s) and ends with `/`
    /// - Timeouts and the stream buffer are non-zero
    pub fn build(self) -> Result<ClientConfig> {
        let resolved_auth = resolve_auth(&self.auth_method, &self.fallbacks)?;

        let base_url = Url::parse(&self.base_url).map_err(|e| Error::InvalidUrl {
            url: self.base_url.clone(),
            message: e.to_string(),
        })?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(Error::InvalidConfig(format!(
                "base URL must be http or https: {base_url}"
            )));
        }
        if !base_url.path().ends_with('/') {
            return Err(Error::InvalidConfig(format!(
                "base URL must have a trailing slash, but {base_url} does not"
            )));
        }

        if self.user_agent.trim().is_empty() {
            return Err(Error::InvalidConfig("user agent must not be empty".into()));
        }

        for (name, value) in [
            ("connect_timeout", self.connect_timeout),
            ("timeout", self.timeout),
        ] {
            if value == Some(Duration::ZERO) {
                return Err(Error::InvalidConfig(format!("{name} must be non-zero")));
            }
        }

        if self.stream_buffer == 0 {
            return Err(Error::InvalidConfig(
                "stream_buffer must be at least 1".into(),
            ));
        }

        Ok(ClientConfig {
            resolved_auth,
            base_url,
            user_agent: self.user_agent,
            connect_timeout: self.connect_timeout,
            timeout: self.timeout,
            stream_buffer: self.stream_buffer,
        })
    }
}
