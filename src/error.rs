use std::time::Duration;

use reqwest::header::{HeaderMap, RETRY_AFTER};

/// Errors that can occur when using liblichess.
///
/// Errors are organized by category:
/// - Request construction errors: detected before anything is sent
/// - Transport errors: the HTTP round trip failed or was rejected
/// - Frame decode errors: a single NDJSON frame could not be decoded
/// - Stream IO errors: the response body failed mid-stream
///
/// Errors raised before a stream handle is returned come back through the
/// normal `Result` path. Errors raised after streaming has started are
/// delivered in-band as [`GameStreamEvent::DecodeError`](crate::GameStreamEvent::DecodeError)
/// on event streams, and dropped on resource streams.
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
    // -------------------------------------------------------------------------
    // Request construction errors
    // -------------------------------------------------------------------------
    /// Invalid configuration provided to builder.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A URL could not be parsed or resolved against the base URL.
    #[error("invalid URL {url:?}: {message}")]
    InvalidUrl { url: String, message: String },

    /// An argument to an API operation was rejected before sending.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Environment variable required for authentication is not set.
    #[error("environment variable {var} not set")]
    EnvVarNotFound { var: &'static str },

    // -------------------------------------------------------------------------
    // Transport errors
    // -------------------------------------------------------------------------
    /// The HTTP request could not be completed (connection, TLS, timeout).
    #[error("transport error: {message}")]
    Transport {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The server answered with a non-success status.
    ///
    /// `headers` are the response headers, for `Retry-After` and friends.
    #[error("API error (HTTP {status}): {message}")]
    Api {
        status: u16,
        message: String,
        headers: HeaderMap,
    },

    /// Request exceeded the configured timeout.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// Request was cancelled through its cancellation token.
    #[error("request cancelled")]
    Cancelled,

    // -------------------------------------------------------------------------
    // Frame decode errors
    // -------------------------------------------------------------------------
    /// Failed to parse JSON from a frame.
    #[error("failed to parse JSON: {message}")]
    JsonParse {
        message: String,
        #[source]
        source: serde_json::Error,
    },

    /// A frame matched none of the known event shapes.
    #[error("unrecognized frame: {frame}")]
    UnrecognizedFrame { frame: String },

    /// Decoding a frame panicked; the panic was contained at the frame boundary.
    #[error("frame decoder panicked: {message}")]
    DecodePanic { message: String },

    // -------------------------------------------------------------------------
    // Stream IO errors
    // -------------------------------------------------------------------------
    /// Reading the response body failed.
    #[error("IO error: {0}")]
    Io(#[source] std::io::Error),
}

/// A specialized Result type for liblichess operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a JSON parse error with context.
    pub fn json_parse(source: serde_json::Error, raw: &str) -> Self {
        Self::JsonParse {
            message: format!(
                "at line {} column {}: {}",
                source.line(),
                source.column(),
                raw.chars().take(100).collect::<String>()
            ),
            source,
        }
    }

    /// Create an IO error.
    pub fn io(source: std::io::Error) -> Self {
        Self::Io(source)
    }

    /// Create a transport error from any underlying error.
    pub fn transport<E>(source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Transport {
            message: source.to_string(),
            source: Some(Box::new(source)),
        }
    }

    /// Check if this error was detected before any request was sent.
    pub fn is_request_error(&self) -> bool {
        matches!(
            self,
            Error::InvalidConfig(_)
                | Error::InvalidUrl { .. }
                | Error::InvalidArgument(_)
                | Error::EnvVarNotFound { .. }
        )
    }

    /// Check if this error describes a single undecodable frame.
    pub fn is_frame_error(&self) -> bool {
        matches!(
            self,
            Error::JsonParse { .. } | Error::UnrecognizedFrame { .. } | Error::DecodePanic { .. }
        )
    }

    /// The `Retry-After` delay of a rejected request, when given in seconds.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Error::Api { headers, .. } => headers
                .get(RETRY_AFTER)?
                .to_str()
                .ok()?
                .trim()
                .parse::<u64>()
                .ok()
                .map(Duration::from_secs),
            _ => None,
        }
    }

    /// Check if this error is retryable.
    ///
    /// The crate never retries on its own; callers re-invoke the operation.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Timeout(_) | Error::Io(_) | Error::Transport { .. } => true,
            Error::Api { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::JsonParse {
            message: err.to_string(),
            source: err,
        }
    }
}
