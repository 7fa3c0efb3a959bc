//! HTTP transport boundary.
//!
//! Every API call goes through a single [`Transport::send`] round trip. The
//! returned [`HttpResponse`] keeps its body open as a [`BodyStream`] so the
//! streaming operations can read it incrementally.
//!
//! # Architecture
//!
//! ```text
//! liblichess                         lichess.org
//! ┌──────────────┐                  ┌─────────────┐
//! │ Transport    │──HttpRequest────▶│             │
//! │              │◀─status/headers──│             │
//! │  BodyStream  │◀─NDJSON chunks───│             │
//! └──────────────┘                  └─────────────┘
//! ```
//!
//! [`HttpTransport`] is the production implementation. Tests plug in their
//! own [`Transport`] to script responses.

mod http;

use std::fmt;
use std::pin::Pin;

use bytes::Bytes;
use futures::Stream;
use reqwest::header::HeaderMap;
use reqwest::{Method, StatusCode, Url};

use crate::Result;

pub use http::HttpTransport;

/// A response body, read chunk by chunk.
///
/// Dropping the stream closes the underlying connection.
pub type BodyStream = Pin<Box<dyn Stream<Item = std::io::Result<Bytes>> + Send + 'static>>;

/// Content type of an NDJSON response.
pub const NDJSON: &str = "application/x-ndjson";

/// Content type of a JSON response.
pub const JSON: &str = "application/json";

/// An outbound request, fully resolved against the base URL.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<RequestBody>,
}

impl HttpRequest {
    /// Create a request with no headers and no body.
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: HeaderMap::new(),
            body: None,
        }
    }
}

/// Request payload with its content type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestBody {
    pub bytes: Bytes,
    pub content_type: String,
}

impl RequestBody {
    /// A `text/plain` body.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            bytes: Bytes::from(text.into()),
            content_type: "text/plain".to_string(),
        }
    }

    /// Get the body as UTF-8 text, if it is valid UTF-8.
    pub fn as_text(&self) -> Option<&str> {
        std::str::from_utf8(&self.bytes).ok()
    }
}

/// Status line and headers of a response, without the body.
///
/// Returned next to every stream handle for callers that need headers.
#[derive(Debug, Clone)]
pub struct ResponseMeta {
    pub status: StatusCode,
    pub headers: HeaderMap,
    /// Final URL after redirects.
    pub url: Url,
}

impl ResponseMeta {
    /// Get a header value as a string, if present and valid.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Check if the status is 2xx.
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

/// A response whose body is still open.
pub struct HttpResponse {
    pub meta: ResponseMeta,
    pub body: BodyStream,
}

impl HttpResponse {
    /// Read the whole body into a string.
    ///
    /// Used for error bodies and plain JSON resources.
    pub async fn text(self) -> Result<String> {
        use futures::TryStreamExt;

        let chunks: Vec<Bytes> = self.body.try_collect().await?;
        let bytes = chunks.concat();
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Read at most `limit` bytes of the body into a string, then close it.
    pub async fn text_limited(mut self, limit: usize) -> Result<String> {
        use futures::TryStreamExt;

        let mut bytes = Vec::new();
        while bytes.len() < limit {
            match self.body.try_next().await? {
                Some(chunk) => bytes.extend_from_slice(&chunk),
                None => break,
            }
        }
        bytes.truncate(limit);
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

impl fmt::Debug for HttpResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpResponse")
            .field("meta", &self.meta)
            .finish_non_exhaustive()
    }
}

/// Sends one HTTP request and hands back the response with an open body.
///
/// Implementations map connection, TLS and timeout failures to
/// [`Error::Transport`](crate::Error::Transport). Non-success statuses are
/// not errors at this layer.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse>;
}
