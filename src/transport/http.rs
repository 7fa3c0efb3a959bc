//! `reqwest`-backed transport.

use std::time::Duration;

use futures::TryStreamExt;
use reqwest::header::CONTENT_TYPE;

use super::{BodyStream, HttpRequest, HttpResponse, ResponseMeta, Transport};
use crate::{Error, Result};

/// Production [`Transport`] over a shared `reqwest::Client`.
///
/// No total request timeout is set on the underlying client: it would cut
/// long-lived streams short. Only connection establishment is bounded.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Build a transport with the given user agent and connect timeout.
    pub fn new(user_agent: &str, connect_timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder().user_agent(user_agent);
        if let Some(timeout) = connect_timeout {
            builder = builder.connect_timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| Error::InvalidConfig(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }

    /// Wrap an existing `reqwest::Client`.
    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let HttpRequest {
            method,
            url,
            headers,
            body,
        } = request;

        let mut builder = self.client.request(method, url).headers(headers);
        if let Some(body) = body {
            builder = builder
                .header(CONTENT_TYPE, body.content_type)
                .body(body.bytes);
        }

        let response = builder.send().await.map_err(Error::transport)?;

        let meta = ResponseMeta {
            status: response.status(),
            headers: response.headers().clone(),
            url: response.url().clone(),
        };
        let body: BodyStream = Box::pin(response.bytes_stream().map_err(std::io::Error::other));

        Ok(HttpResponse { meta, body })
    }
}
