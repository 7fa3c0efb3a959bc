//! Test utilities for liblichess integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use std::time::Duration;

use bytes::Bytes;
use futures::Stream;
use liblichess::transport::{HttpRequest, HttpResponse, ResponseMeta, Transport};
use liblichess::{Error, LichessClient, Result};
use reqwest::header::HeaderMap;
use reqwest::StatusCode;

pub const DESCRIPTION: &str = r#"{"id":"LuGQwhBb","variant":{"key":"standard","name":"Standard","short":"Std"},"speed":"blitz","perf":"blitz","rated":true,"initialFen":"rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1","fen":"rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1","player":"white","turns":0,"startedAtTurn":0,"source":"pool","status":{"id":20,"name":"started"},"createdAt":1700000000000,"lastMove":"","players":{"white":{"user":{"name":"Alice","id":"alice"},"rating":2100},"black":{"user":{"name":"Bob","id":"bob"},"rating":2050}}}"#;

/// A move frame with the given UCI move.
pub fn move_frame(uci: &str, white_clock: u32, black_clock: u32) -> String {
    format!(r#"{{"fen":"after-{uci}","lm":"{uci}","wc":{white_clock},"bc":{black_clock}}}"#)
}

/// A game export line.
pub fn game_line(id: &str) -> String {
    format!(
        r#"{{"id":"{id}","rated":true,"variant":"standard","speed":"blitz","perf":"blitz","createdAt":1,"lastMoveAt":2,"status":"mate","players":{{"white":{{"user":{{"name":"Alice","id":"alice"}},"rating":1500}},"black":{{"user":{{"name":"Bob","id":"bob"}},"rating":1500}}}},"winner":"white"}}"#
    )
}

/// A games-by-users stream line.
pub fn game_stream_line(id: &str) -> String {
    format!(
        r#"{{"id":"{id}","rated":false,"variant":"standard","speed":"rapid","perf":"rapid","createdAt":1,"status":20,"statusName":"started","clock":{{"initial":600,"increment":5,"totalTime":800}},"players":{{"white":{{"user":{{"name":"Alice","id":"alice"}}}},"black":{{"user":{{"name":"Bob","id":"bob"}}}}}}}}"#
    )
}

/// A response body that plays back scripted chunks and counts its drops.
pub struct ScriptedBody {
    items: VecDeque<std::io::Result<Bytes>>,
    hang: bool,
    drops: Arc<AtomicUsize>,
}

impl Stream for ScriptedBody {
    type Item = std::io::Result<Bytes>;

    fn poll_next(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        match this.items.pop_front() {
            Some(item) => Poll::Ready(Some(item)),
            None if this.hang => Poll::Pending,
            None => Poll::Ready(None),
        }
    }
}

impl Drop for ScriptedBody {
    fn drop(&mut self) {
        self.drops.fetch_add(1, Ordering::SeqCst);
    }
}

/// One scripted response.
pub struct MockResponse {
    status: StatusCode,
    headers: HeaderMap,
    chunks: Vec<std::io::Result<Bytes>>,
    hang: bool,
    drops: Arc<AtomicUsize>,
}

impl MockResponse {
    /// Number of times this response's body has been dropped.
    pub fn drop_counter(&self) -> Arc<AtomicUsize> {
        self.drops.clone()
    }
}

/// Builder for NDJSON response bodies.
pub struct BodyBuilder {
    status: StatusCode,
    headers: HeaderMap,
    chunks: Vec<std::io::Result<Bytes>>,
    hang: bool,
}

impl BodyBuilder {
    /// Start a `200 OK` body.
    pub fn ok() -> Self {
        Self::status(StatusCode::OK)
    }

    pub fn status(status: StatusCode) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            chunks: Vec::new(),
            hang: false,
        }
    }

    pub fn header(mut self, name: &'static str, value: &'static str) -> Self {
        self.headers
            .insert(name, reqwest::header::HeaderValue::from_static(value));
        self
    }

    /// Add one line, newline-terminated.
    pub fn line(mut self, line: impl Into<String>) -> Self {
        let mut line = line.into();
        line.push('\n');
        self.chunks.push(Ok(Bytes::from(line)));
        self
    }

    /// Add raw bytes with no newline appended.
    pub fn raw(mut self, bytes: impl Into<String>) -> Self {
        self.chunks.push(Ok(Bytes::from(bytes.into())));
        self
    }

    pub fn description(self) -> Self {
        self.line(DESCRIPTION)
    }

    pub fn mv(self, uci: &str) -> Self {
        self.line(move_frame(uci, 180, 180))
    }

    /// Fail the body read with a connection reset.
    pub fn io_error(mut self) -> Self {
        self.chunks.push(Err(std::io::Error::new(
            std::io::ErrorKind::ConnectionReset,
            "connection reset by peer",
        )));
        self
    }

    /// Keep the body open after the scripted chunks.
    pub fn hang(mut self) -> Self {
        self.hang = true;
        self
    }

    pub fn build(self) -> MockResponse {
        MockResponse {
            status: self.status,
            headers: self.headers,
            chunks: self.chunks,
            hang: self.hang,
            drops: Arc::new(AtomicUsize::new(0)),
        }
    }
}

/// Transport that records requests and replays scripted responses in order.
#[derive(Clone, Default)]
pub struct MockTransport {
    requests: Arc<Mutex<Vec<HttpRequest>>>,
    responses: Arc<Mutex<VecDeque<Result<MockResponse>>>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response and return its body drop counter.
    pub fn respond(&self, response: MockResponse) -> Arc<AtomicUsize> {
        let drops = response.drop_counter();
        self.responses.lock().unwrap().push_back(Ok(response));
        drops
    }

    /// Queue a transport failure.
    pub fn fail(&self, error: Error) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    /// Requests sent so far.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> HttpRequest {
        self.requests
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("no request was sent")
    }
}

#[async_trait::async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let url = request.url.clone();
        self.requests.lock().unwrap().push(request);

        let scripted = self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .expect("no scripted response left")?;

        let body = ScriptedBody {
            items: scripted.chunks.into(),
            hang: scripted.hang,
            drops: scripted.drops,
        };
        Ok(HttpResponse {
            meta: ResponseMeta {
                status: scripted.status,
                headers: scripted.headers,
                url,
            },
            body: Box::pin(body),
        })
    }
}

/// Anonymous client over `transport`.
pub fn client(transport: &MockTransport) -> LichessClient {
    client_builder(transport).build().unwrap()
}

pub fn client_builder(transport: &MockTransport) -> liblichess::ClientBuilder {
    LichessClient::builder()
        .anonymous()
        .transport(Arc::new(transport.clone()))
}

/// Wait until `counter` reaches `expected`, failing after one second.
pub async fn wait_for_count(counter: &AtomicUsize, expected: usize) {
    tokio::time::timeout(Duration::from_secs(1), async {
        while counter.load(Ordering::SeqCst) < expected {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    })
    .await
    .expect("counter did not reach expected value");
    assert_eq!(counter.load(Ordering::SeqCst), expected);
}
