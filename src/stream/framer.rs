//! Newline framing of response bodies.

use bytes::Bytes;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio_util::io::StreamReader;

use crate::transport::BodyStream;

/// Reader over an HTTP body stream.
pub type BodyReader = StreamReader<BodyStream, Bytes>;

/// Splits a byte stream into newline-delimited frames.
///
/// Frames are returned without the `\n` delimiter; a trailing `\r` is also
/// stripped. Lines may be arbitrarily long. A final line without a
/// terminating newline is still returned.
pub struct LineFramer<R = BodyReader> {
    reader: R,
    buffer: Vec<u8>,
    exhausted: bool,
}

impl LineFramer<BodyReader> {
    /// Frame an HTTP response body.
    pub fn from_body(body: BodyStream) -> Self {
        Self::new(StreamReader::new(body))
    }
}

impl<R: AsyncBufRead + Unpin> LineFramer<R> {
    /// Create a framer over any buffered async reader.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buffer: Vec::with_capacity(4096),
            exhausted: false,
        }
    }

    /// Read the next frame.
    ///
    /// Returns `Ok(Some(frame))` for each line, `Ok(None)` at end of stream,
    /// or `Err` if reading the body failed. After `Ok(None)` or `Err` the
    /// framer is exhausted and keeps returning `Ok(None)`.
    ///
    /// Not cancel safe: a partially read line is lost if the future is dropped.
    pub async fn next_frame(&mut self) -> std::io::Result<Option<String>> {
        if self.exhausted {
            return Ok(None);
        }

        self.buffer.clear();
        let bytes_read = match self.reader.read_until(b'\n', &mut self.buffer).await {
            Ok(n) => n,
            Err(e) => {
                self.exhausted = true;
                return Err(e);
            }
        };

        if bytes_read == 0 {
            self.exhausted = true;
            return Ok(None);
        }

        if self.buffer.last() == Some(&b'\n') {
            self.buffer.pop();
        }
        if self.buffer.last() == Some(&b'\r') {
            self.buffer.pop();
        }

        Ok(Some(String::from_utf8_lossy(&self.buffer).into_owned()))
    }

    /// Check if end of stream or a read error has been reached.
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Close the framer and the body underneath it.
    pub fn close(self) {
        drop(self.reader);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ok(bytes: &'static [u8]) -> std::io::Result<Bytes> {
        Ok(Bytes::from_static(bytes))
    }

    fn framer_from_chunks(chunks: Vec<std::io::Result<Bytes>>) -> LineFramer {
        LineFramer::from_body(Box::pin(futures::stream::iter(chunks)))
    }

    async fn collect_frames(framer: &mut LineFramer) -> Vec<String> {
        let mut frames = Vec::new();
        while let Some(frame) = framer.next_frame().await.unwrap() {
            frames.push(frame);
        }
        frames
    }

    #[test]
    fn line_framer_is_send() {
        fn assert_send<T: Send>() {}
        assert_send::<LineFramer>();
    }

    #[tokio::test]
    async fn splits_on_newlines() {
        let mut framer = framer_from_chunks(vec![ok(b"{\"a\":1}\n{\"b\":2}\n")]);
        assert_eq!(collect_frames(&mut framer).await, vec![r#"{"a":1}"#, r#"{"b":2}"#]);
        assert!(framer.is_exhausted());
    }

    #[tokio::test]
    async fn joins_frames_split_across_chunks() {
        let mut framer = framer_from_chunks(vec![
            ok(b"{\"fen\":\"rnb"),
            ok(b"qkbnr\",\"wc\":"),
            ok(b"60}\n{\"x\""),
            ok(b":1}\n"),
        ]);
        assert_eq!(
            collect_frames(&mut framer).await,
            vec![r#"{"fen":"rnbqkbnr","wc":60}"#, r#"{"x":1}"#]
        );
    }

    #[tokio::test]
    async fn strips_carriage_returns() {
        let mut framer = framer_from_chunks(vec![ok(b"one\r\ntwo\r\n")]);
        assert_eq!(collect_frames(&mut framer).await, vec!["one", "two"]);
    }

    #[tokio::test]
    async fn keeps_empty_lines() {
        let mut framer = framer_from_chunks(vec![ok(b"a\n\nb\n")]);
        assert_eq!(collect_frames(&mut framer).await, vec!["a", "", "b"]);
    }

    #[tokio::test]
    async fn yields_final_unterminated_line() {
        let mut framer = framer_from_chunks(vec![ok(b"first\nlast")]);
        assert_eq!(collect_frames(&mut framer).await, vec!["first", "last"]);
    }

    #[tokio::test]
    async fn handles_very_long_lines() {
        let long = "x".repeat(1 << 20);
        let body = format!("{long}\nshort\n");
        let items = vec![Ok(Bytes::from(body))];
        let mut framer = LineFramer::from_body(Box::pin(futures::stream::iter(items)));
        let frames = collect_frames(&mut framer).await;
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].len(), 1 << 20);
    }

    #[tokio::test]
    async fn invalid_utf8_is_replaced() {
        let mut framer = framer_from_chunks(vec![ok(b"ok\xff\n")]);
        let frame = framer.next_frame().await.unwrap().unwrap();
        assert!(frame.starts_with("ok"));
        assert!(frame.contains('\u{FFFD}'));
    }

    #[tokio::test]
    async fn read_error_is_distinct_from_eof() {
        let mut framer = framer_from_chunks(vec![
            ok(b"line\n"),
            Err(std::io::Error::new(
                std::io::ErrorKind::ConnectionReset,
                "connection reset",
            )),
        ]);
        assert_eq!(framer.next_frame().await.unwrap().as_deref(), Some("line"));
        let err = framer.next_frame().await.unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::ConnectionReset);
        assert!(framer.is_exhausted());
        assert!(framer.next_frame().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn empty_body_is_clean_eof() {
        let mut framer = framer_from_chunks(vec![]);
        assert!(framer.next_frame().await.unwrap().is_none());
        assert!(framer.next_frame().await.unwrap().is_none());
    }
}
