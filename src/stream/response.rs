//! Stream handles returned by the streaming operations.
//!
//! This module provides [`EventStream`], which implements [`futures::Stream`]
//! over the items a background pump decodes from a response body.

use std::future::Future;
use std::ops::Deref;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use futures::Stream;
use tokio::io::AsyncBufRead;
use tokio::sync::{mpsc, watch};
use tokio::time::timeout as tokio_timeout;
use tokio_util::sync::{CancellationToken, DropGuard};

use super::decode::FrameDecoder;
use super::events::{CollectedGame, GameStreamEvent};
use super::framer::LineFramer;
use super::pump::{spawn_pump, PumpState};
use crate::{Error, Result};

/// A live stream of decoded items.
///
/// Items arrive in the order their frames appeared in the response body.
/// The stream ends when the body ends, reading it fails, or the stream is
/// cancelled.
///
/// # Cancellation
///
/// The stream observes a child of the token passed to the operation that
/// opened it. Cancelling that token, calling [`cancel`](Self::cancel), or
/// dropping the `EventStream` stops the background pump, which then closes
/// the connection. An item that was already buffered when cancellation
/// fired may still be received.
///
/// # Example
///
/// ```ignore
/// use futures::StreamExt;
///
/// let (mut games, _meta) = client
///     .games()
///     .stream_user_games(&cancel, "alice", &ExportByUsernameOptions::default())
///     .await?;
/// while let Some(game) = games.next().await {
///     println!("{} {}", game.id, game.status);
/// }
/// ```
pub struct EventStream<T> {
    rx: mpsc::Receiver<T>,
    cancel: CancellationToken,
    state: watch::Receiver<PumpState>,
    _guard: DropGuard,
}

/// Stream of a single game's moves.
pub type GameEventStream = EventStream<GameStreamEvent>;

impl<T: Send + 'static> EventStream<T> {
    /// Start a pump over `framer` and return the receiving end.
    ///
    /// `buffer` is the channel capacity and must be non-zero.
    pub(crate) fn spawn<R, D>(
        framer: LineFramer<R>,
        decoder: D,
        parent: &CancellationToken,
        buffer: usize,
    ) -> Self
    where
        R: AsyncBufRead + Unpin + Send + 'static,
        D: FrameDecoder<T> + 'static,
    {
        let cancel = parent.child_token();
        let (tx, rx) = mpsc::channel(buffer.max(1));
        let handle = spawn_pump(framer, decoder, cancel.clone(), tx);

        Self {
            rx,
            state: handle.watch_state(),
            _guard: cancel.clone().drop_guard(),
            cancel,
        }
    }
}

impl<T> EventStream<T> {
    /// Receive the next item, or `None` once the stream has ended.
    pub async fn recv(&mut self) -> Option<T> {
        self.rx.recv().await
    }

    /// Stop the stream.
    ///
    /// Items already buffered can still be received.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Check if this stream has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Lifecycle state of the background pump.
    pub fn pump_state(&self) -> PumpState {
        *self.state.borrow()
    }

    /// Receive every remaining item.
    pub async fn collect_vec(mut self) -> Vec<T> {
        let mut items = Vec::new();
        while let Some(item) = self.rx.recv().await {
            items.push(item);
        }
        items
    }
}

impl EventStream<GameStreamEvent> {
    /// Receive every remaining event, sorted by kind.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let (stream, _) = client.games().stream_game_moves(&cancel, "LuGQwhBb").await?;
    /// let game = stream.collect_all().await;
    /// println!("{} moves, final position {:?}", game.moves.len(), game.final_fen());
    /// ```
    pub async fn collect_all(mut self) -> CollectedGame {
        let mut collected = CollectedGame::default();
        while let Some(event) = self.rx.recv().await {
            collected.push(event);
        }
        collected
    }
}

impl<T> Stream for EventStream<T> {
    type Item = T;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.get_mut().rx.poll_recv(cx)
    }
}

impl<T> std::fmt::Debug for EventStream<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventStream")
            .field("cancelled", &self.cancel.is_cancelled())
            .field("pump_state", &self.pump_state())
            .finish_non_exhaustive()
    }
}

/// Helper to add a timeout to a non-streaming request.
///
/// # Example
///
/// ```ignore
/// use std::time::Duration;
/// use liblichess::with_timeout;
///
/// let puzzle = with_timeout(Duration::from_secs(10), client.puzzles().daily()).await?;
/// ```
pub async fn with_timeout<F, T>(duration: Duration, future: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio_timeout(duration, future).await {
        Ok(result) => result,
        Err(_) => Err(Error::Timeout(duration)),
    }
}

/// A cancellation token that also fires once a fixed duration has passed.
///
/// Dereferences to its [`CancellationToken`], so `&deadline` can be passed
/// to any streaming operation. The timer task exits as soon as the token is
/// cancelled or the `Deadline` is dropped; after a drop the token no longer
/// fires on its own.
#[must_use = "dropping a Deadline stops its timer"]
pub struct Deadline {
    token: CancellationToken,
    _timer: DropGuard,
}

impl Deadline {
    /// The token bounded by this deadline.
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }
}

impl Deref for Deadline {
    type Target = CancellationToken;

    fn deref(&self) -> &CancellationToken {
        &self.token
    }
}

impl std::fmt::Debug for Deadline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Deadline")
            .field("cancelled", &self.token.is_cancelled())
            .finish_non_exhaustive()
    }
}

/// Create a child of `parent` that is also cancelled after `duration`.
///
/// Streams have no built-in time limit; pass the returned deadline to a
/// streaming operation to bound it, and keep it alive while the bound
/// should apply. Must be called inside a tokio runtime.
pub fn with_deadline(parent: &CancellationToken, duration: Duration) -> Deadline {
    let token = parent.child_token();
    let stop = CancellationToken::new();

    let timer = token.clone();
    let stopped = stop.clone();
    tokio::spawn(async move {
        tokio::select! {
            _ = stopped.cancelled() => {}
            _ = timer.cancelled() => {}
            _ = tokio::time::sleep(duration) => {
                tracing::debug!(?duration, "stream deadline reached");
                timer.cancel();
            }
        }
    });

    Deadline {
        token,
        _timer: stop.drop_guard(),
    }
}
