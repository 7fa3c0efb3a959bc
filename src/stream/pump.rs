//! The stream pump: moves decoded frames from a response body into a channel.
//!
//! One pump runs per open stream, on its own tokio task. It is the only code
//! that touches the body after the response arrives, and it alone releases
//! the body and the channel sender when the stream ends.
//!
//! ```text
//!            ┌──────────── CancellationToken ────────────┐
//!            ▼                                           │
//! body ─▶ LineFramer ─▶ FrameDecoder ─▶ mpsc::Sender ─▶ EventStream
//!                                                        (consumer)
//! ```
//!
//! Cancellation is observed at three points: while waiting for the next
//! frame, before a frame is consumed, and while waiting for channel capacity.

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};

use tokio::io::AsyncBufRead;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::decode::FrameDecoder;
use super::framer::LineFramer;
use crate::Error;

/// Lifecycle of a pump.
///
/// ```text
/// Idle ─▶ Running ─┬─▶ Draining  ─┐
///                  ├─▶ Completed ─┼─▶ Closed
///                  └─▶ Failed    ─┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PumpState {
    /// Created, not yet reading.
    Idle,
    /// Reading, decoding and delivering frames.
    Running,
    /// Cancellation observed; shutting down.
    Draining,
    /// The body reached a clean end.
    Completed,
    /// Reading the body failed.
    Failed,
    /// Body and channel released.
    Closed,
}

impl PumpState {
    /// Check if the pump has stopped reading.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, PumpState::Idle | PumpState::Running)
    }
}

/// Why a pump stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Termination {
    /// The token was cancelled or the receiver went away.
    Cancelled,
    /// The body ended cleanly.
    Completed,
    /// Reading the body failed.
    Failed,
}

impl Termination {
    fn state(self) -> PumpState {
        match self {
            Termination::Cancelled => PumpState::Draining,
            Termination::Completed => PumpState::Completed,
            Termination::Failed => PumpState::Failed,
        }
    }
}

/// Body and sender, released together.
///
/// `close()` releases the body first and the sender second, and does nothing
/// on later calls. It also runs on drop so a panicking pump still releases
/// both.
struct PumpResources<R, T> {
    framer: Option<LineFramer<R>>,
    tx: Option<mpsc::Sender<T>>,
}

impl<R, T> PumpResources<R, T> {
    fn new(framer: LineFramer<R>, tx: mpsc::Sender<T>) -> Self {
        Self {
            framer: Some(framer),
            tx: Some(tx),
        }
    }

    /// Returns `true` if this call released anything.
    fn close(&mut self) -> bool {
        let had_body = self.framer.take().map(drop).is_some();
        let had_sender = self.tx.take().map(drop).is_some();
        had_body || had_sender
    }
}

impl<R, T> Drop for PumpResources<R, T> {
    fn drop(&mut self) {
        if self.close() {
            tracing::debug!("stream pump resources released on drop");
        }
    }
}

enum Delivery {
    Sent,
    Cancelled,
    ReceiverClosed,
}

async fn deliver<T>(tx: &mpsc::Sender<T>, item: T, cancel: &CancellationToken) -> Delivery {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Delivery::Cancelled,
        sent = tx.send(item) => match sent {
            Ok(()) => Delivery::Sent,
            Err(_) => Delivery::ReceiverClosed,
        },
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "decoder panicked".to_string()
    }
}

/// A pump that has not started yet.
pub struct Pump<R, T, D> {
    resources: PumpResources<R, T>,
    decoder: D,
    cancel: CancellationToken,
    state: watch::Sender<PumpState>,
}

impl<R, T, D> Pump<R, T, D>
where
    R: AsyncBufRead + Unpin,
    D: FrameDecoder<T>,
{
    pub fn new(
        framer: LineFramer<R>,
        decoder: D,
        cancel: CancellationToken,
        tx: mpsc::Sender<T>,
    ) -> Self {
        let (state, _) = watch::channel(PumpState::Idle);
        Self {
            resources: PumpResources::new(framer, tx),
            decoder,
            cancel,
            state,
        }
    }

    /// Watch the pump's lifecycle.
    pub fn state(&self) -> watch::Receiver<PumpState> {
        self.state.subscribe()
    }

    fn transition(&self, next: PumpState) {
        let previous = self.state.send_replace(next);
        tracing::trace!(?previous, ?next, "stream pump state");
    }

    /// Run until the body ends, reading fails, or cancellation.
    ///
    /// Body and channel are closed before this returns.
    pub async fn run(mut self) -> Termination {
        self.transition(PumpState::Running);
        tracing::debug!("stream pump started");

        let termination = self.pump_frames().await;

        self.transition(termination.state());
        self.resources.close();
        self.transition(PumpState::Closed);
        tracing::debug!(?termination, "stream pump finished");
        termination
    }

    async fn pump_frames(&mut self) -> Termination {
        let mut delivered = 0usize;

        loop {
            let Some(framer) = self.resources.framer.as_mut() else {
                return Termination::Completed;
            };

            let read = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return Termination::Cancelled,
                read = framer.next_frame() => read,
            };

            let frame = match read {
                Ok(Some(frame)) => frame,
                Ok(None) => {
                    tracing::debug!(delivered, "response body ended");
                    return Termination::Completed;
                }
                Err(e) => {
                    tracing::warn!(error = %e, delivered, "reading response body failed");
                    if let Some(marker) = self.decoder.error_marker(Error::Io(e)) {
                        if let Some(tx) = self.resources.tx.as_ref() {
                            let _ = deliver(tx, marker, &self.cancel).await;
                        }
                    }
                    return Termination::Failed;
                }
            };

            if self.cancel.is_cancelled() {
                return Termination::Cancelled;
            }

            let decoder = &self.decoder;
            let item = match catch_unwind(AssertUnwindSafe(|| decoder.decode(&frame))) {
                Ok(item) => item,
                Err(payload) => {
                    let message = panic_message(&*payload);
                    tracing::warn!(%message, "frame decoder panicked");
                    decoder.error_marker(Error::DecodePanic { message })
                }
            };
            let Some(item) = item else {
                continue;
            };

            let Some(tx) = self.resources.tx.as_ref() else {
                return Termination::Cancelled;
            };
            match deliver(tx, item, &self.cancel).await {
                Delivery::Sent => delivered += 1,
                Delivery::Cancelled => return Termination::Cancelled,
                Delivery::ReceiverClosed => {
                    tracing::debug!(delivered, "stream receiver dropped");
                    return Termination::Cancelled;
                }
            }
        }
    }
}

/// Handle to a pump running on its own task.
pub struct PumpHandle {
    task: JoinHandle<Termination>,
    state: watch::Receiver<PumpState>,
}

impl PumpHandle {
    /// Current lifecycle state.
    pub fn state(&self) -> PumpState {
        *self.state.borrow()
    }

    /// Get a receiver that observes state changes.
    pub fn watch_state(&self) -> watch::Receiver<PumpState> {
        self.state.clone()
    }

    /// Wait for the pump to finish.
    ///
    /// A pump task that panicked or was aborted reports `Failed`.
    pub async fn join(self) -> Termination {
        match self.task.await {
            Ok(termination) => termination,
            Err(e) => {
                tracing::warn!(error = %e, "stream pump task did not finish");
                Termination::Failed
            }
        }
    }
}

/// Run a pump to completion on the current task.
pub async fn pump<R, T, D>(
    framer: LineFramer<R>,
    decoder: D,
    cancel: CancellationToken,
    tx: mpsc::Sender<T>,
) -> Termination
where
    R: AsyncBufRead + Unpin,
    D: FrameDecoder<T>,
{
    Pump::new(framer, decoder, cancel, tx).run().await
}

/// Start a pump on a new tokio task.
pub fn spawn_pump<R, T, D>(
    framer: LineFramer<R>,
    decoder: D,
    cancel: CancellationToken,
    tx: mpsc::Sender<T>,
) -> PumpHandle
where
    R: AsyncBufRead + Unpin + Send + 'static,
    T: Send + 'static,
    D: FrameDecoder<T> + 'static,
{
    let pump = Pump::new(framer, decoder, cancel, tx);
    let state = pump.state();
    let task = tokio::spawn(pump.run());
    PumpHandle { task, state }
}
