//! Read Loop
//!
//! Drives one reply stream: pulls chunks from the transport, decodes frames,
//! applies them to the assembler, and reports to the presenter.
//!
//! The loop is strictly sequential. It stops pulling as soon as the stream
//! completes, fails, or is cancelled, and drops the transport before
//! reporting, so the connection (or timer task) behind it is released even
//! when the producer still has bytes to send.

use std::sync::Arc;

use futures::StreamExt;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, info, trace, warn};

use super::assembler::{AssembledMessage, AssemblerStats, FrameOutcome, StreamAssembler};
use super::frame_decoder::FrameDecoder;
use crate::presenter::Presenter;
use crate::transport::{ByteStream, TransportError};

/// Why a stream ended in `Errored`
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum StreamFailure {
    /// The transport reported an error
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The transport closed before the `[DONE]` sentinel
    #[error("stream closed before the [DONE] sentinel")]
    ClosedWithoutSentinel,
}

/// How a stream ended
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StreamStatus {
    /// The `[DONE]` sentinel was seen
    Done,
    /// The transport failed
    Errored(StreamFailure),
    /// The consumer abandoned the stream
    Cancelled,
}

impl StreamStatus {
    /// Check if the stream completed normally
    #[must_use]
    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done)
    }

    /// Short label for logs and status lines
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Done => "done",
            Self::Errored(_) => "errored",
            Self::Cancelled => "cancelled",
        }
    }
}

/// Everything a finished stream leaves behind
#[derive(Clone, Debug)]
pub struct StreamOutcome {
    /// Terminal status
    pub status: StreamStatus,
    /// The assembled message (partial unless `Done`)
    pub message: AssembledMessage,
    /// Counters collected while reading
    pub stats: AssemblerStats,
}

/// Create a linked cancellation handle and signal
#[must_use]
pub fn cancellation() -> (CancelHandle, CancelSignal) {
    let (tx, rx) = watch::channel(false);
    (CancelHandle { tx: Arc::new(tx) }, CancelSignal { rx })
}

/// Requests cancellation of an in-progress stream
#[derive(Clone, Debug)]
pub struct CancelHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl CancelHandle {
    /// Cancel the stream (idempotent)
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    /// Check if cancellation was requested
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }
}

/// Observed by the read loop to learn about cancellation
#[derive(Clone, Debug)]
pub struct CancelSignal {
    rx: watch::Receiver<bool>,
}

impl CancelSignal {
    /// A signal that never fires
    #[must_use]
    pub fn never() -> Self {
        let (_, signal) = cancellation();
        signal
    }

    /// Check if cancellation was requested
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolve once cancellation is requested
    ///
    /// Never resolves if every [`CancelHandle`] is dropped without cancelling.
    pub async fn cancelled(&mut self) {
        if self.rx.wait_for(|cancelled| *cancelled).await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

/// Read a reply stream to its end
///
/// Calls [`Presenter::on_delta`] once per applied delta and
/// [`Presenter::on_finished`] exactly once, after the transport is dropped.
pub async fn consume_stream<P>(
    mut transport: ByteStream,
    mut assembler: StreamAssembler,
    presenter: &mut P,
    mut cancel: CancelSignal,
) -> StreamOutcome
where
    P: Presenter + ?Sized,
{
    let mut decoder = FrameDecoder::new();
    let message_id = assembler.message().id().clone();
    assembler.start();
    debug!(%message_id, "reading reply stream");

    let status = loop {
        let next = tokio::select! {
            biased;
            () = cancel.cancelled() => break StreamStatus::Cancelled,
            next = transport.next() => next,
        };

        match next {
            Some(Ok(chunk)) => {
                decoder.push(&chunk);
                if drain_frames(&mut decoder, &mut assembler, presenter) {
                    break StreamStatus::Done;
                }
            }
            Some(Err(error)) => {
                warn!(%message_id, %error, "transport failed mid-stream");
                assembler.fail();
                break StreamStatus::Errored(StreamFailure::Transport(error));
            }
            None => {
                // A final line without its separator still counts
                if let Some(tail) = decoder.finish() {
                    if apply(&mut assembler, presenter, &tail) {
                        break StreamStatus::Done;
                    }
                }
                warn!(%message_id, "stream closed before [DONE]");
                assembler.fail();
                break StreamStatus::Errored(StreamFailure::ClosedWithoutSentinel);
            }
        }
    };

    drop(transport);

    let stats = assembler.stats().clone();
    info!(
        %message_id,
        status = status.label(),
        deltas = stats.deltas_applied,
        ignored = stats.frames_ignored,
        "reply stream finished"
    );
    presenter.on_finished(&message_id, assembler.text(), &status);

    StreamOutcome {
        status,
        message: assembler.into_message(),
        stats,
    }
}

/// Finish a stream that never produced a transport
///
/// Used when opening the stream fails or is cancelled. Reports to the
/// presenter exactly like [`consume_stream`] would.
pub fn finish_unopened<P>(
    mut assembler: StreamAssembler,
    presenter: &mut P,
    status: StreamStatus,
) -> StreamOutcome
where
    P: Presenter + ?Sized,
{
    if matches!(status, StreamStatus::Errored(_)) {
        assembler.fail();
    }
    let message_id = assembler.message().id().clone();
    debug!(%message_id, status = status.label(), "reply stream never opened");
    presenter.on_finished(&message_id, assembler.text(), &status);

    StreamOutcome {
        status,
        stats: assembler.stats().clone(),
        message: assembler.into_message(),
    }
}

/// Apply every buffered frame; returns `true` once the stream completed
fn drain_frames<P>(
    decoder: &mut FrameDecoder,
    assembler: &mut StreamAssembler,
    presenter: &mut P,
) -> bool
where
    P: Presenter + ?Sized,
{
    while let Some(frame) = decoder.next_frame() {
        if apply(assembler, presenter, &frame) {
            return true;
        }
    }
    false
}

fn apply<P>(assembler: &mut StreamAssembler, presenter: &mut P, frame: &str) -> bool
where
    P: Presenter + ?Sized,
{
    match assembler.apply_frame(frame) {
        FrameOutcome::Applied { delta } => {
            presenter.on_delta(assembler.message().id(), &delta, assembler.text());
            false
        }
        FrameOutcome::Completed => true,
        FrameOutcome::Ignored(reason) => {
            trace!(?reason, "frame ignored");
            false
        }
    }
}
