//! Chunked Transport
//!
//! Serves a fixed byte payload as a [`ByteStream`], cut into chunks according
//! to a [`ChunkPlan`] and optionally paced by a delay between chunks.
//!
//! The scripted responder uses it to emit one frame per word with a pause in
//! between. Tests use it to replay the same payload under adversarial chunk
//! boundaries (single bytes, mid-JSON-escape splits, one giant chunk), to cut
//! the stream short, or to inject a read failure.

use std::time::Duration;

use bytes::Bytes;

use super::traits::{ByteChunk, ByteStream, TransportError};

/// How a payload is cut into chunks
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ChunkPlan {
    /// The whole payload in one chunk
    #[default]
    Whole,
    /// Chunks of a fixed size (the last one may be shorter)
    Fixed(usize),
    /// One byte per chunk
    SingleByte,
    /// Explicit chunk sizes in order; any remainder becomes a final chunk
    ///
    /// Zero sizes produce empty chunks.
    Sizes(Vec<usize>),
}

impl ChunkPlan {
    /// Cut a payload according to this plan
    #[must_use]
    pub fn split(&self, payload: &Bytes) -> Vec<ByteChunk> {
        match self {
            Self::Whole => vec![payload.clone()],
            Self::Fixed(0) => vec![payload.clone()],
            Self::Fixed(size) => payload
                .chunks(*size)
                .map(|c| payload.slice_ref(c))
                .collect(),
            Self::SingleByte => (0..payload.len())
                .map(|i| payload.slice(i..=i))
                .collect(),
            Self::Sizes(sizes) => {
                let mut chunks = Vec::with_capacity(sizes.len() + 1);
                let mut offset = 0;
                for &size in sizes {
                    let end = (offset + size).min(payload.len());
                    chunks.push(payload.slice(offset..end));
                    offset = end;
                }
                if offset < payload.len() {
                    chunks.push(payload.slice(offset..));
                }
                chunks
            }
        }
    }
}

/// A byte payload served as a paced, chunked stream
#[derive(Clone, Debug)]
pub struct ChunkedTransport {
    payload: Bytes,
    plan: ChunkPlan,
    delay: Duration,
    truncate_at: Option<usize>,
    failure: Option<(usize, TransportError)>,
}

impl ChunkedTransport {
    /// Create a transport that serves `payload` in a single chunk
    pub fn new(payload: impl Into<Bytes>) -> Self {
        Self {
            payload: payload.into(),
            plan: ChunkPlan::Whole,
            delay: Duration::ZERO,
            truncate_at: None,
            failure: None,
        }
    }

    /// Set the chunking plan
    #[must_use]
    pub fn with_plan(mut self, plan: ChunkPlan) -> Self {
        self.plan = plan;
        self
    }

    /// Pause this long before every chunk after the first
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Close the stream after `len` bytes, as if the connection dropped
    #[must_use]
    pub fn truncate_at(mut self, len: usize) -> Self {
        self.truncate_at = Some(len);
        self
    }

    /// Yield `error` after `chunks` chunks have been delivered
    ///
    /// If the plan yields fewer chunks, the error is raised at the end of
    /// the stream instead of a clean close.
    #[must_use]
    pub fn fail_after(mut self, chunks: usize, error: TransportError) -> Self {
        self.failure = Some((chunks, error));
        self
    }

    /// The chunks this transport will deliver, in order
    #[must_use]
    pub fn chunks(&self) -> Vec<ByteChunk> {
        let payload = match self.truncate_at {
            Some(len) => self.payload.slice(..len.min(self.payload.len())),
            None => self.payload.clone(),
        };
        self.plan.split(&payload)
    }

    /// Turn the transport into a [`ByteStream`]
    #[must_use]
    pub fn into_stream(self) -> ByteStream {
        let chunks = self.chunks();
        let delay = self.delay;
        let failure = self.failure;

        Box::pin(async_stream::stream! {
            let total = chunks.len();
            for (index, chunk) in chunks.into_iter().enumerate() {
                if let Some((after, error)) = &failure {
                    if index == *after {
                        yield Err(error.clone());
                        return;
                    }
                }
                if index > 0 && !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                yield Ok(chunk);
            }
            if let Some((after, error)) = failure {
                if after >= total {
                    yield Err(error);
                }
            }
        })
    }
}
