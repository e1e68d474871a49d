//! Transport Layer for Streamed Replies
//!
//! A transport is anything that yields the raw bytes of a framed reply:
//! - an HTTP response body (see [`crate::backend::HttpProducer`])
//! - a scripted, timer-paced byte source ([`ChunkedTransport`])
//!
//! # Design Philosophy
//!
//! The read loop only ever sees a [`ByteStream`]. Where the bytes come from,
//! and how they are cut into chunks, is invisible to the frame decoder and
//! the assembler. That keeps the streaming core testable under arbitrary
//! chunk boundaries.

pub mod chunked;
pub mod traits;

// Re-exports for convenience
pub use chunked::{ChunkPlan, ChunkedTransport};
pub use traits::{ByteChunk, ByteStream, TransportError};
