//! Transport Types
//!
//! The byte stream contract shared by every event producer.

use std::pin::Pin;

use futures::Stream;
use thiserror::Error;

/// Bytes delivered by a transport at arbitrary boundaries
pub type ByteChunk = bytes::Bytes;

/// A pull-based stream of byte chunks
///
/// The stream ends (`None`) when the transport closes. Dropping it releases
/// whatever the transport holds (HTTP connection, timer task).
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<ByteChunk, TransportError>> + Send>>;

/// Transport-level failures
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum TransportError {
    /// The request could not be sent or the connection could not be opened
    #[error("request failed: {0}")]
    Request(String),

    /// The endpoint answered with a non-success status
    #[error("endpoint returned {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body (may be empty)
        body: String,
    },

    /// Reading the next chunk failed mid-stream
    #[error("stream read failed: {0}")]
    Read(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        Self::Request(err.to_string())
    }
}
