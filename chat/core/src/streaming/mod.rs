//! Reply Stream Decoding
//!
//! Turns a chunked byte stream of server-sent-event style frames into one
//! incrementally assembled assistant message.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────┐  bytes   ┌──────────────┐  lines   ┌────────────────┐
//! │  ByteStream   │ ───────▶ │ FrameDecoder │ ───────▶ │ StreamAssembler │
//! │  (transport)  │          │ (carry-over) │          │ (state machine) │
//! └───────────────┘          └──────────────┘          └───────┬────────┘
//!                                                              │ deltas
//!                                                              ▼
//!                                                        ┌───────────┐
//!                                                        │ Presenter │
//!                                                        └───────────┘
//! ```
//!
//! [`consume_stream`] owns the loop. The decoder only splits lines, the
//! assembler only interprets them, and the presenter only renders.
//!
//! # Example
//!
//! ```ignore
//! use alpha_chat_core::streaming::{consume_stream, CancelSignal, StreamAssembler};
//! use alpha_chat_core::transport::ChunkedTransport;
//! use alpha_chat_core::MessageId;
//!
//! let transport = ChunkedTransport::new("data: {\"content\":\"Hi\"}\n\ndata: [DONE]\n\n");
//! let mut updates = Vec::new();
//! let outcome = consume_stream(
//!     transport.into_stream(),
//!     StreamAssembler::new(MessageId::new()),
//!     &mut updates,
//!     CancelSignal::never(),
//! )
//! .await;
//! assert_eq!(outcome.message.text(), "Hi");
//! ```

pub mod assembler;
pub mod frame_decoder;
pub mod reader;
pub mod wire;

pub use assembler::{
    AssembledMessage, AssemblerState, AssemblerStats, FrameOutcome, IgnoredFrame,
    StreamAssembler,
};
pub use frame_decoder::{FrameDecoder, Frames};
pub use reader::{
    cancellation, consume_stream, finish_unopened, CancelHandle, CancelSignal, StreamFailure,
    StreamOutcome, StreamStatus,
};
