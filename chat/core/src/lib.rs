//! Alpha Chat Core - Streaming Reply Assembly for alpha-chat
//!
//! This crate holds everything behind the chat surfaces: decoding the
//! server-sent-event style reply stream, assembling the assistant message as
//! it grows, the producers that answer a turn, and the small mock identity
//! layer of the demo app. It has no terminal or UI dependencies.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                          Surfaces                                 │
//! │         ┌─────────┐   ┌───────────┐   ┌─────────────────┐        │
//! │         │   CLI   │   │  Web page │   │ Tests / headless │        │
//! │         └────┬────┘   └─────┬─────┘   └────────┬────────┘        │
//! │              └──────────────┼──────────────────┘                 │
//! │                  Presenter / ChatUpdate (down)                    │
//! └─────────────────────────────┼────────────────────────────────────┘
//!                               │
//! ┌─────────────────────────────┼────────────────────────────────────┐
//! │                     ALPHA CHAT CORE                               │
//! │  ┌──────────────┐  ┌────────┴───────┐  ┌────────────────────────┐ │
//! │  │ ChatSession  │──│  consume_stream │──│ FrameDecoder           │ │
//! │  │ (history)    │  │  (read loop)    │  │ StreamAssembler        │ │
//! │  └──────┬───────┘  └────────────────┘  └────────────────────────┘ │
//! │         │ open_stream                                            │
//! │  ┌──────┴───────────────────────────┐  ┌────────────────────────┐ │
//! │  │ EventProducer                    │  │ AuthService            │ │
//! │  │  ScriptedResponder | HttpProducer │  │ UserDirectory, Store   │ │
//! │  └──────────────────────────────────┘  └────────────────────────┘ │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Key Types
//!
//! - [`FrameDecoder`]: splits byte chunks into lines with carry-over
//! - [`StreamAssembler`]: turns lines into one growing assistant message
//! - [`consume_stream`]: the sequential read loop
//! - [`ChatSession`]: message history and one-turn-at-a-time policy
//! - [`EventProducer`]: anything that answers a turn with a byte stream
//!
//! # Quick Start
//!
//! ```ignore
//! use alpha_chat_core::{
//!     backend::producer_from_config, config::load_config, CancelSignal, ChatSession,
//! };
//! use tokio::sync::mpsc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = load_config()?;
//!     let mut session = ChatSession::new(producer_from_config(&config)?, &config);
//!
//!     let (mut tx, mut rx) = mpsc::unbounded_channel();
//!     let outcome = session.submit("Hello", &mut tx, CancelSignal::never()).await?;
//!     while let Ok(update) = rx.try_recv() {
//!         // Render update
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Module Overview
//!
//! - [`streaming`]: wire format, frame decoder, assembler, read loop
//! - [`transport`]: byte stream types and the chunked transport
//! - [`backend`]: event producers (scripted, HTTP)
//! - [`presenter`]: presentation sink trait
//! - [`messages`]: ids, roles, chat messages, updates
//! - [`session`]: chat session orchestration
//! - [`auth`]: mock user directory and sign-in flows
//! - [`store`]: session store
//! - [`dashboard`]: canned session listings
//! - [`config`]: TOML / environment / CLI configuration

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod auth;
pub mod backend;
pub mod config;
pub mod dashboard;
pub mod messages;
pub mod presenter;
pub mod session;
pub mod store;
pub mod streaming;
pub mod transport;

// Re-exports for convenience
pub use auth::{AuthError, AuthService, AuthSession, User, UserDirectory};
pub use backend::{
    producer_from_config, ChatRequest, EventProducer, HttpProducer, ScriptedResponder,
    TurnMessage,
};
pub use dashboard::{sessions_for, SessionSummary};
pub use messages::{ChatMessage, ChatUpdate, MessageId, MessageRole, SessionId};
pub use presenter::{NullPresenter, Presenter};
pub use session::{ChatSession, PendingTurn, SessionState, SubmitError};
pub use store::{InMemorySessionStore, SessionStore};

// Streaming exports
pub use streaming::{
    cancellation, consume_stream, AssembledMessage, AssemblerState, CancelHandle, CancelSignal,
    FrameDecoder, FrameOutcome, IgnoredFrame, StreamAssembler, StreamFailure, StreamOutcome,
    StreamStatus,
};

// Transport exports
pub use transport::{ByteStream, ChunkPlan, ChunkedTransport, TransportError};

// Config exports
pub use config::{
    default_config_path, load_config, load_config_from_path, ChatConfig, ConfigError,
    ConfigOverrides, ConfigSource, ProducerKind,
};
