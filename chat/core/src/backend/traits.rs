//! Event Producer Traits
//!
//! Trait definitions for anything that answers a chat turn with a framed byte
//! stream. The read loop never knows which producer it is reading from.
//!
//! # Design Philosophy
//!
//! The EventProducer trait provides a common interface for:
//! - Opening a reply stream for the current conversation
//! - Identifying the producer in logs
//!
//! Implementations own their connection details (endpoint, auth, pacing).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::messages::{ChatMessage, MessageRole};
use crate::transport::{ByteStream, TransportError};

/// One entry of the conversation sent with a request
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnMessage {
    /// Who sent the message
    pub role: MessageRole,
    /// Message text
    pub content: String,
}

/// Body of a chat request: the whole conversation, newest message last
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Conversation history
    pub messages: Vec<TurnMessage>,
}

impl ChatRequest {
    /// Create an empty request
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a request from chat history
    ///
    /// Messages that are still streaming are skipped.
    #[must_use]
    pub fn from_history(history: &[ChatMessage]) -> Self {
        Self {
            messages: history
                .iter()
                .filter(|m| !m.streaming)
                .map(|m| TurnMessage {
                    role: m.role,
                    content: m.content.clone(),
                })
                .collect(),
        }
    }

    /// Append a message
    #[must_use]
    pub fn with_message(mut self, role: MessageRole, content: impl Into<String>) -> Self {
        self.messages.push(TurnMessage {
            role,
            content: content.into(),
        });
        self
    }

    /// Content of the newest message, or `""` if there is none
    #[must_use]
    pub fn last_content(&self) -> &str {
        self.messages.last().map_or("", |m| m.content.as_str())
    }
}

/// Event producer trait
///
/// Implement this trait to answer chat turns from a new source.
#[async_trait]
pub trait EventProducer: Send + Sync {
    /// Get the producer name (e.g., "scripted", "http")
    fn name(&self) -> &str;

    /// Open the reply stream for a request
    ///
    /// The stream yields raw wire-format bytes at arbitrary chunk boundaries.
    async fn open_stream(&self, request: &ChatRequest) -> Result<ByteStream, TransportError>;
}
