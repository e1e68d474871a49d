//! Chat Messages
//!
//! Identifiers, roles, and the messages exchanged between the chat core and
//! whatever surface renders it (CLI, web page, tests).
//!
//! # Design Philosophy
//!
//! Surfaces are pure renderers. They receive [`ChatUpdate`]s describing how the
//! assistant reply grows and when it finishes, and never touch the stream
//! themselves.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::streaming::StreamStatus;

/// Unique message identifier
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub String);

impl MessageId {
    /// Generate a new unique message ID
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        let id = COUNTER.fetch_add(1, Ordering::SeqCst);
        Self(format!("msg_{id}"))
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Chat session identifier
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    /// Generate a new unique session ID
    ///
    /// Uses an atomic counter combined with timestamp to ensure uniqueness
    /// even when multiple sessions are created in the same millisecond.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        let count = COUNTER.fetch_add(1, Ordering::SeqCst);
        Self(format!("session_{}_{count}", now_ms()))
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

/// Who authored a message
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// User input
    User,
    /// Assistant reply
    Assistant,
    /// System message
    System,
}

impl MessageRole {
    /// Wire name of the role
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::System => "system",
        }
    }
}

/// A message in the chat history
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Unique message ID
    pub id: MessageId,
    /// Who sent this message
    pub role: MessageRole,
    /// Message content
    pub content: String,
    /// When the message was created (Unix timestamp ms)
    pub timestamp: u64,
    /// Whether the message is still being streamed
    pub streaming: bool,
}

impl ChatMessage {
    /// Create a new complete message
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            id: MessageId::new(),
            role,
            content: content.into(),
            timestamp: now_ms(),
            streaming: false,
        }
    }

    /// Create an empty assistant message that a stream will fill in
    pub fn streaming_with_id(id: MessageId) -> Self {
        Self {
            id,
            role: MessageRole::Assistant,
            content: String::new(),
            timestamp: now_ms(),
            streaming: true,
        }
    }

    /// Replace the content and mark streaming as complete
    pub fn complete_with(&mut self, content: String) {
        self.content = content;
        self.streaming = false;
    }
}

/// Updates pushed to presentation surfaces while a reply streams in
#[derive(Clone, Debug)]
pub enum ChatUpdate {
    /// A delta was appended to the assistant message
    Delta {
        /// Message the delta belongs to
        message_id: MessageId,
        /// The appended fragment
        delta: String,
        /// Full text of the message after the append
        text: String,
    },

    /// The stream reached a terminal state
    Finished {
        /// Message that finished
        message_id: MessageId,
        /// Text assembled before the stream ended
        final_text: String,
        /// How the stream ended
        status: StreamStatus,
    },
}

impl ChatUpdate {
    /// Message this update refers to
    #[must_use]
    pub fn message_id(&self) -> &MessageId {
        match self {
            Self::Delta { message_id, .. } | Self::Finished { message_id, .. } => message_id,
        }
    }
}

/// Current Unix time in milliseconds
pub(crate) fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or_default()
}
