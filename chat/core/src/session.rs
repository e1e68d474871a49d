//! Chat Session
//!
//! Owns the message history of one conversation and runs its turns against
//! an event producer.
//!
//! # Design Philosophy
//!
//! A turn is the user message plus the assistant reply streamed in answer to
//! it. Only one turn runs at a time; each turn gets a fresh assembler and a
//! fresh message id, so a cancelled or failed reply never bleeds into the
//! next one. A failed reply is replaced in history by the fallback message,
//! while the presenter still sees the partial text and the `Errored` status.
//!
//! Surfaces that drive the stream themselves use the two halves,
//! [`ChatSession::begin_turn`] and [`ChatSession::finish_turn`]; everything
//! else calls [`ChatSession::submit`].

use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use crate::backend::{ChatRequest, EventProducer};
use crate::config::ChatConfig;
use crate::messages::{ChatMessage, MessageId, MessageRole, SessionId};
use crate::presenter::Presenter;
use crate::streaming::{
    consume_stream, finish_unopened, CancelSignal, StreamAssembler, StreamFailure, StreamOutcome,
    StreamStatus,
};

/// Reasons a turn is refused before anything is sent
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SubmitError {
    /// Input was empty or whitespace
    #[error("message is empty")]
    EmptyInput,

    /// A reply is still streaming
    #[error("a reply is still streaming")]
    TurnInProgress,
}

/// Session state
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    /// Ready for the next turn
    Idle,
    /// A reply is streaming
    Busy,
}

/// A turn that has been recorded but not yet streamed
#[derive(Clone, Debug)]
pub struct PendingTurn {
    /// Id of the empty assistant message awaiting the reply
    pub message_id: MessageId,
    /// Request to send to the producer
    pub request: ChatRequest,
}

impl PendingTurn {
    /// A fresh assembler for this turn's reply
    #[must_use]
    pub fn assembler(&self) -> StreamAssembler {
        StreamAssembler::new(self.message_id.clone())
    }
}

/// One conversation with an event producer
pub struct ChatSession {
    id: SessionId,
    producer: Arc<dyn EventProducer>,
    fallback_message: String,
    messages: Vec<ChatMessage>,
    in_flight: Option<MessageId>,
    turns_completed: u32,
}

impl std::fmt::Debug for ChatSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatSession")
            .field("id", &self.id)
            .field("producer", &self.producer.name())
            .field("messages", &self.messages.len())
            .field("in_flight", &self.in_flight)
            .finish_non_exhaustive()
    }
}

impl ChatSession {
    /// Create a session answered by `producer`
    pub fn new(producer: Arc<dyn EventProducer>, config: &ChatConfig) -> Self {
        Self {
            id: SessionId::new(),
            producer,
            fallback_message: config.fallback_message.clone(),
            messages: Vec::new(),
            in_flight: None,
            turns_completed: 0,
        }
    }

    /// Session id
    #[must_use]
    pub fn id(&self) -> &SessionId {
        &self.id
    }

    /// Message history, oldest first
    #[must_use]
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Current state
    #[must_use]
    pub fn state(&self) -> SessionState {
        if self.in_flight.is_some() {
            SessionState::Busy
        } else {
            SessionState::Idle
        }
    }

    /// Number of turns that have finished, in any status
    #[must_use]
    pub fn turns_completed(&self) -> u32 {
        self.turns_completed
    }

    /// Text substituted for a failed reply
    #[must_use]
    pub fn fallback_message(&self) -> &str {
        &self.fallback_message
    }

    /// Drop the history
    ///
    /// # Errors
    ///
    /// Returns [`SubmitError::TurnInProgress`] while a reply is streaming.
    pub fn clear(&mut self) -> Result<(), SubmitError> {
        if self.in_flight.is_some() {
            return Err(SubmitError::TurnInProgress);
        }
        self.messages.clear();
        Ok(())
    }

    /// Record the user message and an empty assistant message
    ///
    /// The request carries the whole history up to and including the new
    /// user message.
    ///
    /// # Errors
    ///
    /// Returns [`SubmitError::EmptyInput`] for blank input and
    /// [`SubmitError::TurnInProgress`] if the previous turn is unfinished.
    pub fn begin_turn(&mut self, input: &str) -> Result<PendingTurn, SubmitError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(SubmitError::EmptyInput);
        }
        if self.in_flight.is_some() {
            return Err(SubmitError::TurnInProgress);
        }

        self.messages.push(ChatMessage::new(MessageRole::User, input));
        let request = ChatRequest::from_history(&self.messages);

        let message_id = MessageId::new();
        self.messages
            .push(ChatMessage::streaming_with_id(message_id.clone()));
        self.in_flight = Some(message_id.clone());

        info!(session = %self.id.0, %message_id, producer = self.producer.name(), "turn started");
        Ok(PendingTurn {
            message_id,
            request,
        })
    }

    /// Write a finished stream into the history
    ///
    /// `Done` keeps the assembled text, `Errored` substitutes the fallback
    /// message and `Cancelled` keeps whatever arrived (an empty cancelled
    /// reply is removed). Returns the assistant message, or `None` if the
    /// outcome does not belong to the turn in flight.
    pub fn finish_turn(&mut self, outcome: &StreamOutcome) -> Option<&ChatMessage> {
        let message_id = outcome.message.id();
        if self.in_flight.as_ref() != Some(message_id) {
            warn!(%message_id, "outcome does not match the turn in flight");
            return None;
        }
        self.in_flight = None;
        self.turns_completed += 1;

        let position = self.messages.iter().position(|m| &m.id == message_id)?;
        match &outcome.status {
            StreamStatus::Done => {
                self.messages[position].complete_with(outcome.message.text().to_string());
            }
            StreamStatus::Errored(failure) => {
                warn!(%message_id, %failure, "reply failed, showing fallback");
                self.messages[position].complete_with(self.fallback_message.clone());
            }
            StreamStatus::Cancelled if outcome.message.text().is_empty() => {
                self.messages.remove(position);
                return None;
            }
            StreamStatus::Cancelled => {
                self.messages[position].complete_with(outcome.message.text().to_string());
            }
        }
        Some(&self.messages[position])
    }

    /// Abandon the turn in flight without an outcome
    ///
    /// The unfinished assistant message is removed and the session becomes
    /// idle. Returns the id of the abandoned message, or `None` if no turn
    /// was running.
    pub fn abort_turn(&mut self) -> Option<MessageId> {
        let message_id = self.in_flight.take()?;
        self.messages.retain(|m| m.id != message_id);
        warn!(session = %self.id.0, %message_id, "turn abandoned before it finished");
        Some(message_id)
    }

    /// Run one full turn
    ///
    /// Opens the producer stream, reads it to the end through `presenter`,
    /// and records the result. Cancelling `cancel` abandons the reply, also
    /// while the stream is still being opened. Dropping the returned future
    /// before it completes (e.g. under `tokio::time::timeout`) aborts the
    /// turn as [`ChatSession::abort_turn`] does.
    ///
    /// # Errors
    ///
    /// Same as [`ChatSession::begin_turn`]. Stream failures are not errors;
    /// they are reported through the outcome's status.
    pub async fn submit<P>(
        &mut self,
        input: &str,
        presenter: &mut P,
        mut cancel: CancelSignal,
    ) -> Result<StreamOutcome, SubmitError>
    where
        P: Presenter + ?Sized,
    {
        let turn = self.begin_turn(input)?;
        let assembler = turn.assembler();
        let mut guard = TurnGuard { session: self };
        let producer = Arc::clone(&guard.session.producer);

        let opened = tokio::select! {
            biased;
            () = cancel.cancelled() => None,
            opened = producer.open_stream(&turn.request) => Some(opened),
        };

        let outcome = match opened {
            Some(Ok(transport)) => consume_stream(transport, assembler, presenter, cancel).await,
            Some(Err(error)) => finish_unopened(
                assembler,
                presenter,
                StreamStatus::Errored(StreamFailure::Transport(error)),
            ),
            None => finish_unopened(assembler, presenter, StreamStatus::Cancelled),
        };

        guard.session.finish_turn(&outcome);
        info!(
            session = %guard.session.id.0,
            status = outcome.status.label(),
            turns = guard.session.turns_completed,
            "turn finished"
        );
        Ok(outcome)
    }
}

/// Aborts the turn in flight if `submit` is dropped mid-await
struct TurnGuard<'a> {
    session: &'a mut ChatSession,
}

impl Drop for TurnGuard<'_> {
    fn drop(&mut self) {
        self.session.abort_turn();
    }
}
