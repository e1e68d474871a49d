//! Presentation Sink
//!
//! The read loop reports through [`Presenter`] and never renders anything
//! itself. A surface implements the trait directly, or hands the loop a
//! channel and renders [`ChatUpdate`]s on its own task.

use tokio::sync::mpsc;

use crate::messages::{ChatUpdate, MessageId};
use crate::streaming::StreamStatus;

/// Receives reply progress from the read loop
pub trait Presenter: Send {
    /// A delta was appended; `text` is the full message so far
    fn on_delta(&mut self, message_id: &MessageId, delta: &str, text: &str);

    /// The stream ended; called exactly once per stream
    fn on_finished(&mut self, message_id: &MessageId, final_text: &str, status: &StreamStatus);
}

/// Forwards updates to a rendering task
///
/// A closed receiver is not an error: the surface went away and the stream
/// still finishes normally.
impl Presenter for mpsc::UnboundedSender<ChatUpdate> {
    fn on_delta(&mut self, message_id: &MessageId, delta: &str, text: &str) {
        let _ = self.send(delta_update(message_id, delta, text));
    }

    fn on_finished(&mut self, message_id: &MessageId, final_text: &str, status: &StreamStatus) {
        let _ = self.send(finished_update(message_id, final_text, status));
    }
}

/// Records updates in order
impl Presenter for Vec<ChatUpdate> {
    fn on_delta(&mut self, message_id: &MessageId, delta: &str, text: &str) {
        self.push(delta_update(message_id, delta, text));
    }

    fn on_finished(&mut self, message_id: &MessageId, final_text: &str, status: &StreamStatus) {
        self.push(finished_update(message_id, final_text, status));
    }
}

/// Discards everything (headless callers that only want the outcome)
#[derive(Clone, Copy, Debug, Default)]
pub struct NullPresenter;

impl Presenter for NullPresenter {
    fn on_delta(&mut self, _message_id: &MessageId, _delta: &str, _text: &str) {}

    fn on_finished(&mut self, _message_id: &MessageId, _final_text: &str, _status: &StreamStatus) {}
}

fn delta_update(message_id: &MessageId, delta: &str, text: &str) -> ChatUpdate {
    ChatUpdate::Delta {
        message_id: message_id.clone(),
        delta: delta.to_string(),
        text: text.to_string(),
    }
}

fn finished_update(message_id: &MessageId, final_text: &str, status: &StreamStatus) -> ChatUpdate {
    ChatUpdate::Finished {
        message_id: message_id.clone(),
        final_text: final_text.to_string(),
        status: status.clone(),
    }
}
