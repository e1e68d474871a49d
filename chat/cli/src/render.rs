//! Terminal rendering
//!
//! Deltas go to stdout as they arrive. Status notes go to stderr so a piped
//! stdout holds only reply text.

use std::io::{self, Write};

use alpha_chat_core::{MessageId, Presenter, StreamStatus};

/// Prints a reply to stdout while it streams
#[derive(Debug)]
pub struct TerminalPresenter {
    fallback_message: String,
    started: bool,
}

impl TerminalPresenter {
    /// Create a presenter that prints `fallback_message` when a reply fails
    pub fn new(fallback_message: String) -> Self {
        Self {
            fallback_message,
            started: false,
        }
    }

    fn write_stdout(text: &str) {
        let mut out = io::stdout().lock();
        // A closed stdout only loses output
        let _ = out.write_all(text.as_bytes());
        let _ = out.flush();
    }
}

impl Presenter for TerminalPresenter {
    fn on_delta(&mut self, _message_id: &MessageId, delta: &str, _text: &str) {
        self.started = true;
        Self::write_stdout(delta);
    }

    fn on_finished(&mut self, message_id: &MessageId, _final_text: &str, status: &StreamStatus) {
        if self.started {
            Self::write_stdout("\n");
        }
        match status {
            StreamStatus::Done => {}
            StreamStatus::Errored(failure) => {
                tracing::debug!(%message_id, %failure, "reply failed");
                Self::write_stdout(&format!("{}\n", self.fallback_message));
            }
            StreamStatus::Cancelled => eprintln!("(reply cancelled)"),
        }
    }
}

/// Print the input prompt
pub fn prompt() -> io::Result<()> {
    let mut err = io::stderr().lock();
    write!(err, "> ")?;
    err.flush()
}
