//! Stream Assembler
//!
//! Interprets decoded frames and grows a single assistant message.
//!
//! # State machine
//!
//! ```text
//!            start / first delta            [DONE]
//!   Idle ─────────────────────────▶ Streaming ──────▶ Done
//!     │                              │  ▲  │
//!     │                              │  └──┘ delta
//!     └──────────────┬───────────────┘
//!                    ▼ transport failure
//!                 Errored
//! ```
//!
//! Per-frame problems never leave `Streaming`: frames without the event
//! prefix, payloads that are not JSON, and payloads without a `content`
//! string are dropped. Once `Done` or `Errored` is reached every further
//! frame is ignored and the text is frozen.

use std::time::Instant;

use tracing::{debug, trace};

use super::wire::{classify, parse_content, FrameKind};
use crate::messages::{MessageId, MessageRole};

/// Assembler lifecycle
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AssemblerState {
    /// No stream started yet
    Idle,
    /// Deltas are being applied
    Streaming,
    /// The termination sentinel was seen
    Done,
    /// The transport failed before the sentinel
    Errored,
}

impl AssemblerState {
    /// Whether no further mutation can happen
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Errored)
    }
}

/// The assistant reply being assembled for one turn
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssembledMessage {
    id: MessageId,
    text: String,
}

impl AssembledMessage {
    /// Create an empty message
    #[must_use]
    pub fn new(id: MessageId) -> Self {
        Self {
            id,
            text: String::new(),
        }
    }

    /// Message identifier
    #[must_use]
    pub fn id(&self) -> &MessageId {
        &self.id
    }

    /// Always [`MessageRole::Assistant`]
    #[must_use]
    pub fn role(&self) -> MessageRole {
        MessageRole::Assistant
    }

    /// Text assembled so far
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Consume the message, returning its text
    #[must_use]
    pub fn into_text(self) -> String {
        self.text
    }
}

/// Why a frame did not change the message
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IgnoredFrame {
    /// No `data: ` prefix (blank separator, keep-alive, comment)
    NotAnEvent,
    /// Event payload is not valid JSON
    MalformedDelta,
    /// Valid JSON without a non-empty `content` string
    MissingContent,
    /// Arrived after the stream reached a terminal state
    AfterTerminal,
}

/// Result of applying one frame
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FrameOutcome {
    /// A delta was appended
    Applied {
        /// The appended fragment
        delta: String,
    },
    /// The termination sentinel was seen
    Completed,
    /// The frame was dropped
    Ignored(IgnoredFrame),
}

/// Counters for one assembled stream
#[derive(Clone, Debug, Default)]
pub struct AssemblerStats {
    /// Deltas appended to the message
    pub deltas_applied: u32,
    /// Frames dropped for any reason
    pub frames_ignored: u32,
    /// Event payloads that failed to parse
    pub malformed_frames: u32,
    /// When the stream started
    pub started_at: Option<Instant>,
    /// When the last delta was applied
    pub last_delta_at: Option<Instant>,
}

/// Applies frames, in arrival order, to one [`AssembledMessage`]
#[derive(Debug)]
pub struct StreamAssembler {
    message: AssembledMessage,
    state: AssemblerState,
    stats: AssemblerStats,
}

impl StreamAssembler {
    /// Create an idle assembler with an empty message
    #[must_use]
    pub fn new(message_id: MessageId) -> Self {
        Self {
            message: AssembledMessage::new(message_id),
            state: AssemblerState::Idle,
            stats: AssemblerStats::default(),
        }
    }

    /// Current state
    #[must_use]
    pub fn state(&self) -> AssemblerState {
        self.state
    }

    /// Check if the stream reached `Done` or `Errored`
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    /// The message being assembled
    #[must_use]
    pub fn message(&self) -> &AssembledMessage {
        &self.message
    }

    /// Text assembled so far
    #[must_use]
    pub fn text(&self) -> &str {
        self.message.text()
    }

    /// Stream counters
    #[must_use]
    pub fn stats(&self) -> &AssemblerStats {
        &self.stats
    }

    /// Consume the assembler, returning the message
    #[must_use]
    pub fn into_message(self) -> AssembledMessage {
        self.message
    }

    /// Mark the stream as started (`Idle → Streaming`)
    ///
    /// No-op in any other state.
    pub fn start(&mut self) {
        if self.state == AssemblerState::Idle {
            self.state = AssemblerState::Streaming;
            self.stats.started_at = Some(Instant::now());
        }
    }

    /// Record a transport failure
    ///
    /// Returns `false`, leaving the state untouched, if the stream had
    /// already reached a terminal state.
    pub fn fail(&mut self) -> bool {
        if self.state.is_terminal() {
            return false;
        }
        self.state = AssemblerState::Errored;
        true
    }

    /// Apply one decoded frame
    pub fn apply_frame(&mut self, frame: &str) -> FrameOutcome {
        if self.state.is_terminal() {
            trace!(message_id = %self.message.id, "frame after terminal state ignored");
            return self.ignore(IgnoredFrame::AfterTerminal);
        }

        match classify(frame) {
            FrameKind::Other => self.ignore(IgnoredFrame::NotAnEvent),
            FrameKind::Done => {
                self.state = AssemblerState::Done;
                debug!(
                    message_id = %self.message.id,
                    deltas = self.stats.deltas_applied,
                    "stream complete"
                );
                FrameOutcome::Completed
            }
            FrameKind::Data(payload) => match parse_content(payload) {
                Ok(Some(delta)) if !delta.is_empty() => {
                    self.start();
                    self.message.text.push_str(&delta);
                    self.stats.deltas_applied += 1;
                    self.stats.last_delta_at = Some(Instant::now());
                    FrameOutcome::Applied { delta }
                }
                Ok(_) => self.ignore(IgnoredFrame::MissingContent),
                Err(e) => {
                    self.stats.malformed_frames += 1;
                    debug!(
                        message_id = %self.message.id,
                        error = %e,
                        "discarding malformed delta"
                    );
                    self.ignore(IgnoredFrame::MalformedDelta)
                }
            },
        }
    }

    fn ignore(&mut self, reason: IgnoredFrame) -> FrameOutcome {
        self.stats.frames_ignored += 1;
        FrameOutcome::Ignored(reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn assembler() -> StreamAssembler {
        StreamAssembler::new(MessageId::new())
    }

    fn applied(delta: &str) -> FrameOutcome {
        FrameOutcome::Applied {
            delta: delta.to_string(),
        }
    }

    #[test]
    fn test_new_assembler_is_idle_and_empty() {
        let asm = assembler();
        assert_eq!(asm.state(), AssemblerState::Idle);
        assert_eq!(asm.text(), "");
        assert_eq!(asm.message().role(), MessageRole::Assistant);
    }

    #[test]
    fn test_start_transitions_to_streaming() {
        let mut asm = assembler();
        asm.start();
        assert_eq!(asm.state(), AssemblerState::Streaming);
        assert!(asm.stats().started_at.is_some());
    }

    #[test]
    fn test_first_delta_starts_stream() {
        let mut asm = assembler();
        assert_eq!(asm.apply_frame("data: {\"content\":\"Hi\"}"), applied("Hi"));
        assert_eq!(asm.state(), AssemblerState::Streaming);
        assert_eq!(asm.text(), "Hi");
    }

    #[test]
    fn test_deltas_concatenate_in_order() {
        let mut asm = assembler();
        asm.start();
        for frame in [
            "data: {\"content\":\"Hello\"}",
            "",
            "data: {\"content\":\" world\"}",
            "",
        ] {
            asm.apply_frame(frame);
        }
        assert_eq!(asm.apply_frame("data: [DONE]"), FrameOutcome::Completed);
        assert_eq!(asm.text(), "Hello world");
        assert_eq!(asm.state(), AssemblerState::Done);
        assert_eq!(asm.stats().deltas_applied, 2);
    }

    #[test]
    fn test_frames_after_done_are_ignored() {
        let mut asm = assembler();
        asm.start();
        assert_eq!(asm.apply_frame("data: [DONE]"), FrameOutcome::Completed);
        assert_eq!(
            asm.apply_frame("data: {\"content\":\"x\"}"),
            FrameOutcome::Ignored(IgnoredFrame::AfterTerminal)
        );
        assert_eq!(
            asm.apply_frame("data: [DONE]"),
            FrameOutcome::Ignored(IgnoredFrame::AfterTerminal)
        );
        assert_eq!(asm.text(), "");
        assert_eq!(asm.state(), AssemblerState::Done);
    }

    #[test]
    fn test_malformed_delta_keeps_streaming() {
        let mut asm = assembler();
        asm.apply_frame("data: {\"content\":\"ok\"}");

        let outcome = asm.apply_frame("data: {\"content\":\"bro");
        assert_eq!(outcome, FrameOutcome::Ignored(IgnoredFrame::MalformedDelta));
        assert_eq!(asm.state(), AssemblerState::Streaming);
        assert_eq!(asm.text(), "ok");
        assert_eq!(asm.stats().malformed_frames, 1);

        assert_eq!(asm.apply_frame("data: {\"content\":\"!\"}"), applied("!"));
        assert_eq!(asm.text(), "ok!");
    }

    #[test]
    fn test_blank_and_foreign_lines_are_ignored() {
        let mut asm = assembler();
        asm.start();
        for frame in ["", ": ping", "event: message", "id: 7", "data:{\"content\":\"x\"}"] {
            assert_eq!(
                asm.apply_frame(frame),
                FrameOutcome::Ignored(IgnoredFrame::NotAnEvent)
            );
        }
        assert_eq!(asm.state(), AssemblerState::Streaming);
        assert_eq!(asm.text(), "");
    }

    #[test]
    fn test_blank_frame_while_idle_stays_idle() {
        let mut asm = assembler();
        asm.apply_frame("");
        assert_eq!(asm.state(), AssemblerState::Idle);
    }

    #[test]
    fn test_missing_or_empty_content() {
        let mut asm = assembler();
        asm.start();
        for frame in [
            "data: {}",
            "data: {\"content\":\"\"}",
            "data: {\"content\":null}",
            "data: {\"content\":42}",
            "data: \"just a string\"",
        ] {
            assert_eq!(
                asm.apply_frame(frame),
                FrameOutcome::Ignored(IgnoredFrame::MissingContent)
            );
        }
        assert_eq!(asm.text(), "");
        assert_eq!(asm.stats().frames_ignored, 5);
    }

    #[test]
    fn test_content_is_appended_verbatim() {
        let mut asm = assembler();
        asm.apply_frame("data: {\"content\":\"  **bold**\\n\\t\"}");
        asm.apply_frame("data: {\"content\":\"🚀 \"}");
        assert_eq!(asm.text(), "  **bold**\n\t🚀 ");
    }

    #[test]
    fn test_fail_from_streaming() {
        let mut asm = assembler();
        asm.apply_frame("data: {\"content\":\"part\"}");
        assert!(asm.fail());
        assert_eq!(asm.state(), AssemblerState::Errored);
        assert_eq!(
            asm.apply_frame("data: {\"content\":\"more\"}"),
            FrameOutcome::Ignored(IgnoredFrame::AfterTerminal)
        );
        assert_eq!(asm.text(), "part");
    }

    #[test]
    fn test_fail_from_idle() {
        let mut asm = assembler();
        assert!(asm.fail());
        assert_eq!(asm.state(), AssemblerState::Errored);
    }

    #[test]
    fn test_fail_after_done_is_rejected() {
        let mut asm = assembler();
        asm.apply_frame("data: [DONE]");
        assert!(!asm.fail());
        assert_eq!(asm.state(), AssemblerState::Done);
    }

    #[test]
    fn test_start_after_terminal_is_noop() {
        let mut asm = assembler();
        asm.fail();
        asm.start();
        assert_eq!(asm.state(), AssemblerState::Errored);
    }

    #[test]
    fn test_into_message() {
        let id = MessageId::new();
        let mut asm = StreamAssembler::new(id.clone());
        asm.apply_frame("data: {\"content\":\"done\"}");
        let msg = asm.into_message();
        assert_eq!(msg.id(), &id);
        assert_eq!(msg.into_text(), "done");
    }
}
