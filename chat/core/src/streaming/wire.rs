//! Wire Format
//!
//! Server-sent-event style framing used by every event producer:
//!
//! ```text
//! data: {"content":"Hel"}\n
//! \n
//! data: {"content":"lo"}\n
//! \n
//! data: [DONE]\n
//! \n
//! ```
//!
//! Each event is one `data: ` line followed by a blank line. The payload is
//! either a JSON object with a string `content` field or the literal
//! `[DONE]` sentinel. Blank lines are separators and carry no meaning.

/// Prefix that marks a line as an event
pub const DATA_PREFIX: &str = "data: ";

/// Payload that terminates a stream
pub const DONE_SENTINEL: &str = "[DONE]";

/// The complete termination frame, including its separator
pub const DONE_FRAME: &str = "data: [DONE]\n\n";

/// JSON field holding a content delta
pub const CONTENT_FIELD: &str = "content";

/// What a single decoded line represents
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameKind<'a> {
    /// The termination sentinel
    Done,
    /// An event payload (the text after the prefix)
    Data(&'a str),
    /// Anything without the event prefix: blank separators, keep-alives, comments
    Other,
}

/// Classify a decoded line
#[must_use]
pub fn classify(frame: &str) -> FrameKind<'_> {
    match frame.strip_prefix(DATA_PREFIX) {
        Some(DONE_SENTINEL) => FrameKind::Done,
        Some(payload) => FrameKind::Data(payload),
        None => FrameKind::Other,
    }
}

/// Extract the content delta from an event payload
///
/// Returns `Ok(None)` when the payload is valid JSON but carries no string
/// `content` field.
///
/// # Errors
///
/// Returns the JSON error when the payload does not parse.
pub fn parse_content(payload: &str) -> Result<Option<String>, serde_json::Error> {
    let value: serde_json::Value = serde_json::from_str(payload)?;
    Ok(value
        .get(CONTENT_FIELD)
        .and_then(serde_json::Value::as_str)
        .map(str::to_owned))
}

/// Encode one content event, separator included
#[must_use]
pub fn encode_content(content: &str) -> String {
    let payload = serde_json::json!({ "content": content });
    format!("{DATA_PREFIX}{payload}\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_done() {
        assert_eq!(classify("data: [DONE]"), FrameKind::Done);
    }

    #[test]
    fn test_classify_data() {
        assert_eq!(
            classify("data: {\"content\":\"x\"}"),
            FrameKind::Data("{\"content\":\"x\"}")
        );
    }

    #[test]
    fn test_classify_other() {
        assert_eq!(classify(""), FrameKind::Other);
        assert_eq!(classify(": keep-alive"), FrameKind::Other);
        assert_eq!(classify("event: message"), FrameKind::Other);
        // Prefix without the space is not an event
        assert_eq!(classify("data:{\"content\":\"x\"}"), FrameKind::Other);
    }

    #[test]
    fn test_sentinel_must_match_exactly() {
        assert_eq!(classify("data: [DONE] "), FrameKind::Data("[DONE] "));
        assert_eq!(classify("data: [done]"), FrameKind::Data("[done]"));
    }

    #[test]
    fn test_parse_content() {
        assert_eq!(
            parse_content("{\"content\":\"Hello\"}").unwrap(),
            Some("Hello".to_string())
        );
        assert_eq!(parse_content("{\"other\":1}").unwrap(), None);
        assert_eq!(parse_content("{\"content\":5}").unwrap(), None);
        assert_eq!(parse_content("[1,2]").unwrap(), None);
        assert!(parse_content("{\"content\":").is_err());
    }

    #[test]
    fn test_encode_content_escapes() {
        let frame = encode_content("say \"hi\"\n");
        assert_eq!(frame, "data: {\"content\":\"say \\\"hi\\\"\\n\"}\n\n");

        let line = frame.lines().next().unwrap();
        let FrameKind::Data(payload) = classify(line) else {
            panic!("expected data frame");
        };
        assert_eq!(parse_content(payload).unwrap().unwrap(), "say \"hi\"\n");
    }
}
