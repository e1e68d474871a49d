//! Scripted Responder
//!
//! Built-in producer that needs no network. It picks one of four canned
//! replies by keyword and streams it one word per frame with a short pause
//! between words.
//!
//! # Keyword selection
//!
//! The newest message is lower-cased and checked in order:
//! 1. `business` or `strategy`
//! 2. `technical`, `code` or `react`
//! 3. `ai` or `alpha`
//! 4. anything else
//!
//! Matching is plain substring search, so "explain" selects the third reply.

use std::time::Duration;

use async_trait::async_trait;

use super::traits::{ChatRequest, EventProducer};
use crate::config::{ChatConfig, DEFAULT_WORD_DELAY};
use crate::streaming::wire::{encode_content, DONE_FRAME};
use crate::transport::{ByteStream, ChunkPlan, ChunkedTransport, TransportError};

const BUSINESS_REPLY: &str = "Great question about business strategy! Here are some key insights:

1. **Market Analysis**: Understanding your target market is crucial for success
2. **Competitive Advantage**: Identify what makes your solution unique
3. **Scalability**: Plan for growth from day one
4. **Customer Feedback**: Continuously gather and implement user feedback
5. **Financial Planning**: Maintain healthy cash flow and plan for investments

Would you like me to dive deeper into any of these areas?";

const TECHNICAL_REPLY: &str = "I'd be happy to help with technical questions! Here's some guidance:

**React Best Practices:**
- Use functional components with hooks
- Implement proper state management
- Optimize performance with useMemo and useCallback
- Follow component composition patterns
- Write clean, readable code with TypeScript

**Development Tips:**
- Use version control effectively
- Write comprehensive tests
- Follow coding standards
- Document your code
- Stay updated with latest technologies

What specific technical challenge are you facing?";

const ALPHA_REPLY: &str = "Welcome to Alpha AI Bot! I'm here to assist you with:

🚀 **Business Strategy & Planning**
🔧 **Technical Development & Coding**
📊 **Data Analysis & Insights**
💡 **Creative Problem Solving**
🎯 **Project Management**

I use advanced neural networks to provide intelligent, context-aware responses. Feel free to ask me anything - from complex business questions to technical challenges!

How can I help you today?";

const GENERAL_REPLY: &str = "Hello! I'm Alpha AI Bot, your advanced neural assistant. I can help you with:

• Business strategy and growth planning
• Technical development and coding
• Creative problem solving
• Data analysis and insights
• Project management advice

I'm designed to provide intelligent, contextual responses using advanced AI capabilities. What would you like to explore today?";

/// Which canned reply answers a prompt
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReplyTopic {
    /// Business and strategy advice
    Business,
    /// Technical and coding guidance
    Technical,
    /// Introduction of the assistant itself
    Alpha,
    /// Generic greeting
    General,
}

impl ReplyTopic {
    /// Select the topic for a prompt
    #[must_use]
    pub fn for_prompt(prompt: &str) -> Self {
        let prompt = prompt.to_lowercase();
        let mentions = |words: &[&str]| words.iter().any(|w| prompt.contains(w));

        if mentions(&["business", "strategy"]) {
            Self::Business
        } else if mentions(&["technical", "code", "react"]) {
            Self::Technical
        } else if mentions(&["ai", "alpha"]) {
            Self::Alpha
        } else {
            Self::General
        }
    }

    /// The full reply text
    #[must_use]
    pub fn reply(self) -> &'static str {
        match self {
            Self::Business => BUSINESS_REPLY,
            Self::Technical => TECHNICAL_REPLY,
            Self::Alpha => ALPHA_REPLY,
            Self::General => GENERAL_REPLY,
        }
    }
}

/// Keyword-matching producer with word-by-word pacing
#[derive(Clone, Debug)]
pub struct ScriptedResponder {
    word_delay: Duration,
}

impl Default for ScriptedResponder {
    fn default() -> Self {
        Self::new(DEFAULT_WORD_DELAY)
    }
}

impl ScriptedResponder {
    /// Create a responder pausing `word_delay` between words
    #[must_use]
    pub fn new(word_delay: Duration) -> Self {
        Self { word_delay }
    }

    /// Create from resolved configuration
    #[must_use]
    pub fn from_config(config: &ChatConfig) -> Self {
        Self::new(config.word_delay)
    }

    /// Pause between words
    #[must_use]
    pub fn word_delay(&self) -> Duration {
        self.word_delay
    }

    /// Build the paced transport that replies on `topic`
    ///
    /// Every word (split on single spaces, newlines kept inside words) is
    /// sent as its own chunk with a trailing space, followed by the
    /// termination frame.
    #[must_use]
    pub fn script(&self, topic: ReplyTopic) -> ChunkedTransport {
        let reply = topic.reply();

        let mut payload = String::new();
        let mut sizes = Vec::new();
        for word in reply.split(' ') {
            let frame = encode_content(&format!("{word} "));
            sizes.push(frame.len());
            payload.push_str(&frame);
        }
        payload.push_str(DONE_FRAME);

        ChunkedTransport::new(payload)
            .with_plan(ChunkPlan::Sizes(sizes))
            .with_delay(self.word_delay)
    }
}

#[async_trait]
impl EventProducer for ScriptedResponder {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn open_stream(&self, request: &ChatRequest) -> Result<ByteStream, TransportError> {
        let topic = ReplyTopic::for_prompt(request.last_content());
        tracing::debug!(?topic, delay_ms = self.word_delay.as_millis(), "scripting reply");
        Ok(self.script(topic).into_stream())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::MessageRole;
    use futures::StreamExt;
    use pretty_assertions::assert_eq;

    fn ask(prompt: &str) -> ChatRequest {
        ChatRequest::new().with_message(MessageRole::User, prompt)
    }

    #[test]
    fn test_topic_selection() {
        assert_eq!(ReplyTopic::for_prompt("Help with my STRATEGY"), ReplyTopic::Business);
        assert_eq!(ReplyTopic::for_prompt("react hooks?"), ReplyTopic::Technical);
        assert_eq!(ReplyTopic::for_prompt("who is Alpha"), ReplyTopic::Alpha);
        assert_eq!(ReplyTopic::for_prompt("hello there"), ReplyTopic::General);
        assert_eq!(ReplyTopic::for_prompt(""), ReplyTopic::General);
    }

    #[test]
    fn test_topic_priority_and_substring_match() {
        // Business wins over technical
        assert_eq!(ReplyTopic::for_prompt("business code"), ReplyTopic::Business);
        // "explain" contains "ai"
        assert_eq!(ReplyTopic::for_prompt("explain it"), ReplyTopic::Alpha);
    }

    #[tokio::test]
    async fn test_only_last_message_counts() {
        let request = ChatRequest::new()
            .with_message(MessageRole::User, "business")
            .with_message(MessageRole::Assistant, "...")
            .with_message(MessageRole::User, "hello");
        let stream = ScriptedResponder::new(Duration::ZERO)
            .open_stream(&request)
            .await
            .unwrap();
        let chunks: Vec<_> = stream.map(Result::unwrap).collect().await;
        let first = String::from_utf8_lossy(&chunks[0]).into_owned();
        assert_eq!(first, "data: {\"content\":\"Hello! \"}\n\n");
    }

    #[tokio::test]
    async fn test_open_stream_matches_script_for_topic() {
        let responder = ScriptedResponder::new(Duration::ZERO);
        let stream = responder.open_stream(&ask("Tell me about React")).await.unwrap();
        let streamed: Vec<_> = stream.map(Result::unwrap).collect().await;

        assert_eq!(streamed, responder.script(ReplyTopic::Technical).chunks());
    }

    #[test]
    fn test_script_emits_one_frame_per_word() {
        let transport = ScriptedResponder::new(Duration::ZERO).script(ReplyTopic::for_prompt("hi"));
        let chunks: Vec<String> = transport
            .chunks()
            .iter()
            .map(|c| String::from_utf8_lossy(c).into_owned())
            .collect();

        let words = GENERAL_REPLY.split(' ').count();
        assert_eq!(chunks.len(), words + 1);
        assert_eq!(chunks.last().map(String::as_str), Some(DONE_FRAME));
        assert!(chunks[..words]
            .iter()
            .all(|c| c.starts_with("data: {\"content\":") && c.ends_with("\"}\n\n")));
    }

    #[test]
    fn test_script_keeps_newlines_inside_words() {
        let transport = ScriptedResponder::new(Duration::ZERO).script(ReplyTopic::Business);
        let second = String::from_utf8_lossy(&transport.chunks()[1]).into_owned();
        assert_eq!(second, "data: {\"content\":\"question \"}\n\n");

        let payload: String = transport
            .chunks()
            .iter()
            .map(|c| String::from_utf8_lossy(c).into_owned())
            .collect();
        assert!(payload.contains("insights:\\n\\n1. "));
    }

    #[test]
    fn test_default_delay() {
        assert_eq!(
            ScriptedResponder::default().word_delay(),
            Duration::from_millis(50)
        );
        let mut config = ChatConfig::default();
        config.word_delay = Duration::from_millis(7);
        assert_eq!(
            ScriptedResponder::from_config(&config).word_delay(),
            Duration::from_millis(7)
        );
    }
}
