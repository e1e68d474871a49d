//! Event Producers
//!
//! Anything that answers a chat turn with a framed byte stream, behind the
//! [`EventProducer`] trait.
//!
//! # Available Producers
//!
//! - **Scripted**: keyword-matching canned replies, paced word by word (default)
//! - **Http**: pass-through to a hosted streaming endpoint
//!
//! # Usage
//!
//! ```ignore
//! use alpha_chat_core::backend::{producer_from_config, ChatRequest};
//! use alpha_chat_core::config::load_config;
//!
//! let producer = producer_from_config(&load_config()?)?;
//! let stream = producer.open_stream(&ChatRequest::new()).await?;
//! ```

mod http;
mod scripted;
mod traits;

use std::sync::Arc;

pub use http::HttpProducer;
pub use scripted::{ReplyTopic, ScriptedResponder};
pub use traits::{ChatRequest, EventProducer, TurnMessage};

use crate::config::{ChatConfig, ProducerKind};
use crate::transport::TransportError;

/// Build the producer selected by the configuration
///
/// # Errors
///
/// Returns [`TransportError::Request`] if the http producer cannot be built.
pub fn producer_from_config(config: &ChatConfig) -> Result<Arc<dyn EventProducer>, TransportError> {
    let producer: Arc<dyn EventProducer> = match config.producer {
        ProducerKind::Scripted => Arc::new(ScriptedResponder::from_config(config)),
        ProducerKind::Http => Arc::new(HttpProducer::from_config(config)?),
    };
    tracing::info!(producer = producer.name(), source = %config.source(), "event producer ready");
    Ok(producer)
}
