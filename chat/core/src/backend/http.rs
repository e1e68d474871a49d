//! HTTP Producer
//!
//! Pass-through to a hosted chat endpoint that already speaks the wire
//! format. The request body is the [`ChatRequest`] JSON; the response body is
//! handed to the read loop untouched, chunk for chunk.

use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;

use super::traits::{ChatRequest, EventProducer};
use crate::config::ChatConfig;
use crate::transport::{ByteStream, TransportError};

/// Producer backed by a streaming HTTP endpoint
#[derive(Clone, Debug)]
pub struct HttpProducer {
    /// Chat endpoint URL
    endpoint: String,
    /// Bearer token, if the endpoint needs one
    api_key: Option<String>,
    /// HTTP client
    http_client: reqwest::Client,
}

impl HttpProducer {
    /// Create a producer for `endpoint` with an overall request timeout
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Request`] if the HTTP client cannot be built.
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, TransportError> {
        let http_client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            endpoint: endpoint.into(),
            api_key: None,
            http_client,
        })
    }

    /// Create from resolved configuration
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Request`] if no endpoint is configured or the
    /// HTTP client cannot be built.
    pub fn from_config(config: &ChatConfig) -> Result<Self, TransportError> {
        let endpoint = config
            .endpoint
            .clone()
            .ok_or_else(|| TransportError::Request("no endpoint configured".to_string()))?;
        let producer = Self::new(endpoint, config.request_timeout)?;
        Ok(match &config.api_key {
            Some(key) => producer.with_api_key(key.clone()),
            None => producer,
        })
    }

    /// Send a bearer token with every request
    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// The endpoint URL
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl EventProducer for HttpProducer {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn open_stream(&self, request: &ChatRequest) -> Result<ByteStream, TransportError> {
        let mut builder = self.http_client.post(&self.endpoint).json(request);
        if let Some(ref key) = self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await?;

        // Check for HTTP errors
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(endpoint = %self.endpoint, %status, "chat endpoint rejected request");
            return Err(TransportError::Status {
                status: status.as_u16(),
                body,
            });
        }

        tracing::debug!(endpoint = %self.endpoint, %status, "reply stream opened");

        let stream = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(|e| TransportError::Read(e.to_string())));
        Ok(Box::pin(stream))
    }
}
