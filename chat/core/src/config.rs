//! TOML Configuration File Support
//!
//! Centralized configuration loading for the chat client, with a TOML file at
//! `~/.config/alpha-chat/config.toml`.
//!
//! # Configuration Priority
//!
//! Values are resolved with the following priority (highest first):
//! 1. CLI arguments ([`ConfigOverrides`])
//! 2. Environment variables (`ALPHA_CHAT_*`)
//! 3. TOML configuration file
//! 4. Default values
//!
//! # Example Configuration
//!
//! ```toml
//! [producer]
//! kind = "http"
//! endpoint = "http://localhost:3000/api/chat"
//! api_key = "sk-..."
//! request_timeout_secs = 30
//!
//! [scripted]
//! word_delay_ms = 50
//!
//! [chat]
//! fallback_message = "Sorry, I encountered an error. Please try again."
//! ```

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Reply shown in place of a failed assistant message
pub const DEFAULT_FALLBACK_MESSAGE: &str = "Sorry, I encountered an error. Please try again.";

/// Pause between words of a scripted reply
pub const DEFAULT_WORD_DELAY: Duration = Duration::from_millis(50);

/// Overall timeout for one streamed HTTP reply
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const ENV_PRODUCER: &str = "ALPHA_CHAT_PRODUCER";
const ENV_ENDPOINT: &str = "ALPHA_CHAT_ENDPOINT";
const ENV_API_KEY: &str = "ALPHA_CHAT_API_KEY";
const ENV_WORD_DELAY_MS: &str = "ALPHA_CHAT_WORD_DELAY_MS";
const ENV_TIMEOUT_SECS: &str = "ALPHA_CHAT_TIMEOUT_SECS";
const ENV_FALLBACK: &str = "ALPHA_CHAT_FALLBACK";

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur when loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file at {path}: {source}")]
    ReadError {
        /// The path that was attempted
        path: PathBuf,
        /// The underlying IO error
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("Failed to parse TOML config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

// =============================================================================
// Configuration Source Tracking
// =============================================================================

/// Tracks where a configuration value came from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Value from command-line argument
    Cli,
    /// Value from environment variable
    Env,
    /// Value from TOML configuration file
    File,
    /// Default value
    Default,
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cli => write!(f, "CLI"),
            Self::Env => write!(f, "environment"),
            Self::File => write!(f, "config file"),
            Self::Default => write!(f, "default"),
        }
    }
}

// =============================================================================
// Producer Selection
// =============================================================================

/// Which event producer answers chat turns
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProducerKind {
    /// Built-in keyword-matching responder
    #[default]
    Scripted,
    /// Hosted streaming endpoint
    Http,
}

impl fmt::Display for ProducerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scripted => write!(f, "scripted"),
            Self::Http => write!(f, "http"),
        }
    }
}

impl FromStr for ProducerKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "scripted" => Ok(Self::Scripted),
            "http" => Ok(Self::Http),
            other => Err(ConfigError::ValidationError(format!(
                "unknown producer kind '{other}' (expected 'scripted' or 'http')"
            ))),
        }
    }
}

// =============================================================================
// TOML Configuration Structures
// =============================================================================

/// Producer section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProducerToml {
    /// Producer kind
    pub kind: Option<ProducerKind>,

    /// Chat endpoint URL (http producer)
    pub endpoint: Option<String>,

    /// Bearer token sent to the endpoint
    pub api_key: Option<String>,

    /// Overall request timeout in seconds
    pub request_timeout_secs: Option<u64>,
}

/// Scripted responder section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptedToml {
    /// Delay between words in milliseconds
    pub word_delay_ms: Option<u64>,
}

/// Chat section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatToml {
    /// Reply shown when a stream fails
    pub fallback_message: Option<String>,
}

/// Top-level TOML configuration structure
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfigToml {
    /// Producer configuration section
    pub producer: ProducerToml,

    /// Scripted responder configuration section
    pub scripted: ScriptedToml,

    /// Chat configuration section
    pub chat: ChatToml,
}

// =============================================================================
// Main Configuration Struct
// =============================================================================

/// Resolved client configuration
///
/// Use [`load_config`] to load with proper priority handling, then
/// [`ConfigOverrides::apply`] and [`ChatConfig::validate`].
#[derive(Clone, Debug)]
pub struct ChatConfig {
    /// Which producer answers turns
    pub producer: ProducerKind,

    /// Chat endpoint URL
    pub endpoint: Option<String>,

    /// Bearer token for the endpoint
    pub api_key: Option<String>,

    /// Overall timeout for one HTTP reply
    pub request_timeout: Duration,

    /// Pause between scripted words
    pub word_delay: Duration,

    /// Reply substituted for a failed assistant message
    pub fallback_message: String,

    /// Path to the config file that was loaded (if any)
    pub config_file_path: Option<PathBuf>,

    source: ConfigSource,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            producer: ProducerKind::Scripted,
            endpoint: None,
            api_key: None,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            word_delay: DEFAULT_WORD_DELAY,
            fallback_message: DEFAULT_FALLBACK_MESSAGE.to_string(),
            config_file_path: None,
            source: ConfigSource::Default,
        }
    }
}

impl ChatConfig {
    /// Create a new configuration with default values
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the highest-priority source applied to this configuration
    #[must_use]
    pub fn source(&self) -> ConfigSource {
        self.source
    }

    /// Set the configuration source
    pub fn set_source(&mut self, source: ConfigSource) {
        self.source = source;
    }

    /// Check cross-field constraints
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] when the http producer has no
    /// endpoint, or the timeout is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let has_endpoint = matches!(self.endpoint.as_deref(), Some(e) if !e.trim().is_empty());
        if self.producer == ProducerKind::Http && !has_endpoint {
            return Err(ConfigError::ValidationError(
                "producer 'http' requires an endpoint".to_string(),
            ));
        }
        if self.request_timeout.is_zero() {
            return Err(ConfigError::ValidationError(
                "request timeout must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

// =============================================================================
// Configuration Loading
// =============================================================================

/// Get the default configuration file path
///
/// Returns `$XDG_CONFIG_HOME/alpha-chat/config.toml` or
/// `~/.config/alpha-chat/config.toml` if `XDG_CONFIG_HOME` is not set.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("alpha-chat").join("config.toml"))
}

/// Load configuration from the default path and the process environment
///
/// # Errors
///
/// Returns an error if the config file exists but cannot be read or parsed.
/// A missing config file is not an error (defaults are used).
pub fn load_config() -> Result<ChatConfig, ConfigError> {
    load_config_from_path(default_config_path())
}

/// Load configuration from a specific path and the process environment
///
/// # Errors
///
/// Returns an error if the specified config file cannot be read or parsed,
/// or an environment variable holds an invalid value.
pub fn load_config_from_path(path: Option<PathBuf>) -> Result<ChatConfig, ConfigError> {
    load_config_with_env(path, |key| std::env::var(key).ok())
}

/// Load configuration, reading environment variables through `env`
///
/// # Errors
///
/// Same as [`load_config_from_path`].
pub fn load_config_with_env<F>(path: Option<PathBuf>, env: F) -> Result<ChatConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = ChatConfig::default();

    if let Some(ref config_path) = path {
        if config_path.exists() {
            let toml_content =
                std::fs::read_to_string(config_path).map_err(|e| ConfigError::ReadError {
                    path: config_path.clone(),
                    source: e,
                })?;

            let toml_config: ChatConfigToml = toml::from_str(&toml_content)?;
            apply_toml_config(&mut config, &toml_config);
            config.config_file_path = Some(config_path.clone());
            config.source = ConfigSource::File;

            tracing::info!(
                path = %config_path.display(),
                "Loaded configuration from file"
            );
        } else {
            tracing::debug!(
                path = %config_path.display(),
                "Config file not found, using defaults"
            );
        }
    }

    apply_env_config(&mut config, env)?;

    Ok(config)
}

fn apply_toml_config(config: &mut ChatConfig, toml: &ChatConfigToml) {
    if let Some(kind) = toml.producer.kind {
        config.producer = kind;
    }
    if toml.producer.endpoint.is_some() {
        config.endpoint = toml.producer.endpoint.clone();
    }
    if toml.producer.api_key.is_some() {
        config.api_key = toml.producer.api_key.clone();
    }
    if let Some(secs) = toml.producer.request_timeout_secs {
        config.request_timeout = Duration::from_secs(secs);
    }
    if let Some(ms) = toml.scripted.word_delay_ms {
        config.word_delay = Duration::from_millis(ms);
    }
    if let Some(ref message) = toml.chat.fallback_message {
        config.fallback_message = message.clone();
    }
}

fn apply_env_config<F>(config: &mut ChatConfig, env: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(kind) = env(ENV_PRODUCER) {
        config.producer = kind.parse()?;
        config.source = ConfigSource::Env;
    }
    if let Some(endpoint) = env(ENV_ENDPOINT) {
        config.endpoint = Some(endpoint);
        config.source = ConfigSource::Env;
    }
    if let Some(key) = env(ENV_API_KEY) {
        config.api_key = Some(key);
        config.source = ConfigSource::Env;
    }
    if let Some(delay) = env(ENV_WORD_DELAY_MS) {
        config.word_delay = Duration::from_millis(parse_env_number(ENV_WORD_DELAY_MS, &delay)?);
        config.source = ConfigSource::Env;
    }
    if let Some(timeout) = env(ENV_TIMEOUT_SECS) {
        config.request_timeout = Duration::from_secs(parse_env_number(ENV_TIMEOUT_SECS, &timeout)?);
        config.source = ConfigSource::Env;
    }
    if let Some(message) = env(ENV_FALLBACK) {
        config.fallback_message = message;
        config.source = ConfigSource::Env;
    }
    Ok(())
}

fn parse_env_number(var: &str, value: &str) -> Result<u64, ConfigError> {
    value.trim().parse().map_err(|_| {
        ConfigError::ValidationError(format!("{var} must be a whole number, got '{value}'"))
    })
}

// =============================================================================
// CLI Override Support
// =============================================================================

/// Builder for applying CLI overrides to configuration
///
/// Use this after [`load_config`] to apply command-line argument overrides.
#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    /// Producer kind override
    pub producer: Option<ProducerKind>,

    /// Endpoint override
    pub endpoint: Option<String>,

    /// Word delay override (milliseconds)
    pub word_delay_ms: Option<u64>,
}

impl ConfigOverrides {
    /// Create a new empty set of overrides
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set producer override
    #[must_use]
    pub fn with_producer(mut self, producer: ProducerKind) -> Self {
        self.producer = Some(producer);
        self
    }

    /// Set endpoint override
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set word delay override
    #[must_use]
    pub fn with_word_delay_ms(mut self, ms: u64) -> Self {
        self.word_delay_ms = Some(ms);
        self
    }

    /// Check if any override is set
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.producer.is_none() && self.endpoint.is_none() && self.word_delay_ms.is_none()
    }

    /// Apply overrides to a configuration
    pub fn apply(&self, config: &mut ChatConfig) {
        if !self.is_empty() {
            config.source = ConfigSource::Cli;
        }
        if let Some(producer) = self.producer {
            config.producer = producer;
        }
        if let Some(ref endpoint) = self.endpoint {
            config.endpoint = Some(endpoint.clone());
        }
        if let Some(ms) = self.word_delay_ms {
            config.word_delay = Duration::from_millis(ms);
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
