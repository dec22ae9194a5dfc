//! Upstream LLM client.
//!
//! The chat endpoint answers each message with a single, non-streaming call
//! to an OpenAI-compatible Chat Completions API. The [`LlmDriver`] trait is
//! the seam the server depends on; [`ChatCompletionsDriver`] is the HTTP
//! implementation.
//!
//! # Example
//!
//! ```rust,ignore
//! use olive_chat::llm::{ChatCompletionsDriver, LlmDriver, LlmRequest, Message};
//!
//! let driver = ChatCompletionsDriver::new(settings)?;
//! let reply = driver
//!     .complete(LlmRequest::new(vec![
//!         Message::system("You are Olive."),
//!         Message::user("My fern is turning brown"),
//!     ]))
//!     .await?;
//! ```

pub mod chat_completions;
pub mod provider;

pub use chat_completions::ChatCompletionsDriver;
pub use provider::Provider;

use std::time::Duration;

use thiserror::Error;

use crate::config::LlmConfig;
use provider::DEFAULT_AZURE_API_VERSION;

/// LLM connection and model settings.
#[derive(Clone)]
pub struct LlmSettings {
    /// Base URL for the LLM API (e.g., `https://openrouter.ai/api`).
    pub base_url: String,
    /// Optional API key for authentication.
    pub api_key: Option<String>,
    /// Model identifier (e.g., `mistralai/mistral-7b-instruct`).
    pub model: String,
    /// Provider type (detected from `base_url`).
    pub provider: Provider,
    /// Upper bound on a single upstream call.
    pub timeout: Option<Duration>,
}

impl std::fmt::Debug for LlmSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmSettings")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("provider", &self.provider)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl LlmSettings {
    /// Build settings from the `llm` config section.
    #[must_use]
    pub fn from_config(cfg: &LlmConfig) -> Self {
        let mut provider = Provider::detect_from_url(&cfg.base_url);

        if matches!(provider, Provider::AzureOpenAI { .. }) {
            if let Some(deployment) = &cfg.deployment_name {
                provider = Provider::AzureOpenAI {
                    deployment_name: deployment.clone(),
                    api_version: cfg
                        .api_version
                        .clone()
                        .unwrap_or_else(|| DEFAULT_AZURE_API_VERSION.to_string()),
                };
            }
        }

        Self {
            base_url: cfg.base_url.clone(),
            api_key: cfg.api_key.clone().filter(|k| !k.trim().is_empty()),
            model: cfg.model.clone(),
            provider,
            timeout: None,
        }
    }

    /// Set the per-call timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Role of a message author.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// System prompt.
    System,
    /// User message.
    User,
    /// Assistant response.
    Assistant,
}

/// A message in a conversation.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Message {
    /// Role of the message author.
    pub role: MessageRole,
    /// Text content.
    pub content: String,
}

impl Message {
    /// Create a system prompt message.
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    /// Create a user message.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }
}

/// Request to an LLM driver.
#[derive(Debug, Clone)]
pub struct LlmRequest {
    /// Conversation messages, oldest first.
    pub messages: Vec<Message>,
}

impl LlmRequest {
    /// Create a request from a list of messages.
    #[must_use]
    pub fn new(messages: Vec<Message>) -> Self {
        Self { messages }
    }
}

/// Errors from an upstream LLM call.
#[derive(Error, Debug)]
pub enum LlmError {
    /// The request failed before a response arrived, or the body was unreadable.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The upstream service answered with a non-success status.
    #[error("upstream returned {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, for diagnostics.
        body: String,
    },

    /// The response did not contain a completion.
    #[error("malformed completion: {0}")]
    MalformedResponse(String),
}

/// Trait for LLM completion drivers.
#[async_trait::async_trait]
pub trait LlmDriver: Send + Sync {
    /// Produce the assistant reply for `req`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the service answers with a
    /// non-success status, or the body carries no completion.
    async fn complete(&self, req: LlmRequest) -> Result<String, LlmError>;
}
