//! Olive chat widget
//!
//! A toggleable chat panel that sends user text to a `/chat/` endpoint and
//! renders the reply, together with the endpoint itself.
//!
//! # Architecture
//!
//! - **Widget**: UI-agnostic controller with injected panel, log, input and
//!   backend capabilities
//! - **Server**: Axum `/chat/` endpoint answering as the Olive persona
//! - **LLM**: Non-streaming OpenAI-compatible Chat Completions client
//! - **Console**: Terminal frontend driving the widget controller
//!
//! # Modules
//!
//! - [`widget`]: Chat widget controller and HTTP backend
//! - [`wire`]: JSON contract shared by widget and server
//! - [`server`]: Router and handlers
//! - [`llm`]: Upstream LLM driver
//! - [`config`]: Layered configuration
//! - [`console`]: Terminal frontend

// Allow pedantic clippy warnings that don't add value for this codebase
#![allow(clippy::missing_fields_in_debug)]

pub mod config;
pub mod console;
pub mod llm;
pub mod rate_limit;
pub mod server;
pub mod telemetry;
pub mod widget;
pub mod wire;

use crate::config::AppConfig;
use crate::rate_limit::SimpleRateLimiter;

use llm::LlmDriver;
use std::sync::Arc;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Upstream model.
    pub llm: Arc<dyn LlmDriver>,
    /// Persona prepended to every conversation.
    pub system_prompt: Arc<str>,
    /// Global Rate Limiter
    pub rate_limiter: Arc<SimpleRateLimiter>,
    /// Global Configuration
    pub config: Arc<AppConfig>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("system_prompt", &self.system_prompt)
            .field("rate_limiter", &self.rate_limiter)
            .finish_non_exhaustive()
    }
}
