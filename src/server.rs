use axum::{
    Json, Router,
    body::Bytes,
    extract::{DefaultBodyLimit, Request, State},
    http::StatusCode,
    middleware::Next,
    response::IntoResponse,
    routing::post,
};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tower_http::trace::TraceLayer;
use tracing::info;
use uuid::Uuid;

use crate::AppState;
use crate::config::AppConfig;
use crate::llm::{ChatCompletionsDriver, LlmDriver, LlmError, LlmRequest, LlmSettings, Message};
use crate::rate_limit::{SimpleRateLimiter, rate_limit_middleware};
use crate::wire::{CHAT_PATH, ChatReply};

/// Chat messages are short; anything larger is rejected before parsing.
const MAX_BODY_BYTES: usize = 64 * 1024;

impl AppState {
    /// Assemble handler state around an LLM driver.
    #[must_use]
    pub fn new(config: Arc<AppConfig>, llm: Arc<dyn LlmDriver>) -> Self {
        let rate_limiter = Arc::new(SimpleRateLimiter::new(
            config.resilience.requests_per_second,
            config.resilience.burst_size,
        ));

        Self {
            llm,
            system_prompt: Arc::from(config.llm.system_prompt.as_str()),
            rate_limiter,
            config,
        }
    }
}

/// Build the application router.
pub fn build_router(state: AppState) -> Router {
    let timeout = Duration::from_secs(state.config.server.request_timeout_secs);

    Router::new()
        .route(CHAT_PATH, post(chat).fallback(method_not_allowed))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(axum::middleware::from_fn(
            move |req: Request, next: Next| async move {
                match tokio::time::timeout(timeout, next.run(req)).await {
                    Ok(res) => res,
                    Err(_) => (
                        StatusCode::REQUEST_TIMEOUT,
                        Json(ChatReply::failure("Request timed out")),
                    )
                        .into_response(),
                }
            },
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the Axum server with the provided configuration.
pub async fn start_server(config: Arc<AppConfig>) -> anyhow::Result<()> {
    let settings = LlmSettings::from_config(&config.llm)
        .with_timeout(Duration::from_secs(config.server.request_timeout_secs));

    info!(
        name: "llm.config.loaded",
        base_url = %settings.base_url,
        model = %settings.model,
        provider = ?settings.provider,
        "LLM configuration loaded"
    );
    if settings.api_key.is_none() {
        tracing::warn!(name: "llm.config.no_api_key", "No LLM API key configured; upstream calls are unauthenticated");
    }

    let driver: Arc<dyn LlmDriver> = Arc::new(ChatCompletionsDriver::new(settings)?);
    let app = build_router(AppState::new(Arc::clone(&config), driver));

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!(
        name: "server.started",
        address = %addr,
        "Server started"
    );

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!(name: "server.stopped", "Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// API Handlers
// ─────────────────────────────────────────────────────────────────────────────

type ChatResult = (StatusCode, Json<ChatReply>);

fn reply_error(status: StatusCode, error: impl Into<String>) -> ChatResult {
    (status, Json(ChatReply::failure(error)))
}

/// POST /chat/ - Answer one message as the assistant persona.
async fn chat(State(state): State<AppState>, body: Bytes) -> ChatResult {
    let request_id = Uuid::new_v4();

    let payload: Value = match serde_json::from_slice(&body) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!(%request_id, error = %e, "Rejected chat request with invalid JSON");
            return reply_error(StatusCode::BAD_REQUEST, "Invalid JSON");
        }
    };

    let Some(message) = payload
        .get("message")
        .and_then(Value::as_str)
        .filter(|m| !m.is_empty())
    else {
        tracing::warn!(%request_id, "Rejected chat request without a message");
        return reply_error(StatusCode::BAD_REQUEST, "Message field is required");
    };

    tracing::info!(
        name: "chat.request",
        %request_id,
        message_length = message.len(),
        "Received chat request"
    );

    let req = LlmRequest::new(vec![
        Message::system(state.system_prompt.as_ref()),
        Message::user(message),
    ]);

    match state.llm.complete(req).await {
        Ok(response) => {
            tracing::info!(
                name: "chat.response",
                %request_id,
                response_length = response.len(),
                "Chat request answered"
            );
            (StatusCode::OK, Json(ChatReply::success(response)))
        }
        Err(LlmError::Status { status, body }) => {
            tracing::error!(%request_id, status, body = %body, "Upstream model returned an error status");
            let status = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
            reply_error(status, "Failed to get response from AI service")
        }
        Err(e) => {
            tracing::error!(%request_id, error = %e, "Chat request failed");
            reply_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

/// Any other method on /chat/.
async fn method_not_allowed() -> ChatResult {
    reply_error(
        StatusCode::METHOD_NOT_ALLOWED,
        "Only POST requests are allowed",
    )
}
