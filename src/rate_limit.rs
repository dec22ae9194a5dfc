use crate::AppState;
use crate::wire::ChatReply;
use axum::{
    Json,
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::{Mutex, PoisonError};
use std::time::Instant;

/// Global token bucket.
///
/// Not keyed by client address: the chat endpoint shares one bucket, which
/// bounds how fast the upstream model (and its bill) can be driven.
#[derive(Debug)]
pub struct SimpleRateLimiter {
    // (last_update, tokens)
    state: Mutex<(Instant, f32)>,
    rate_per_sec: f32,
    burst_size: f32,
}

impl SimpleRateLimiter {
    pub fn new(rate_per_sec: f32, burst_size: f32) -> Self {
        Self {
            state: Mutex::new((Instant::now(), burst_size)),
            rate_per_sec,
            burst_size,
        }
    }

    /// Take one token. Returns `false` when the bucket is empty.
    pub fn check(&self) -> bool {
        let mut guard = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let (last_update, tokens) = *guard;
        let now = Instant::now();
        let elapsed = now.duration_since(last_update).as_secs_f32();

        let new_tokens = (tokens + elapsed * self.rate_per_sec).min(self.burst_size);

        if new_tokens >= 1.0 {
            *guard = (now, new_tokens - 1.0);
            true
        } else {
            *guard = (now, new_tokens);
            false
        }
    }
}

/// Middleware to enforce rate limits
pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    if state.config.resilience.rate_limit_enabled && !state.rate_limiter.check() {
        tracing::warn!(name: "chat.rate_limited", path = %req.uri().path(), "Rate limit exceeded");
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Json(ChatReply::failure("Too many requests")),
        )
            .into_response();
    }
    next.run(req).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_simple_rate_limiter() {
        let limiter = SimpleRateLimiter::new(2.0, 5.0); // 2 req/s, 5 burst

        // Consume all burst
        for _ in 0..5 {
            assert!(limiter.check());
        }

        // Next should fail (immediate)
        assert!(!limiter.check());

        // Wait for 0.6s -> +1.2 tokens -> check consumes 1 -> 0.2 left
        std::thread::sleep(Duration::from_millis(600));
        assert!(limiter.check());

        // Immediate fail
        assert!(!limiter.check());
    }

    #[test]
    fn test_bucket_never_exceeds_burst() {
        let limiter = SimpleRateLimiter::new(100.0, 2.0);
        std::thread::sleep(Duration::from_millis(100));

        assert!(limiter.check());
        assert!(limiter.check());
        assert!(!limiter.check());
    }
}
