//! Rate limiting middleware
//!
//! Fixed-window request counting per client address.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tokio::sync::RwLock;
use tracing::warn;

use famli_core::RateLimitSettings;

use crate::error::ApiError;

const FORWARDED_FOR_HEADER: &str = "x-forwarded-for";
const UNKNOWN_CLIENT: &str = "unknown";

/// Rate limiter configuration
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Maximum requests per window
    pub max_requests: u32,
    /// Time window for rate limiting
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self::from(&RateLimitSettings::default())
    }
}

impl From<&RateLimitSettings> for RateLimitConfig {
    fn from(settings: &RateLimitSettings) -> Self {
        Self {
            max_requests: settings.max_requests,
            window: Duration::from_secs(settings.window_secs.max(1)),
        }
    }
}

#[derive(Debug, Clone)]
struct ClientWindow {
    request_count: u32,
    window_start: Instant,
}

/// In-memory rate limiter
#[derive(Clone)]
pub struct RateLimiter {
    config: RateLimitConfig,
    clients: Arc<RwLock<HashMap<String, ClientWindow>>>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::with_config(RateLimitConfig::default())
    }

    pub fn with_config(config: RateLimitConfig) -> Self {
        Self {
            config,
            clients: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn window(&self) -> Duration {
        self.config.window
    }

    /// Count a request for `client_id`; `false` once the window is used up
    pub async fn check(&self, client_id: &str) -> bool {
        let mut clients = self.clients.write().await;
        let now = Instant::now();

        let window = clients
            .entry(client_id.to_string())
            .or_insert(ClientWindow {
                request_count: 0,
                window_start: now,
            });

        if now.duration_since(window.window_start) >= self.config.window {
            window.request_count = 0;
            window.window_start = now;
        }

        if window.request_count >= self.config.max_requests {
            warn!(client = client_id, "Rate limit exceeded");
            return false;
        }

        window.request_count += 1;
        true
    }

    /// Drop clients whose window has expired
    pub async fn cleanup(&self) {
        let mut clients = self.clients.write().await;
        let now = Instant::now();

        clients.retain(|_, window| now.duration_since(window.window_start) < self.config.window);
    }

    pub async fn tracked_clients(&self) -> usize {
        self.clients.read().await.len()
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

/// First hop of `X-Forwarded-For`, or `"unknown"`
fn client_id(request: &Request) -> String {
    request
        .headers()
        .get(FORWARDED_FOR_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(UNKNOWN_CLIENT)
        .to_string()
}

/// Rate limiting middleware
pub async fn rate_limit_middleware(
    State(limiter): State<Arc<RateLimiter>>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let client = client_id(&request);

    if !limiter.check(&client).await {
        return Err(ApiError::RateLimited);
    }

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    fn limiter(max_requests: u32, window: Duration) -> RateLimiter {
        RateLimiter::with_config(RateLimitConfig {
            max_requests,
            window,
        })
    }

    #[tokio::test]
    async fn test_rate_limiter_allows_within_limit() {
        let limiter = limiter(3, Duration::from_secs(60));

        assert!(limiter.check("client1").await);
        assert!(limiter.check("client1").await);
        assert!(limiter.check("client1").await);
        assert!(!limiter.check("client1").await);
    }

    #[tokio::test]
    async fn test_rate_limiter_different_clients() {
        let limiter = limiter(2, Duration::from_secs(60));

        assert!(limiter.check("client1").await);
        assert!(limiter.check("client1").await);
        assert!(!limiter.check("client1").await);

        assert!(limiter.check("client2").await);
        assert!(limiter.check("client2").await);
    }

    #[tokio::test]
    async fn test_window_resets() {
        let limiter = limiter(1, Duration::from_millis(50));

        assert!(limiter.check("client1").await);
        assert!(!limiter.check("client1").await);

        tokio::time::sleep(Duration::from_millis(80)).await;
        assert!(limiter.check("client1").await);
    }

    #[tokio::test]
    async fn test_cleanup_drops_expired_clients() {
        let limiter = limiter(5, Duration::from_millis(50));
        limiter.check("client1").await;
        limiter.check("client2").await;
        assert_eq!(limiter.tracked_clients().await, 2);

        tokio::time::sleep(Duration::from_millis(80)).await;
        limiter.cleanup().await;
        assert_eq!(limiter.tracked_clients().await, 0);
    }

    #[test]
    fn test_config_from_settings() {
        let config = RateLimitConfig::from(&RateLimitSettings {
            max_requests: 10,
            window_secs: 30,
        });
        assert_eq!(config.max_requests, 10);
        assert_eq!(config.window, Duration::from_secs(30));
    }

    #[test]
    fn test_client_id_uses_first_forwarded_hop() {
        let request = Request::builder()
            .header(FORWARDED_FOR_HEADER, "203.0.113.7, 10.0.0.1")
            .body(Body::empty())
            .unwrap();
        assert_eq!(client_id(&request), "203.0.113.7");

        let request = Request::builder().body(Body::empty()).unwrap();
        assert_eq!(client_id(&request), UNKNOWN_CLIENT);
    }
}
