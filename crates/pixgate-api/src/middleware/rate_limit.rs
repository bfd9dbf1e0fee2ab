//! Fixed-window HTTP rate limiting keyed by client address.
//!
//! Buckets live in process memory. Counts reset when a window expires, and
//! a background task sweeps stale buckets so the map cannot grow without
//! bound.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tokio::sync::Mutex;

/// Hard cap on tracked buckets before the oldest gets evicted.
const MAX_BUCKETS: usize = 10_000;

#[derive(Clone)]
struct RateLimitBucket {
    count: u32,
    reset_at: Instant,
}

impl RateLimitBucket {
    fn new(window_seconds: u64) -> Self {
        Self {
            count: 0,
            reset_at: Instant::now() + Duration::from_secs(window_seconds),
        }
    }

    /// Count a request. Returns whether it is allowed and how many remain
    /// in the current window.
    fn check_and_increment(&mut self, limit: u32, window_seconds: u64) -> (bool, u32) {
        let now = Instant::now();
        if now >= self.reset_at {
            self.count = 0;
            self.reset_at = now + Duration::from_secs(window_seconds);
        }

        if self.count < limit {
            self.count += 1;
            (true, limit - self.count)
        } else {
            (false, 0)
        }
    }

    fn reset_in(&self) -> Duration {
        self.reset_at.saturating_duration_since(Instant::now())
    }
}

/// In-memory fixed-window rate limiter shared across requests.
pub struct HttpRateLimiter {
    buckets: Mutex<HashMap<String, RateLimitBucket>>,
    limit: u32,
    window_seconds: u64,
    max_buckets: usize,
}

impl HttpRateLimiter {
    pub fn new(limit: u32, window_seconds: u64) -> Self {
        Self {
            buckets: Mutex::new(HashMap::new()),
            limit,
            window_seconds,
            max_buckets: MAX_BUCKETS,
        }
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Count a request against `key`. Ok carries the remaining allowance,
    /// Err carries the time until the window resets.
    pub async fn check_rate_limit(&self, key: &str) -> Result<u32, Duration> {
        let mut buckets = self.buckets.lock().await;

        if buckets.len() >= self.max_buckets {
            let now = Instant::now();
            buckets.retain(|_, bucket| bucket.reset_at > now);

            if buckets.len() >= self.max_buckets {
                let oldest_key = buckets
                    .iter()
                    .min_by_key(|(_, bucket)| bucket.reset_at)
                    .map(|(key, _)| key.clone());
                if let Some(oldest_key) = oldest_key {
                    buckets.remove(&oldest_key);
                    tracing::warn!(
                        evicted_key = %oldest_key,
                        "Rate limiter at capacity, evicting oldest bucket"
                    );
                }
            }
        }

        let window_seconds = self.window_seconds;
        let bucket = buckets
            .entry(key.to_string())
            .or_insert_with(|| RateLimitBucket::new(window_seconds));

        let (allowed, remaining) = bucket.check_and_increment(self.limit, self.window_seconds);
        if allowed {
            Ok(remaining)
        } else {
            Err(bucket.reset_in())
        }
    }

    /// Drop buckets whose window expired more than one window ago.
    pub async fn cleanup_expired_buckets(&self) {
        let now = Instant::now();
        let grace_period = Duration::from_secs(self.window_seconds);
        let mut buckets = self.buckets.lock().await;

        let before = buckets.len();
        buckets.retain(|_, bucket| {
            bucket.reset_at > now || now - bucket.reset_at < grace_period
        });
        let cleaned = before - buckets.len();

        if cleaned > 0 {
            tracing::debug!(buckets_cleaned = cleaned, "Cleaned up expired rate limit buckets");
        }
    }
}

/// Client key for bucketing: the first X-Forwarded-For hop when present,
/// otherwise the peer address.
fn client_key(request: &Request) -> String {
    if let Some(forwarded) = request
        .headers()
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
    {
        if let Some(ip) = forwarded.split(',').next().map(str::trim) {
            if !ip.is_empty() {
                return format!("ip:{}", ip);
            }
        }
    }

    match request.extensions().get::<ConnectInfo<SocketAddr>>() {
        Some(info) => format!("ip:{}", info.0.ip()),
        None => "ip:unknown".to_string(),
    }
}

/// Middleware enforcing the per-client request allowance.
pub async fn rate_limit_middleware(
    State(rate_limiter): State<Arc<HttpRateLimiter>>,
    request: Request,
    next: Next,
) -> Response {
    let rate_limit_key = client_key(&request);
    let limit = rate_limiter.limit();

    match rate_limiter.check_rate_limit(&rate_limit_key).await {
        Ok(remaining) => {
            let mut response = next.run(request).await;
            if let Ok(header_value) = HeaderValue::from_str(&limit.to_string()) {
                response.headers_mut().insert("X-RateLimit-Limit", header_value);
            }
            if let Ok(header_value) = HeaderValue::from_str(&remaining.to_string()) {
                response
                    .headers_mut()
                    .insert("X-RateLimit-Remaining", header_value);
            }
            response
        }
        Err(reset_in) => {
            tracing::warn!(key = %rate_limit_key, limit = limit, "Rate limit exceeded");

            let reset_seconds = reset_in.as_secs().max(1);
            let mut response = (
                StatusCode::TOO_MANY_REQUESTS,
                axum::Json(serde_json::json!({
                    "error": "Too many requests. Please slow down."
                })),
            )
                .into_response();

            let headers = response.headers_mut();
            if let Ok(header_value) = HeaderValue::from_str(&limit.to_string()) {
                headers.insert("X-RateLimit-Limit", header_value);
            }
            headers.insert("X-RateLimit-Remaining", HeaderValue::from_static("0"));
            if let Ok(header_value) = HeaderValue::from_str(&reset_seconds.to_string()) {
                headers.insert("Retry-After", header_value);
            }
            response
        }
    }
}
