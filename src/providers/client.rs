//! Shared HTTP plumbing for provider adapters: a timeout-bounded client
//! and a self-imposed rate limiter.

use std::time::{Duration, Instant};

use tokio::sync::Mutex;

use crate::errors::{DextractError, Result};

use super::RateLimitConfig;

/// Single-slot rate limiter.
///
/// Tracks the time of the last request; a caller arriving earlier than
/// `window / max_requests` after it sleeps out the remainder. No burst
/// allowance beyond one request per interval. State is per instance —
/// separate adapter instances do not share a budget.
pub struct RateLimiter {
    min_interval: Duration,
    last_request: Mutex<Option<Instant>>,
}

impl RateLimiter {
    pub fn new(config: &RateLimitConfig) -> Self {
        let min_interval = if config.max_requests > 0 {
            Duration::from_millis(config.per_window_ms / config.max_requests as u64)
        } else {
            Duration::ZERO
        };
        Self {
            min_interval,
            last_request: Mutex::new(None),
        }
    }

    /// A limiter that never waits.
    pub fn disabled() -> Self {
        Self {
            min_interval: Duration::ZERO,
            last_request: Mutex::new(None),
        }
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Wait until a request is allowed. The slot lock is held across the
    /// sleep so concurrent callers queue behind each other.
    pub async fn acquire(&self) {
        if self.min_interval.is_zero() {
            return;
        }

        let mut last = self.last_request.lock().await;
        if let Some(prev) = *last {
            let elapsed = prev.elapsed();
            if elapsed < self.min_interval {
                tokio::time::sleep(self.min_interval - elapsed).await;
            }
        }
        *last = Some(Instant::now());
    }
}

/// Thin wrapper owning a `reqwest::Client` with the per-adapter timeout
/// baked in.
pub struct HttpClient {
    client: reqwest::Client,
}

impl HttpClient {
    pub fn new(timeout_secs: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| DextractError::Config(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn min_interval_is_window_over_max_requests() {
        let limiter = RateLimiter::new(&RateLimitConfig {
            max_requests: 10,
            per_window_ms: 60_000,
        });
        assert_eq!(limiter.min_interval(), Duration::from_millis(6_000));

        let unlimited = RateLimiter::new(&RateLimitConfig {
            max_requests: 0,
            per_window_ms: 60_000,
        });
        assert_eq!(unlimited.min_interval(), Duration::ZERO);
    }

    #[tokio::test]
    async fn acquire_spaces_out_consecutive_calls() {
        let limiter = RateLimiter::new(&RateLimitConfig {
            max_requests: 50,
            per_window_ms: 1_000,
        });

        let start = Instant::now();
        limiter.acquire().await;
        limiter.acquire().await;
        limiter.acquire().await;

        // Two enforced gaps of 20ms each.
        assert!(start.elapsed() >= Duration::from_millis(40));
    }

    #[tokio::test]
    async fn disabled_limiter_never_waits() {
        let limiter = RateLimiter::disabled();
        let start = Instant::now();
        for _ in 0..100 {
            limiter.acquire().await;
        }
        assert!(start.elapsed() < Duration::from_millis(100));
    }
}
