//! Fixed-window rate limiter
//!
//! Coarse, address-keyed admission control applied ahead of every route.
//! The window table is in-memory and advisory: counts do not survive a
//! restart and are not shared across instances.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;

/// Rate limit configuration
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Maximum requests per window per client key
    pub max_requests: u32,
    /// Window length in seconds
    pub window_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 100,
            window_secs: 900,
        }
    }
}

/// Result of a rate limit check
#[derive(Debug, Clone)]
pub struct RateLimitDecision {
    /// Whether the request is allowed
    pub allowed: bool,
    /// Remaining requests in the current window
    pub remaining: u32,
    /// Total limit for the window
    pub limit: u32,
    /// Seconds until the current window resets
    pub retry_after_secs: u64,
}

/// Per-key request window
#[derive(Debug, Clone)]
struct Window {
    started: Instant,
    count: u32,
}

/// Fixed-window rate limiter keyed by client address
#[derive(Debug)]
pub struct FixedWindowLimiter {
    config: RateLimitConfig,
    windows: Arc<RwLock<HashMap<String, Window>>>,
    cleanup_interval: Duration,
    last_cleanup: Arc<RwLock<Instant>>,
}

impl FixedWindowLimiter {
    /// Create a new limiter
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            windows: Arc::new(RwLock::new(HashMap::new())),
            cleanup_interval: Duration::from_secs(300),
            last_cleanup: Arc::new(RwLock::new(Instant::now())),
        }
    }

    /// Check and record one request for the given client key
    pub async fn check_and_record(&self, key: &str) -> RateLimitDecision {
        self.maybe_cleanup().await;

        let now = Instant::now();
        let window_len = Duration::from_secs(self.config.window_secs);
        let mut windows = self.windows.write().await;

        let window = windows.entry(key.to_string()).or_insert(Window {
            started: now,
            count: 0,
        });

        // A window that has elapsed starts over
        if now.duration_since(window.started) >= window_len {
            window.started = now;
            window.count = 0;
        }

        let elapsed = now.duration_since(window.started);
        let retry_after_secs = self
            .config
            .window_secs
            .saturating_sub(elapsed.as_secs());

        if window.count >= self.config.max_requests {
            return RateLimitDecision {
                allowed: false,
                remaining: 0,
                limit: self.config.max_requests,
                retry_after_secs,
            };
        }

        window.count += 1;

        RateLimitDecision {
            allowed: true,
            remaining: self.config.max_requests - window.count,
            limit: self.config.max_requests,
            retry_after_secs,
        }
    }

    async fn maybe_cleanup(&self) {
        let should_cleanup = {
            let last = self.last_cleanup.read().await;
            last.elapsed() >= self.cleanup_interval
        };

        if should_cleanup {
            let mut last = self.last_cleanup.write().await;
            *last = Instant::now();

            let window_len = Duration::from_secs(self.config.window_secs);
            let now = Instant::now();

            let mut windows = self.windows.write().await;
            windows.retain(|_, w| now.duration_since(w.started) < window_len);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> RateLimitConfig {
        RateLimitConfig {
            max_requests: 3,
            window_secs: 900,
        }
    }

    #[tokio::test]
    async fn test_allows_until_limit() {
        let limiter = FixedWindowLimiter::new(small_config());

        for i in 0..3 {
            let decision = limiter.check_and_record("1.2.3.4").await;
            assert!(decision.allowed, "request {} should be allowed", i);
        }

        let decision = limiter.check_and_record("1.2.3.4").await;
        assert!(!decision.allowed);
        assert_eq!(decision.remaining, 0);
        assert_eq!(decision.limit, 3);
        assert!(decision.retry_after_secs <= 900);
    }

    #[tokio::test]
    async fn test_fourth_request_rejected_regardless_of_outcome() {
        // The limiter counts requests, not failures; three attempts of any
        // kind exhaust a 3-request window.
        let limiter = FixedWindowLimiter::new(small_config());

        limiter.check_and_record("1.2.3.4").await;
        limiter.check_and_record("1.2.3.4").await;
        limiter.check_and_record("1.2.3.4").await;

        assert!(!limiter.check_and_record("1.2.3.4").await.allowed);
    }

    #[tokio::test]
    async fn test_keys_are_independent() {
        let limiter = FixedWindowLimiter::new(RateLimitConfig {
            max_requests: 1,
            window_secs: 900,
        });

        assert!(limiter.check_and_record("1.2.3.4").await.allowed);
        assert!(!limiter.check_and_record("1.2.3.4").await.allowed);

        // A different client address has its own window
        assert!(limiter.check_and_record("5.6.7.8").await.allowed);
    }

    #[tokio::test]
    async fn test_window_reset() {
        let limiter = FixedWindowLimiter::new(RateLimitConfig {
            max_requests: 1,
            window_secs: 0,
        });

        // With a zero-length window every request starts a fresh one
        assert!(limiter.check_and_record("1.2.3.4").await.allowed);
        assert!(limiter.check_and_record("1.2.3.4").await.allowed);
    }

    #[tokio::test]
    async fn test_remaining_counts_down() {
        let limiter = FixedWindowLimiter::new(small_config());

        assert_eq!(limiter.check_and_record("k").await.remaining, 2);
        assert_eq!(limiter.check_and_record("k").await.remaining, 1);
        assert_eq!(limiter.check_and_record("k").await.remaining, 0);
    }
}
