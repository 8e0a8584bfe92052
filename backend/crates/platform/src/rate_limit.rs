//! Rate Limiting Infrastructure
//!
//! Fixed-window counters keyed by an arbitrary string. Windows are purged
//! automatically once they elapse; there is no background task.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;

/// Rate limit configuration
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Maximum requests allowed in the window
    pub max_requests: u32,
    /// Time window duration
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 10,
            window: Duration::from_secs(60),
        }
    }
}

impl RateLimitConfig {
    pub fn new(max_requests: u32, window_secs: u64) -> Self {
        Self {
            max_requests,
            window: Duration::from_secs(window_secs),
        }
    }

    /// `max_requests` per hour
    pub fn per_hour(max_requests: u32) -> Self {
        Self::new(max_requests, 3600)
    }
}

/// Rate limit check result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitResult {
    pub allowed: bool,
    pub remaining: u32,
    pub retry_after: Duration,
}

#[derive(Debug, thiserror::Error)]
pub enum RateLimitError {
    #[error("Rate limit backend unavailable: {0}")]
    Backend(String),
}

/// Trait for rate limit storage backends
#[trait_variant::make(RateLimitStore: Send)]
pub trait LocalRateLimitStore {
    /// Count one request against `key` and report whether it is allowed
    async fn check_and_increment(
        &self,
        key: &str,
        config: &RateLimitConfig,
    ) -> Result<RateLimitResult, RateLimitError>;
}

#[derive(Debug, Clone, Copy)]
struct Window {
    started_at: Instant,
    count: u32,
}

/// In-process fixed-window store
#[derive(Debug, Default)]
pub struct MemoryRateLimitStore {
    windows: Mutex<HashMap<String, Window>>,
}

impl MemoryRateLimitStore {
    pub fn new() -> Self {
        Self::default()
    }

    async fn check_at(&self, key: &str, config: &RateLimitConfig, now: Instant) -> RateLimitResult {
        let mut windows = self.windows.lock().await;

        windows.retain(|_, w| now.duration_since(w.started_at) < config.window);

        let window = windows.entry(key.to_string()).or_insert(Window {
            started_at: now,
            count: 0,
        });

        let retry_after = config
            .window
            .saturating_sub(now.duration_since(window.started_at));

        if window.count >= config.max_requests {
            return RateLimitResult {
                allowed: false,
                remaining: 0,
                retry_after,
            };
        }

        window.count += 1;
        RateLimitResult {
            allowed: true,
            remaining: config.max_requests - window.count,
            retry_after,
        }
    }

    /// Number of keys with a live window
    pub async fn tracked_keys(&self) -> usize {
        self.windows.lock().await.len()
    }
}

impl RateLimitStore for MemoryRateLimitStore {
    async fn check_and_increment(
        &self,
        key: &str,
        config: &RateLimitConfig,
    ) -> Result<RateLimitResult, RateLimitError> {
        Ok(self.check_at(key, config, Instant::now()).await)
    }
}

#[cfg(test)]
mod tests {
    use super::{MemoryRateLimitStore, RateLimitConfig, RateLimitStore};
    use std::time::{Duration, Instant};

    #[tokio::test]
    async fn test_blocks_after_limit() {
        let store = MemoryRateLimitStore::new();
        let config = RateLimitConfig::new(2, 3600);

        let first = store.check_and_increment("k", &config).await.unwrap();
        assert!(first.allowed);
        assert_eq!(first.remaining, 1);

        assert!(store.check_and_increment("k", &config).await.unwrap().allowed);

        let third = store.check_and_increment("k", &config).await.unwrap();
        assert!(!third.allowed);
        assert_eq!(third.remaining, 0);

        // Other keys are independent
        assert!(store.check_and_increment("other", &config).await.unwrap().allowed);
    }

    #[tokio::test]
    async fn test_window_expiry_purges_entries() {
        let store = MemoryRateLimitStore::new();
        let config = RateLimitConfig::per_hour(1);
        let start = Instant::now();

        assert!(store.check_at("a", &config, start).await.allowed);
        assert!(!store.check_at("a", &config, start + Duration::from_secs(10)).await.allowed);
        assert_eq!(store.tracked_keys().await, 1);

        let later = start + Duration::from_secs(3601);
        assert!(store.check_at("b", &config, later).await.allowed);
        // "a" was purged while checking "b"
        assert_eq!(store.tracked_keys().await, 1);
        assert!(store.check_at("a", &config, later).await.allowed);
    }
}
