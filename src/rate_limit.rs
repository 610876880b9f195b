use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use time::{Duration, OffsetDateTime};

use crate::config::RateLimitConfig;

/// One counting window for a single identifier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Window {
    pub count: u32,
    pub reset_at: OffsetDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub remaining: u32,
    pub reset_at: OffsetDateTime,
}

impl RateLimitDecision {
    /// Whole seconds until the window resets, rounded up, never negative.
    pub fn retry_after(&self, now: OffsetDateTime) -> i64 {
        let millis = (self.reset_at - now).whole_milliseconds().max(0);
        ((millis + 999) / 1000) as i64
    }
}

/// Fixed-window counting step. Pure over {window, now, config}: opens a new
/// window when none exists or the old one expired, otherwise counts against
/// the existing one. Returns the window to store alongside the decision.
pub fn advance(
    window: Option<Window>,
    now: OffsetDateTime,
    config: &RateLimitConfig,
) -> (Window, RateLimitDecision) {
    match window {
        Some(w) if w.reset_at > now => {
            if w.count >= config.max_requests {
                let decision = RateLimitDecision {
                    allowed: false,
                    remaining: 0,
                    reset_at: w.reset_at,
                };
                (w, decision)
            } else {
                let next = Window {
                    count: w.count + 1,
                    reset_at: w.reset_at,
                };
                let decision = RateLimitDecision {
                    allowed: true,
                    remaining: config.max_requests - next.count,
                    reset_at: next.reset_at,
                };
                (next, decision)
            }
        }
        _ => {
            let next = Window {
                count: 1,
                reset_at: now + Duration::seconds(config.window_seconds as i64),
            };
            let decision = RateLimitDecision {
                allowed: true,
                remaining: config.max_requests.saturating_sub(1),
                reset_at: next.reset_at,
            };
            (next, decision)
        }
    }
}

/// Swappable counter store so the limiter can move to a shared backend
/// (e.g. a TTL'd key-value store) without touching the counting logic.
#[async_trait]
pub trait RateLimitStore: Send + Sync {
    async fn hit(&self, key: &str, now: OffsetDateTime) -> RateLimitDecision;
}

pub struct InMemoryRateLimiter {
    config: RateLimitConfig,
    windows: Mutex<HashMap<String, Window>>,
}

impl InMemoryRateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            windows: Mutex::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl RateLimitStore for InMemoryRateLimiter {
    async fn hit(&self, key: &str, now: OffsetDateTime) -> RateLimitDecision {
        let mut windows = self
            .windows
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        // Expired windows of other identifiers are dead weight; drop them here
        // instead of on a timer.
        windows.retain(|_, w| w.reset_at > now);

        let (next, decision) = advance(windows.get(key).copied(), now, &self.config);
        windows.insert(key.to_string(), next);
        decision
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn config(max_requests: u32, window_seconds: u64) -> RateLimitConfig {
        RateLimitConfig {
            max_requests,
            window_seconds,
        }
    }

    #[test]
    fn first_hit_opens_a_window() {
        let now = datetime!(2025-06-01 12:00:00 UTC);
        let (window, decision) = advance(None, now, &config(20, 60));
        assert!(decision.allowed);
        assert_eq!(decision.remaining, 19);
        assert_eq!(window.count, 1);
        assert_eq!(window.reset_at, now + Duration::seconds(60));
    }

    #[test]
    fn counts_up_to_the_limit_then_denies() {
        let now = datetime!(2025-06-01 12:00:00 UTC);
        let cfg = config(3, 60);
        let mut window = None;
        for _ in 0..3 {
            let (w, decision) = advance(window, now, &cfg);
            assert!(decision.allowed);
            window = Some(w);
        }
        let (w, decision) = advance(window, now + Duration::seconds(1), &cfg);
        assert!(!decision.allowed);
        assert_eq!(decision.remaining, 0);
        assert_eq!(decision.reset_at, now + Duration::seconds(60));
        // A denied hit does not grow the count.
        assert_eq!(w.count, 3);
    }

    #[test]
    fn expired_window_starts_over() {
        let now = datetime!(2025-06-01 12:00:00 UTC);
        let cfg = config(2, 60);
        let (w, _) = advance(None, now, &cfg);
        let later = now + Duration::seconds(61);
        let (w, decision) = advance(Some(w), later, &cfg);
        assert!(decision.allowed);
        assert_eq!(w.count, 1);
        assert_eq!(w.reset_at, later + Duration::seconds(60));
    }

    #[test]
    fn retry_after_rounds_up_and_floors_at_zero() {
        let now = datetime!(2025-06-01 12:00:00 UTC);
        let decision = RateLimitDecision {
            allowed: false,
            remaining: 0,
            reset_at: now + Duration::milliseconds(1500),
        };
        assert_eq!(decision.retry_after(now), 2);
        assert_eq!(decision.retry_after(now + Duration::seconds(5)), 0);
    }

    #[tokio::test]
    async fn in_memory_store_tracks_keys_independently() {
        let store = InMemoryRateLimiter::new(config(1, 60));
        let now = datetime!(2025-06-01 12:00:00 UTC);

        assert!(store.hit("user-a", now).await.allowed);
        assert!(!store.hit("user-a", now).await.allowed);
        assert!(store.hit("user-b", now).await.allowed);
    }

    #[tokio::test]
    async fn in_memory_store_resets_after_the_window() {
        let store = InMemoryRateLimiter::new(config(1, 60));
        let now = datetime!(2025-06-01 12:00:00 UTC);

        assert!(store.hit("user-a", now).await.allowed);
        assert!(!store.hit("user-a", now).await.allowed);
        assert!(
            store
                .hit("user-a", now + Duration::seconds(61))
                .await
                .allowed
        );
    }
}
