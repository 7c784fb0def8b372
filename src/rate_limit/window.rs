//! Per-client fixed-window request counters.

use std::time::{Duration, Instant};

use dashmap::DashMap;

use crate::config::schema::RateLimitConfig;

/// Limiter parameters: window duration and the inclusive request budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitParams {
    pub window: Duration,
    pub max_requests: u32,
}

impl From<RateLimitConfig> for RateLimitParams {
    fn from(config: RateLimitConfig) -> Self {
        Self {
            window: Duration::from_millis(config.window_ms),
            max_requests: config.max_requests,
        }
    }
}

/// The outcome of a rate-limit check, with the metadata surfaced to
/// compatible clients via `RateLimit-*` headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub permitted: bool,
    /// The window budget (`RateLimit-Limit`).
    pub limit: u32,
    /// Requests left in the current window (`RateLimit-Remaining`).
    pub remaining: u32,
    /// Time until the current window resets (`RateLimit-Reset`).
    pub reset_after: Duration,
}

struct WindowState {
    window_start: Instant,
    count: u32,
}

/// Fixed-window rate limiter keyed by client identity.
///
/// State is created lazily on a key's first request and reset when the
/// window elapses. The request that makes the count exactly equal
/// `max_requests` is permitted; the next one is rejected.
///
/// Each check is a snapshot-then-increment performed while holding the
/// key's map entry, so concurrent requests from one client serialize and
/// the count never exceeds what a sequential execution would produce.
pub struct FixedWindowLimiter {
    params: RateLimitParams,
    windows: DashMap<String, WindowState>,
}

impl FixedWindowLimiter {
    pub fn new(params: RateLimitParams) -> Self {
        Self {
            params,
            windows: DashMap::new(),
        }
    }

    pub fn params(&self) -> RateLimitParams {
        self.params
    }

    /// Record a request for `key` at `now` and decide permit or reject.
    pub fn check(&self, key: &str, now: Instant) -> RateLimitDecision {
        let mut entry = self
            .windows
            .entry(key.to_string())
            .or_insert_with(|| WindowState {
                window_start: now,
                count: 0,
            });
        let state = entry.value_mut();

        if now.duration_since(state.window_start) >= self.params.window {
            state.window_start = now;
            state.count = 0;
        }

        state.count = state.count.saturating_add(1);

        let elapsed = now.duration_since(state.window_start);
        RateLimitDecision {
            permitted: state.count <= self.params.max_requests,
            limit: self.params.max_requests,
            remaining: self.params.max_requests.saturating_sub(state.count),
            reset_after: self.params.window.saturating_sub(elapsed),
        }
    }

    /// Drop entries whose window expired at least one full window ago.
    ///
    /// Bounds key cardinality to clients seen within the last two windows;
    /// a key purged between requests simply starts a fresh window.
    pub fn purge_expired(&self, now: Instant) {
        let ttl = self.params.window * 2;
        self.windows
            .retain(|_, state| now.duration_since(state.window_start) < ttl);
    }

    /// Number of client keys currently tracked.
    pub fn tracked_keys(&self) -> usize {
        self.windows.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn limiter(window_ms: u64, max_requests: u32) -> FixedWindowLimiter {
        FixedWindowLimiter::new(RateLimitParams {
            window: Duration::from_millis(window_ms),
            max_requests,
        })
    }

    #[test]
    fn budget_is_inclusive_of_max_requests() {
        let limiter = limiter(60_000, 5);
        let now = Instant::now();

        for _ in 0..5 {
            assert!(limiter.check("1.2.3.4", now).permitted);
        }
        let sixth = limiter.check("1.2.3.4", now);
        assert!(!sixth.permitted);
        assert_eq!(sixth.limit, 5);
        assert_eq!(sixth.remaining, 0);
    }

    #[test]
    fn window_elapse_resets_counter() {
        let limiter = limiter(60_000, 5);
        let start = Instant::now();

        for _ in 0..6 {
            limiter.check("1.2.3.4", start);
        }
        assert!(!limiter.check("1.2.3.4", start).permitted);

        let after_window = start + Duration::from_millis(60_000);
        let decision = limiter.check("1.2.3.4", after_window);
        assert!(decision.permitted);
        assert_eq!(decision.remaining, 4);
    }

    #[test]
    fn keys_are_independent() {
        let limiter = limiter(60_000, 1);
        let now = Instant::now();

        assert!(limiter.check("1.1.1.1", now).permitted);
        assert!(!limiter.check("1.1.1.1", now).permitted);
        assert!(limiter.check("2.2.2.2", now).permitted);
    }

    #[test]
    fn decision_metadata_counts_down() {
        let limiter = limiter(60_000, 3);
        let now = Instant::now();

        assert_eq!(limiter.check("k", now).remaining, 2);
        assert_eq!(limiter.check("k", now).remaining, 1);
        assert_eq!(limiter.check("k", now).remaining, 0);
        assert_eq!(limiter.check("k", now).remaining, 0);
    }

    #[test]
    fn reset_after_tracks_window_remainder() {
        let limiter = limiter(60_000, 5);
        let start = Instant::now();

        limiter.check("k", start);
        let later = start + Duration::from_millis(15_000);
        let decision = limiter.check("k", later);
        assert_eq!(decision.reset_after, Duration::from_millis(45_000));
    }

    #[test]
    fn concurrent_checks_never_over_permit() {
        let limiter = Arc::new(limiter(60_000, 10));
        let permits = Arc::new(AtomicU32::new(0));
        let now = Instant::now();

        let handles: Vec<_> = (0..32)
            .map(|_| {
                let limiter = Arc::clone(&limiter);
                let permits = Arc::clone(&permits);
                std::thread::spawn(move || {
                    if limiter.check("shared", now).permitted {
                        permits.fetch_add(1, Ordering::SeqCst);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(permits.load(Ordering::SeqCst), 10);
    }

    #[test]
    fn purge_drops_stale_keys_only() {
        let limiter = limiter(1_000, 5);
        let start = Instant::now();

        limiter.check("stale", start);
        limiter.check("fresh", start + Duration::from_millis(1_500));
        assert_eq!(limiter.tracked_keys(), 2);

        limiter.purge_expired(start + Duration::from_millis(2_500));
        assert_eq!(limiter.tracked_keys(), 1);

        // The purged key starts over with a full budget.
        let decision = limiter.check("stale", start + Duration::from_millis(2_500));
        assert!(decision.permitted);
        assert_eq!(decision.remaining, 4);
    }
}
