// Rate limiting for inbound chat events
//
// Per-user token bucket. Capacity is fixed at construction and the bucket
// refills at capacity/60 tokens per second, so a full bucket takes one minute
// to recover.

use dashmap::DashMap;
use std::time::Instant;

use crate::event::UserId;

/// Token bucket for a single user.
struct TokenBucket {
    tokens: f64,
    last_refill: Instant,
}

impl TokenBucket {
    fn new(capacity: u32, now: Instant) -> Self {
        Self {
            tokens: capacity as f64,
            last_refill: now,
        }
    }

    /// Try to consume one token. Refills based on elapsed time at rate = capacity/60 tokens/sec.
    fn try_consume(&mut self, capacity: u32, now: Instant) -> bool {
        // saturating: an `allow_at` call with an older instant must not panic
        let elapsed = now.saturating_duration_since(self.last_refill).as_secs_f64();
        let refill_rate = capacity as f64 / 60.0;
        self.tokens = (self.tokens + elapsed * refill_rate).min(capacity as f64);
        if now > self.last_refill {
            self.last_refill = now;
        }

        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }
}

/// Per-user token bucket rate limiter.
///
/// Buckets are created lazily on the first event from a user and are never
/// evicted. State is in-memory only (resets on restart).
///
/// Calls for different users only contend when their keys share a map shard;
/// calls for the same user are serialized by the entry lock, so a token can't
/// be spent twice.
pub struct RateLimiter {
    limit_per_minute: u32,
    buckets: DashMap<UserId, TokenBucket>,
}

impl RateLimiter {
    pub fn new(limit_per_minute: u32) -> Self {
        Self {
            limit_per_minute,
            buckets: DashMap::new(),
        }
    }

    /// Check and consume one token for `user`.
    ///
    /// Returns true if the event is allowed, false if the rate limit is exceeded.
    pub fn allow(&self, user: UserId) -> bool {
        self.allow_at(user, Instant::now())
    }

    /// Same as [`allow`](Self::allow) with an explicit clock reading.
    pub fn allow_at(&self, user: UserId, now: Instant) -> bool {
        let capacity = self.limit_per_minute;
        let mut bucket = self
            .buckets
            .entry(user)
            .or_insert_with(|| TokenBucket::new(capacity, now));
        bucket.try_consume(capacity, now)
    }

    pub fn limit_per_minute(&self) -> u32 {
        self.limit_per_minute
    }

    /// Number of users seen so far
    pub fn tracked_users(&self) -> usize {
        self.buckets.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    #[test]
    fn test_allows_within_limit() {
        let limiter = RateLimiter::new(10);
        // Bucket starts full — first request must be allowed
        assert!(limiter.allow(UserId(1)));
        assert_eq!(limiter.tracked_users(), 1);
    }

    #[test]
    fn test_eleventh_request_blocked() {
        let limiter = RateLimiter::new(10);
        let now = Instant::now();
        for _ in 0..10 {
            assert!(limiter.allow_at(UserId(1), now));
        }
        assert!(!limiter.allow_at(UserId(1), now));
    }

    #[test]
    fn test_separate_buckets_per_user() {
        let limiter = RateLimiter::new(1);
        let now = Instant::now();
        // Drain user 1
        assert!(limiter.allow_at(UserId(1), now));
        assert!(!limiter.allow_at(UserId(1), now));
        // user 2 is unaffected
        assert!(limiter.allow_at(UserId(2), now));
    }

    #[test]
    fn test_full_window_restores_capacity() {
        let limiter = RateLimiter::new(10);
        let start = Instant::now();
        for _ in 0..10 {
            assert!(limiter.allow_at(UserId(1), start));
        }
        assert!(!limiter.allow_at(UserId(1), start));

        let later = start + Duration::from_secs(60);
        for _ in 0..10 {
            assert!(limiter.allow_at(UserId(1), later));
        }
        assert!(!limiter.allow_at(UserId(1), later));
    }

    #[test]
    fn test_partial_refill() {
        let limiter = RateLimiter::new(10);
        let start = Instant::now();
        for _ in 0..10 {
            limiter.allow_at(UserId(1), start);
        }
        // 10 tokens/minute = one token every 6 seconds
        assert!(!limiter.allow_at(UserId(1), start + Duration::from_secs(5)));
        assert!(limiter.allow_at(UserId(1), start + Duration::from_secs(7)));
        assert!(!limiter.allow_at(UserId(1), start + Duration::from_secs(7)));
    }

    #[test]
    fn test_refill_capped_at_capacity() {
        let limiter = RateLimiter::new(3);
        let start = Instant::now();
        assert!(limiter.allow_at(UserId(1), start));

        // An hour idle must not bank more than capacity
        let later = start + Duration::from_secs(3600);
        for _ in 0..3 {
            assert!(limiter.allow_at(UserId(1), later));
        }
        assert!(!limiter.allow_at(UserId(1), later));
    }

    #[test]
    fn test_earlier_instant_does_not_panic() {
        let limiter = RateLimiter::new(2);
        let now = Instant::now() + Duration::from_secs(10);
        assert!(limiter.allow_at(UserId(1), now));
        assert!(limiter.allow_at(UserId(1), now - Duration::from_secs(5)));
        assert!(!limiter.allow_at(UserId(1), now));
    }

    #[test]
    fn test_concurrent_same_user_never_double_spends() {
        let limiter = Arc::new(RateLimiter::new(10));
        let now = Instant::now();
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let limiter = Arc::clone(&limiter);
                std::thread::spawn(move || {
                    (0..5).filter(|_| limiter.allow_at(UserId(9), now)).count()
                })
            })
            .collect();

        let allowed: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(allowed, 10);
    }
}
