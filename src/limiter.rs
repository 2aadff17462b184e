//! Token bucket for throttling input-driven mutations.

use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Default refill period of one token.
pub const DEFAULT_REFILL: Duration = Duration::from_millis(20);

struct Bucket {
    tokens: f64,
    last_refill: Instant,
}

/// A token bucket. Each module that reacts to clicks owns one, so a burst of
/// clicks on one module can not starve another.
pub struct RateLimiter {
    refill: Duration,
    burst: u32,
    bucket: Mutex<Bucket>,
}

impl RateLimiter {
    /// One token every `refill`, at most `burst` saved up. The bucket starts
    /// full.
    pub fn new(refill: Duration, burst: u32) -> Self {
        Self {
            refill,
            burst,
            bucket: Mutex::new(Bucket {
                tokens: burst as f64,
                last_refill: Instant::now(),
            }),
        }
    }

    /// A limiter that never says no.
    pub fn unlimited() -> Self {
        Self::new(Duration::ZERO, u32::MAX)
    }

    /// Take a token if one is available.
    pub fn allow(&self) -> bool {
        self.allow_at(Instant::now())
    }

    /// [`allow`](Self::allow) as of `now`.
    pub fn allow_at(&self, now: Instant) -> bool {
        if self.refill.is_zero() {
            return self.burst > 0;
        }

        let mut bucket = self.bucket.lock().unwrap_or_else(PoisonError::into_inner);

        let elapsed = now.saturating_duration_since(bucket.last_refill);
        let refilled = elapsed.as_secs_f64() / self.refill.as_secs_f64();
        bucket.tokens = (bucket.tokens + refilled).min(self.burst as f64);
        if now > bucket.last_refill {
            bucket.last_refill = now;
        }

        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            true
        } else {
            false
        }
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_REFILL, 1)
    }
}
