//! Circuit breaker for data provider rate limiting and IP bans.
//!
//! HTTP 403 trips the breaker immediately; repeated failures (429, 5xx) trip
//! it after a threshold. While open, every request is refused until the
//! cooldown expires. Shared by all scan workers through an `Arc`.

use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// State of the circuit breaker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BreakerState {
    /// Normal operation: requests are allowed.
    Closed,
    /// Tripped: requests are refused until cooldown expires.
    Open { tripped_at: Instant },
}

#[derive(Debug)]
struct Inner {
    state: BreakerState,
    consecutive_failures: u32,
}

#[derive(Debug)]
pub struct CircuitBreaker {
    inner: Mutex<Inner>,
    cooldown: Duration,
    failure_threshold: u32,
}

impl CircuitBreaker {
    pub fn new(cooldown: Duration, failure_threshold: u32) -> Self {
        Self {
            inner: Mutex::new(Inner {
                state: BreakerState::Closed,
                consecutive_failures: 0,
            }),
            cooldown,
            failure_threshold: failure_threshold.max(1),
        }
    }

    /// Default breaker: 30-minute cooldown, trips after 3 consecutive failures.
    pub fn default_provider() -> Self {
        Self::new(Duration::from_secs(30 * 60), 3)
    }

    // A panic while holding the lock cannot leave `Inner` half-updated, so a
    // poisoned lock is still usable.
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Check if requests are currently allowed. Resets an expired breaker.
    pub fn is_allowed(&self) -> bool {
        let mut inner = self.lock();
        match inner.state {
            BreakerState::Closed => true,
            BreakerState::Open { tripped_at } if tripped_at.elapsed() >= self.cooldown => {
                inner.state = BreakerState::Closed;
                inner.consecutive_failures = 0;
                true
            }
            BreakerState::Open { .. } => false,
        }
    }

    /// Record a successful request: resets the failure counter.
    pub fn record_success(&self) {
        self.lock().consecutive_failures = 0;
    }

    /// Record a failure; trips the breaker once the threshold is reached.
    pub fn record_failure(&self) {
        let mut inner = self.lock();
        inner.consecutive_failures += 1;
        if inner.consecutive_failures >= self.failure_threshold {
            inner.state = BreakerState::Open {
                tripped_at: Instant::now(),
            };
        }
    }

    /// Immediately trip the breaker (403 Forbidden / IP ban).
    pub fn trip(&self) {
        self.lock().state = BreakerState::Open {
            tripped_at: Instant::now(),
        };
    }

    /// Remaining cooldown time (zero if not tripped).
    pub fn remaining_cooldown(&self) -> Duration {
        match self.lock().state {
            BreakerState::Closed => Duration::ZERO,
            BreakerState::Open { tripped_at } => self.cooldown.saturating_sub(tripped_at.elapsed()),
        }
    }
}
