// ── Retry and backoff policies ──

use std::time::Duration;

/// Geometric backoff: `delay(n) = min(initial * factor^n, max)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Backoff {
    pub initial: Duration,
    pub max: Duration,
    pub factor: f64,
}

impl Backoff {
    pub const fn new(initial: Duration, max: Duration, factor: f64) -> Self {
        Self {
            initial,
            max,
            factor,
        }
    }

    /// Delay to wait after the `attempt`-th failure (zero-based).
    pub fn delay(&self, attempt: u32) -> Duration {
        let exp = i32::try_from(attempt).unwrap_or(i32::MAX);
        let scaled = self.initial.as_secs_f64() * self.factor.powi(exp);
        let capped = scaled.min(self.max.as_secs_f64());
        Duration::from_secs_f64(capped.max(0.0))
    }
}

/// Bounded retry loop parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff: Backoff,
}

impl RetryPolicy {
    /// Connect-time policy: 10 attempts, 1s growing by 1.5x up to 10s.
    ///
    /// Long enough to ride out the BlueRiver service still booting.
    pub const CONNECT: Self = Self {
        max_attempts: 10,
        backoff: Backoff::new(Duration::from_secs(1), Duration::from_secs(10), 1.5),
    };

    /// Join/leave verification: 5 attempts, 0.5s doubling up to 4s.
    pub const VERIFY: Self = Self {
        max_attempts: 5,
        backoff: Backoff::new(Duration::from_millis(500), Duration::from_secs(4), 2.0),
    };
}

/// Fixed-interval polling of a PROCESSING request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub max_attempts: u32,
    pub interval: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 20,
            interval: Duration::from_millis(500),
        }
    }
}
