//! Retry policy for per-object delete attempts.
//!
//! The policy is a stateless function from attempt number to wait duration,
//! shared read-only across all workers. Swapping the policy (e.g. for a
//! zero-wait variant in tests) changes retry behaviour without touching the
//! delete executor.

use std::time::Duration;

/// Decides whether, and after what delay, a failed delete attempt should be
/// retried.
///
/// `attempt` is the 1-based number of the attempt that just failed. Returning
/// `Some(delay)` means: wait `delay`, then try again. Returning `None` means
/// the retry budget is exhausted and the job is abandoned.
pub trait RetryPolicy: Send + Sync {
    fn delay(&self, attempt: u32) -> Option<Duration>;
}

/// Exponential backoff with a capped interval and a bounded attempt count.
///
/// The delay after failed attempt `n` is `initial * multiplier^(n-1)`,
/// saturating at `max_interval`.
#[derive(Debug, Clone)]
pub struct ExponentialBackoff {
    pub initial: Duration,
    pub multiplier: f64,
    pub max_interval: Duration,
    pub max_attempts: u32,
}

pub const DEFAULT_INITIAL_INTERVAL_MILLISECONDS: u64 = 100;
pub const DEFAULT_BACKOFF_MULTIPLIER: f64 = 2.0;
pub const DEFAULT_MAX_INTERVAL_MILLISECONDS: u64 = 20_000;
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

impl Default for ExponentialBackoff {
    fn default() -> Self {
        Self {
            initial: Duration::from_millis(DEFAULT_INITIAL_INTERVAL_MILLISECONDS),
            multiplier: DEFAULT_BACKOFF_MULTIPLIER,
            max_interval: Duration::from_millis(DEFAULT_MAX_INTERVAL_MILLISECONDS),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl RetryPolicy for ExponentialBackoff {
    fn delay(&self, attempt: u32) -> Option<Duration> {
        if attempt >= self.max_attempts {
            return None;
        }

        let factor = self.multiplier.powi(attempt.saturating_sub(1) as i32);
        let delay = self.initial.as_secs_f64() * factor;
        // min() discards a NaN operand and max() floors a negative one, so a
        // hostile multiplier degrades to a valid delay instead of panicking
        // in Duration::from_secs_f64.
        let capped = delay.min(self.max_interval.as_secs_f64()).max(0.0);
        Some(Duration::from_secs_f64(capped))
    }
}

/// Zero-wait policy with a bounded attempt count. Used in tests to exercise
/// retry paths without sleeping.
#[derive(Debug, Clone)]
pub struct NoDelay {
    pub max_attempts: u32,
}

impl RetryPolicy for NoDelay {
    fn delay(&self, attempt: u32) -> Option<Duration> {
        (attempt < self.max_attempts).then_some(Duration::ZERO)
    }
}
