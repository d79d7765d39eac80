//! Retry policy for transport failures.

use std::time::Duration;

/// Delay between transport-level retries of the same request.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);

/// How the evaluator retries a request whose HTTP exchange failed.
///
/// The delay is fixed; there is no backoff. With `max_attempts == None` the
/// same request is retried until a response arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Wait between attempts.
    pub delay: Duration,
    /// Total attempts allowed per record, including the first one.
    pub max_attempts: Option<u32>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            delay: DEFAULT_RETRY_DELAY,
            max_attempts: None,
        }
    }
}

impl RetryPolicy {
    /// Retry forever with the given delay.
    pub fn unbounded(delay: Duration) -> Self {
        Self {
            delay,
            max_attempts: None,
        }
    }

    /// Give up after `max_attempts` total attempts.
    pub fn bounded(delay: Duration, max_attempts: u32) -> Self {
        Self {
            delay,
            max_attempts: Some(max_attempts.max(1)),
        }
    }

    /// Whether another attempt is allowed after `attempts_made` failures.
    pub fn allows_retry(&self, attempts_made: u32) -> bool {
        match self.max_attempts {
            Some(max) => attempts_made < max,
            None => true,
        }
    }
}
