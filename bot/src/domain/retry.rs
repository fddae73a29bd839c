//! Retry policy and the tri-state outcome of one attempt.

use std::time::Duration;

/// Bounded retry budget with a fixed delay between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first one. Never zero.
    pub max_attempts: u32,
    /// Pause between two consecutive attempts.
    pub delay: Duration,
}

impl RetryPolicy {
    #[must_use]
    pub const fn fixed(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
        }
    }
}

/// Outcome of a single attempt that did not fail fatally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attempt<T> {
    /// The attempt produced its value; stop retrying.
    Ready(T),
    /// Not available yet; retry if the budget allows.
    Pending,
}
