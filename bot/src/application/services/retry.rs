//! Fixed-delay retry loop shared by every polling use-case.

use std::future::Future;
use std::time::Duration;

use crate::domain::{Attempt, RetryPolicy};

/// Why [`retry_with`] gave up.
#[derive(Debug)]
pub enum RetryError<E> {
    /// Every attempt returned [`Attempt::Pending`].
    Exhausted { attempts: u32 },
    /// An attempt failed with an error that is never retried.
    Fatal(E),
}

/// Run `op` until it is ready, fails fatally, or the budget is spent.
///
/// `op` receives the 1-based attempt number. `on_retry` runs before each
/// pause with the attempt that just came back pending and the delay about to
/// elapse. It is not called after the last attempt.
///
/// # Errors
///
/// Returns [`RetryError::Fatal`] on the first `Err` from `op`, and
/// [`RetryError::Exhausted`] when all attempts came back pending.
pub async fn retry_with<T, E, F, Fut, H>(
    policy: RetryPolicy,
    mut op: F,
    mut on_retry: H,
) -> Result<T, RetryError<E>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<Attempt<T>, E>>,
    H: FnMut(u32, Duration),
{
    for attempt in 1..=policy.max_attempts {
        match op(attempt).await {
            Ok(Attempt::Ready(value)) => return Ok(value),
            Ok(Attempt::Pending) => {}
            Err(e) => return Err(RetryError::Fatal(e)),
        }
        if attempt < policy.max_attempts {
            on_retry(attempt, policy.delay);
            tokio::time::sleep(policy.delay).await;
        }
    }
    Err(RetryError::Exhausted {
        attempts: policy.max_attempts,
    })
}
