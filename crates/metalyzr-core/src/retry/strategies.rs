//! Backoff delay calculation and retry predicates

use crate::types::{RetryPolicy, RetryStrategy};
use std::time::Duration;

/// Delay to wait after a failed attempt, before the next one
///
/// `attempt` is the 1-indexed attempt that just failed, so with the
/// exponential strategy the wait after attempt `k + 1` is
/// `initial_delay * multiplier^k`. A configured `max_delay_ms` caps the result.
///
/// # Example
///
/// ```rust
/// use metalyzr_core::retry::calculate_delay;
/// use metalyzr_core::types::RetryPolicy;
/// use std::time::Duration;
///
/// let policy = RetryPolicy::exponential(3, Duration::from_millis(1000));
///
/// assert_eq!(calculate_delay(&policy, 1).as_millis(), 1000);
/// assert_eq!(calculate_delay(&policy, 2).as_millis(), 2000);
/// ```
pub fn calculate_delay(policy: &RetryPolicy, attempt: u32) -> Duration {
    let exponent = attempt.saturating_sub(1);

    let delay_ms = match policy.strategy {
        RetryStrategy::None => 0,
        RetryStrategy::FixedDelay => policy.initial_delay_ms,
        RetryStrategy::ExponentialBackoff => {
            let factor = policy.backoff_multiplier.powi(exponent.min(i32::MAX as u32) as i32);
            let raw = policy.initial_delay_ms as f64 * factor;
            if raw.is_finite() && raw < u64::MAX as f64 {
                raw as u64
            } else {
                u64::MAX
            }
        }
    };

    match policy.max_delay_ms {
        Some(cap) => Duration::from_millis(delay_ms.min(cap)),
        None => Duration::from_millis(delay_ms),
    }
}

/// Decides whether a failed attempt may be retried
pub trait RetryPredicate<E: ?Sized>: Send + Sync {
    /// `true` if another attempt is worthwhile
    fn should_retry(&self, error: &E) -> bool;
}

/// Retries every error
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysRetry;

impl<E: ?Sized> RetryPredicate<E> for AlwaysRetry {
    fn should_retry(&self, _error: &E) -> bool {
        true
    }
}

/// Never retries; the first failure is terminal
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverRetry;

impl<E: ?Sized> RetryPredicate<E> for NeverRetry {
    fn should_retry(&self, _error: &E) -> bool {
        false
    }
}

/// Predicate backed by a closure
pub struct ClosurePredicate<F> {
    predicate: F,
}

impl<F> ClosurePredicate<F> {
    pub fn new(predicate: F) -> Self {
        Self { predicate }
    }
}

impl<E, F> RetryPredicate<E> for ClosurePredicate<F>
where
    F: Fn(&E) -> bool + Send + Sync,
{
    fn should_retry(&self, error: &E) -> bool {
        (self.predicate)(error)
    }
}

/// Errors that know whether they are transient
pub trait Retryable {
    fn is_retryable(&self) -> bool;
}

/// Defers the decision to the error's own `Retryable` implementation
#[derive(Debug, Clone, Copy, Default)]
pub struct RetryIfRetryable;

impl<E: Retryable> RetryPredicate<E> for RetryIfRetryable {
    fn should_retry(&self, error: &E) -> bool {
        error.is_retryable()
    }
}
