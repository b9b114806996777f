//! Policy-driven async retry engine
//!
//! Runs a fallible async operation up to `RetryPolicy::max_attempts` times,
//! strictly one attempt at a time, waiting between attempts according to the
//! policy's backoff strategy.
//!
//! - `RetryPredicate` decides whether a failure is worth another attempt
//! - `RetryObserver` receives lifecycle callbacks (`TracingObserver` logs them)
//! - `RetryError` reports why the loop gave up, with the last error attached
//!
//! # Example
//!
//! ```rust,no_run
//! use metalyzr_core::retry::{retry_with_policy, RetryError};
//! use metalyzr_core::types::RetryPolicy;
//!
//! async fn example() -> Result<String, RetryError<std::io::Error>> {
//!     let policy = RetryPolicy::default();
//!
//!     retry_with_policy(&policy, || async {
//!         Ok("connected".to_string())
//!     }).await
//! }
//! ```

mod error;
mod executor;
mod observer;
mod strategies;

pub use error::RetryError;
pub use executor::{retry_with_policy, RetryExecutor, RetryExecutorBuilder};
pub use observer::{AttemptCounter, NoOpObserver, ObserverSet, RetryObserver, TracingObserver};
pub use strategies::{
    calculate_delay, AlwaysRetry, ClosurePredicate, NeverRetry, Retryable, RetryIfRetryable,
    RetryPredicate,
};

#[cfg(test)]
mod tests;
