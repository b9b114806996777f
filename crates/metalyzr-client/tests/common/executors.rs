//! Executor factories

use metalyzr_client::RequestExecutor;
use metalyzr_core::retry::{AttemptCounter, RetryObserver};
use metalyzr_core::types::RetryPolicy;
use std::sync::Arc;
use std::time::Duration;

/// Executor with `attempts` attempts and a `base_delay_ms` backoff
pub fn test_executor(base_url: &str, attempts: u32, base_delay_ms: u64) -> RequestExecutor {
    RequestExecutor::builder(base_url)
        .with_policy(RetryPolicy::exponential(
            attempts,
            Duration::from_millis(base_delay_ms),
        ))
        .with_timeout(Duration::from_secs(5))
        .build()
        .unwrap()
}

/// Same as `test_executor`, plus a counter observing every attempt
pub fn counted_executor(
    base_url: &str,
    attempts: u32,
    base_delay_ms: u64,
) -> (RequestExecutor, Arc<AttemptCounter>) {
    let counter = Arc::new(AttemptCounter::new());
    let executor = RequestExecutor::builder(base_url)
        .with_policy(RetryPolicy::exponential(
            attempts,
            Duration::from_millis(base_delay_ms),
        ))
        .with_timeout(Duration::from_secs(5))
        .with_observer(Arc::clone(&counter) as Arc<dyn RetryObserver>)
        .build()
        .unwrap();
    (executor, counter)
}
