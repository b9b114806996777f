//! Retry lifecycle observation
//!
//! `RetryObserver` receives a callback at every step of a retry loop.
//! `TracingObserver` turns them into structured `tracing` events and
//! `AttemptCounter` counts them.

use std::error::Error;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Callbacks fired by `RetryExecutor`
pub trait RetryObserver: Send + Sync {
    /// An attempt (1-indexed) is about to run
    fn on_attempt_start(&self, attempt: u32, max_attempts: u32);

    /// An attempt failed and the next one will start after `delay`
    fn on_retry_scheduled(&self, attempt: u32, error: &dyn Error, delay: Duration);

    /// The operation succeeded on `attempt`
    fn on_success(&self, attempt: u32, total_duration: Duration);

    /// The final allowed attempt failed
    fn on_exhausted(&self, attempts: u32, final_error: &dyn Error);

    /// An attempt failed with an error the predicate would not retry
    fn on_rejected(&self, attempt: u32, error: &dyn Error) {
        let _ = (attempt, error);
    }
}

/// Observer that ignores every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpObserver;

impl RetryObserver for NoOpObserver {
    fn on_attempt_start(&self, _attempt: u32, _max_attempts: u32) {}

    fn on_retry_scheduled(&self, _attempt: u32, _error: &dyn Error, _delay: Duration) {}

    fn on_success(&self, _attempt: u32, _total_duration: Duration) {}

    fn on_exhausted(&self, _attempts: u32, _final_error: &dyn Error) {}
}

/// Observer that logs through `tracing`
///
/// Attempt starts and first-try successes are DEBUG, scheduled retries and
/// rejections WARN, success after a retry INFO, exhaustion ERROR.
#[derive(Debug, Clone)]
pub struct TracingObserver {
    operation: String,
}

impl TracingObserver {
    /// `operation` labels every event, e.g. `"GET /api/stats"`
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
        }
    }

    pub fn operation(&self) -> &str {
        &self.operation
    }
}

impl Default for TracingObserver {
    fn default() -> Self {
        Self::new("request")
    }
}

impl RetryObserver for TracingObserver {
    fn on_attempt_start(&self, attempt: u32, max_attempts: u32) {
        tracing::debug!(
            operation = %self.operation,
            attempt,
            max_attempts,
            "starting attempt"
        );
    }

    fn on_retry_scheduled(&self, attempt: u32, error: &dyn Error, delay: Duration) {
        tracing::warn!(
            operation = %self.operation,
            attempt,
            error = %error,
            delay_ms = delay.as_millis() as u64,
            "attempt failed, retrying"
        );
    }

    fn on_success(&self, attempt: u32, total_duration: Duration) {
        if attempt > 1 {
            tracing::info!(
                operation = %self.operation,
                attempt,
                total_duration_ms = total_duration.as_millis() as u64,
                "succeeded after retry"
            );
        } else {
            tracing::debug!(
                operation = %self.operation,
                duration_ms = total_duration.as_millis() as u64,
                "succeeded"
            );
        }
    }

    fn on_exhausted(&self, attempts: u32, final_error: &dyn Error) {
        tracing::error!(
            operation = %self.operation,
            attempts,
            error = %final_error,
            "all attempts failed"
        );
    }

    fn on_rejected(&self, attempt: u32, error: &dyn Error) {
        tracing::warn!(
            operation = %self.operation,
            attempt,
            error = %error,
            "terminal error, not retrying"
        );
    }
}

/// Observer that counts events
#[derive(Debug, Default)]
pub struct AttemptCounter {
    started: AtomicU32,
    retried: AtomicU32,
    succeeded: AtomicU32,
    exhausted: AtomicU32,
    rejected: AtomicU32,
}

impl AttemptCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attempts started, i.e. calls made to the operation
    pub fn started(&self) -> u32 {
        self.started.load(Ordering::SeqCst)
    }

    pub fn retried(&self) -> u32 {
        self.retried.load(Ordering::SeqCst)
    }

    pub fn succeeded(&self) -> u32 {
        self.succeeded.load(Ordering::SeqCst)
    }

    pub fn exhausted(&self) -> u32 {
        self.exhausted.load(Ordering::SeqCst)
    }

    pub fn rejected(&self) -> u32 {
        self.rejected.load(Ordering::SeqCst)
    }
}

impl RetryObserver for AttemptCounter {
    fn on_attempt_start(&self, _attempt: u32, _max_attempts: u32) {
        self.started.fetch_add(1, Ordering::SeqCst);
    }

    fn on_retry_scheduled(&self, _attempt: u32, _error: &dyn Error, _delay: Duration) {
        self.retried.fetch_add(1, Ordering::SeqCst);
    }

    fn on_success(&self, _attempt: u32, _total_duration: Duration) {
        self.succeeded.fetch_add(1, Ordering::SeqCst);
    }

    fn on_exhausted(&self, _attempts: u32, _final_error: &dyn Error) {
        self.exhausted.fetch_add(1, Ordering::SeqCst);
    }

    fn on_rejected(&self, _attempt: u32, _error: &dyn Error) {
        self.rejected.fetch_add(1, Ordering::SeqCst);
    }
}

impl<T: RetryObserver + ?Sized> RetryObserver for Arc<T> {
    fn on_attempt_start(&self, attempt: u32, max_attempts: u32) {
        (**self).on_attempt_start(attempt, max_attempts)
    }

    fn on_retry_scheduled(&self, attempt: u32, error: &dyn Error, delay: Duration) {
        (**self).on_retry_scheduled(attempt, error, delay)
    }

    fn on_success(&self, attempt: u32, total_duration: Duration) {
        (**self).on_success(attempt, total_duration)
    }

    fn on_exhausted(&self, attempts: u32, final_error: &dyn Error) {
        (**self).on_exhausted(attempts, final_error)
    }

    fn on_rejected(&self, attempt: u32, error: &dyn Error) {
        (**self).on_rejected(attempt, error)
    }
}

/// Fans every event out to a list of observers, in insertion order
#[derive(Default, Clone)]
pub struct ObserverSet {
    observers: Vec<Arc<dyn RetryObserver>>,
}

impl ObserverSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an observer to the set
    pub fn with(mut self, observer: Arc<dyn RetryObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}

impl RetryObserver for ObserverSet {
    fn on_attempt_start(&self, attempt: u32, max_attempts: u32) {
        for observer in &self.observers {
            observer.on_attempt_start(attempt, max_attempts);
        }
    }

    fn on_retry_scheduled(&self, attempt: u32, error: &dyn Error, delay: Duration) {
        for observer in &self.observers {
            observer.on_retry_scheduled(attempt, error, delay);
        }
    }

    fn on_success(&self, attempt: u32, total_duration: Duration) {
        for observer in &self.observers {
            observer.on_success(attempt, total_duration);
        }
    }

    fn on_exhausted(&self, attempts: u32, final_error: &dyn Error) {
        for observer in &self.observers {
            observer.on_exhausted(attempts, final_error);
        }
    }

    fn on_rejected(&self, attempt: u32, error: &dyn Error) {
        for observer in &self.observers {
            observer.on_rejected(attempt, error);
        }
    }
}
