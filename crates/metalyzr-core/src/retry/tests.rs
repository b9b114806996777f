//! Retry loop behaviour across predicates, observers and timing

use std::error::Error;
use std::io;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::retry::{
    retry_with_policy, AttemptCounter, ClosurePredicate, NeverRetry, RetryError,
    RetryExecutorBuilder, RetryObserver,
};
use crate::types::{RetryPolicy, RetryStrategy};

fn quick_policy(max_attempts: u32) -> RetryPolicy {
    RetryPolicy {
        max_attempts,
        strategy: RetryStrategy::ExponentialBackoff,
        backoff_multiplier: 2.0,
        initial_delay_ms: 1,
        max_delay_ms: Some(10),
    }
}

/// Records the delay chosen before each retry
#[derive(Default)]
struct DelayRecorder {
    delays: Mutex<Vec<Duration>>,
}

impl RetryObserver for DelayRecorder {
    fn on_attempt_start(&self, _attempt: u32, _max_attempts: u32) {}

    fn on_retry_scheduled(&self, _attempt: u32, _error: &dyn Error, delay: Duration) {
        self.delays.lock().unwrap().push(delay);
    }

    fn on_success(&self, _attempt: u32, _total_duration: Duration) {}

    fn on_exhausted(&self, _attempts: u32, _final_error: &dyn Error) {}
}

fn always_timeout() -> io::Error {
    io::Error::new(io::ErrorKind::TimedOut, "always fails")
}

#[tokio::test]
async fn test_immediate_success() {
    let counter = Arc::new(AttemptCounter::new());

    let result: Result<&str, RetryError<io::Error>> = RetryExecutorBuilder::new()
        .with_policy(quick_policy(3))
        .with_observer(counter.clone())
        .build()
        .execute(|| async { Ok("ok") })
        .await;

    assert_eq!(result.unwrap(), "ok");
    assert_eq!(counter.started(), 1);
    assert_eq!(counter.succeeded(), 1);
    assert_eq!(counter.retried(), 0);
}

#[tokio::test]
async fn test_success_on_third_attempt() {
    let calls = Arc::new(AtomicU32::new(0));
    let counter = Arc::new(AttemptCounter::new());

    let result: Result<&str, RetryError<io::Error>> = RetryExecutorBuilder::new()
        .with_policy(quick_policy(3))
        .with_observer(counter.clone())
        .build()
        .execute(|| {
            let calls = calls.clone();
            async move {
                if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(io::Error::new(io::ErrorKind::ConnectionRefused, "refused"))
                } else {
                    Ok("ok")
                }
            }
        })
        .await;

    assert_eq!(result.unwrap(), "ok");
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert_eq!(counter.retried(), 2);
}

#[tokio::test]
async fn test_exhausts_exactly_budget_for_every_n() {
    for budget in 1..=5 {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::new(AttemptCounter::new());

        let result: Result<(), RetryError<io::Error>> = RetryExecutorBuilder::new()
            .with_policy(quick_policy(budget))
            .with_observer(counter.clone())
            .build()
            .execute(|| {
                let calls = calls.clone();
                async move {
                    let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                    Err(io::Error::other(format!("failure {}", n)))
                }
            })
            .await;

        let err = result.unwrap_err();
        assert!(err.is_exhausted());
        assert_eq!(err.attempts(), budget);
        assert_eq!(calls.load(Ordering::SeqCst), budget);
        assert_eq!(counter.exhausted(), 1);
        assert_eq!(counter.retried(), budget - 1);
        // The caller receives the error of the final attempt
        assert_eq!(
            err.into_source().unwrap().to_string(),
            format!("failure {}", budget)
        );
    }
}

#[tokio::test]
async fn test_rejected_error_stops_after_one_attempt() {
    let counter = Arc::new(AttemptCounter::new());
    let predicate =
        ClosurePredicate::new(|err: &io::Error| err.kind() != io::ErrorKind::NotFound);

    let result: Result<(), RetryError<io::Error>> = RetryExecutorBuilder::new()
        .with_policy(quick_policy(5))
        .with_predicate(predicate)
        .with_observer(counter.clone())
        .build()
        .execute(|| async { Err(io::Error::new(io::ErrorKind::NotFound, "missing")) })
        .await;

    let err = result.unwrap_err();
    assert!(err.is_rejected());
    assert_eq!(err.attempts(), 1);
    assert_eq!(counter.started(), 1);
    assert_eq!(counter.rejected(), 1);
}

#[tokio::test]
async fn test_never_retry_predicate() {
    let result: Result<(), RetryError<io::Error>> = RetryExecutorBuilder::new()
        .with_policy(quick_policy(3))
        .with_predicate(NeverRetry)
        .build()
        .execute(|| async { Err(always_timeout()) })
        .await;

    assert!(result.unwrap_err().is_rejected());
}

#[tokio::test]
async fn test_zero_attempts() {
    let calls = AtomicU32::new(0);
    let result: Result<(), RetryError<io::Error>> =
        retry_with_policy(&quick_policy(0), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(always_timeout()) }
        })
        .await;

    assert!(matches!(result, Err(RetryError::NoAttempts)));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn test_backoff_doubles_per_attempt() {
    let recorder = Arc::new(DelayRecorder::default());
    let policy = RetryPolicy {
        max_attempts: 4,
        strategy: RetryStrategy::ExponentialBackoff,
        backoff_multiplier: 2.0,
        initial_delay_ms: 100,
        max_delay_ms: None,
    };

    let started = tokio::time::Instant::now();
    let result: Result<(), RetryError<io::Error>> = RetryExecutorBuilder::new()
        .with_policy(policy)
        .with_observer(recorder.clone())
        .build()
        .execute(|| async { Err(always_timeout()) })
        .await;

    assert!(result.is_err());
    let delays = recorder.delays.lock().unwrap().clone();
    assert_eq!(
        delays,
        vec![
            Duration::from_millis(100),
            Duration::from_millis(200),
            Duration::from_millis(400),
        ]
    );
    // No sleep after the final attempt
    assert_eq!(started.elapsed(), Duration::from_millis(700));
}

#[tokio::test(start_paused = true)]
async fn test_attempts_are_sequential() {
    let in_flight = Arc::new(AtomicU32::new(0));
    let overlap_seen = Arc::new(AtomicU32::new(0));

    let result: Result<(), RetryError<io::Error>> =
        retry_with_policy(&quick_policy(4), || {
            let in_flight = in_flight.clone();
            let overlap_seen = overlap_seen.clone();
            async move {
                if in_flight.fetch_add(1, Ordering::SeqCst) > 0 {
                    overlap_seen.fetch_add(1, Ordering::SeqCst);
                }
                tokio::time::sleep(Duration::from_millis(5)).await;
                in_flight.fetch_sub(1, Ordering::SeqCst);
                Err(always_timeout())
            }
        })
        .await;

    assert!(result.is_err());
    assert_eq!(overlap_seen.load(Ordering::SeqCst), 0);
}
