//! Observable async operations
//!
//! `AsyncOperation` wraps any fallible async function and tracks its lifecycle
//! as `idle -> loading -> success | error`. Observers subscribe to a
//! `tokio::sync::watch` channel. Results are applied only when they belong to
//! the most recent call and the operation is still active, so a slow earlier
//! call can never overwrite a newer result.

use crate::error::ClassifiedError;
use futures::future::BoxFuture;
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

/// Lifecycle status of an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationStatus {
    #[default]
    Idle,
    Loading,
    Success,
    Error,
}

impl fmt::Display for OperationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OperationStatus::Idle => "idle",
            OperationStatus::Loading => "loading",
            OperationStatus::Success => "success",
            OperationStatus::Error => "error",
        };
        f.write_str(name)
    }
}

/// Snapshot of an operation
///
/// In `Success` only `data` is set, in `Error` only `error`. While `Loading`,
/// the data of the previous success is kept so views can show stale content.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationState<T, E = ClassifiedError> {
    status: OperationStatus,
    data: Option<T>,
    error: Option<E>,
}

impl<T, E> Default for OperationState<T, E> {
    fn default() -> Self {
        Self {
            status: OperationStatus::Idle,
            data: None,
            error: None,
        }
    }
}

impl<T, E> OperationState<T, E> {
    pub fn status(&self) -> OperationStatus {
        self.status
    }

    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    pub fn error(&self) -> Option<&E> {
        self.error.as_ref()
    }

    pub fn is_idle(&self) -> bool {
        self.status == OperationStatus::Idle
    }

    pub fn is_loading(&self) -> bool {
        self.status == OperationStatus::Loading
    }

    pub fn is_success(&self) -> bool {
        self.status == OperationStatus::Success
    }

    pub fn is_error(&self) -> bool {
        self.status == OperationStatus::Error
    }

    fn begin(&mut self) {
        self.status = OperationStatus::Loading;
        self.error = None;
    }

    fn succeed(&mut self, data: T) {
        self.status = OperationStatus::Success;
        self.data = Some(data);
        self.error = None;
    }

    fn fail(&mut self, error: E) {
        self.status = OperationStatus::Error;
        self.data = None;
        self.error = Some(error);
    }

    /// Leave `Loading` without a result (the call was cancelled)
    fn abandon(&mut self) {
        self.status = if self.data.is_some() {
            OperationStatus::Success
        } else {
            OperationStatus::Idle
        };
    }
}

type BoxedOperation<A, T, E> = Box<dyn Fn(A) -> BoxFuture<'static, Result<T, E>> + Send + Sync>;
type Hook<V> = Box<dyn Fn(&V) + Send + Sync>;

struct Shared<A, T, E> {
    operation: BoxedOperation<A, T, E>,
    state: watch::Sender<OperationState<T, E>>,
    generation: AtomicU64,
    active: AtomicBool,
    on_success: Option<Hook<T>>,
    on_error: Option<Hook<E>>,
}

impl<A, T, E> Shared<A, T, E> {
    fn is_current(&self, generation: u64) -> bool {
        self.active.load(Ordering::SeqCst) && self.generation.load(Ordering::SeqCst) == generation
    }

    fn deactivate(&self) {
        self.state.send_if_modified(|state| {
            self.active.store(false, Ordering::SeqCst);
            self.generation.fetch_add(1, Ordering::SeqCst);
            // Calls in flight can no longer settle, so nothing would leave Loading
            if !state.is_loading() {
                return false;
            }
            state.abandon();
            true
        });
    }
}

impl<A, T, E> Shared<A, T, E>
where
    T: Clone,
    E: Clone,
{
    // Generation bumps and state writes both happen under the watch lock, so a
    // settle can never interleave with a newer begin.

    fn begin(&self) -> u64 {
        let mut generation = 0;
        self.state.send_if_modified(|state| {
            generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            if !self.active.load(Ordering::SeqCst) {
                return false;
            }
            state.begin();
            true
        });
        generation
    }

    fn settle(&self, generation: u64, result: &Result<T, E>) -> bool {
        self.state.send_if_modified(|state| {
            if !self.is_current(generation) {
                return false;
            }
            match result {
                Ok(data) => state.succeed(data.clone()),
                Err(error) => state.fail(error.clone()),
            }
            true
        })
    }

    fn abandon(&self, generation: u64) {
        self.state.send_if_modified(|state| {
            if !self.is_current(generation) || !state.is_loading() {
                return false;
            }
            state.abandon();
            true
        });
    }
}

/// Reverts a call left in `Loading` when its future is dropped early
struct PendingCall<'a, A, T: Clone, E: Clone> {
    shared: &'a Shared<A, T, E>,
    generation: u64,
    settled: bool,
}

impl<A, T: Clone, E: Clone> Drop for PendingCall<'_, A, T, E> {
    fn drop(&mut self) {
        if !self.settled {
            self.shared.abandon(self.generation);
        }
    }
}

/// Builder for [`AsyncOperation`]
pub struct AsyncOperationBuilder<A, T, E> {
    operation: BoxedOperation<A, T, E>,
    immediate: bool,
    on_success: Option<Hook<T>>,
    on_error: Option<Hook<E>>,
}

impl<A, T, E> AsyncOperationBuilder<A, T, E>
where
    A: Send + 'static,
    T: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    /// Run once with default arguments when the operation is activated
    pub fn immediate(mut self, immediate: bool) -> Self {
        self.immediate = immediate;
        self
    }

    /// Called after a success has been applied to the state
    pub fn on_success(mut self, hook: impl Fn(&T) + Send + Sync + 'static) -> Self {
        self.on_success = Some(Box::new(hook));
        self
    }

    /// Called after an error has been applied to the state
    pub fn on_error(mut self, hook: impl Fn(&E) + Send + Sync + 'static) -> Self {
        self.on_error = Some(Box::new(hook));
        self
    }

    pub fn build(self) -> AsyncOperation<A, T, E> {
        let (state, _) = watch::channel(OperationState::default());
        AsyncOperation {
            shared: Arc::new(Shared {
                operation: self.operation,
                state,
                generation: AtomicU64::new(0),
                active: AtomicBool::new(true),
                on_success: self.on_success,
                on_error: self.on_error,
            }),
            immediate: self.immediate,
        }
    }
}

/// Generic observable async operation
///
/// Clones share the same state and generation counter.
pub struct AsyncOperation<A, T, E = ClassifiedError> {
    shared: Arc<Shared<A, T, E>>,
    immediate: bool,
}

impl<A, T, E> Clone for AsyncOperation<A, T, E> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
            immediate: self.immediate,
        }
    }
}

impl<A, T, E> AsyncOperation<A, T, E>
where
    A: Send + 'static,
    T: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    pub fn new<F, Fut>(operation: F) -> Self
    where
        F: Fn(A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        Self::builder(operation).build()
    }

    pub fn builder<F, Fut>(operation: F) -> AsyncOperationBuilder<A, T, E>
    where
        F: Fn(A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        AsyncOperationBuilder {
            operation: Box::new(move |args| operation(args).boxed()),
            immediate: false,
            on_success: None,
            on_error: None,
        }
    }

    /// Run the operation and return its outcome
    ///
    /// The caller always receives the result, including errors. The shared
    /// state and hooks only see it when this is still the latest call.
    pub async fn execute(&self, args: A) -> Result<T, E> {
        let shared = &*self.shared;
        let generation = shared.begin();
        let mut pending = PendingCall {
            shared,
            generation,
            settled: false,
        };

        let result = (shared.operation)(args).await;
        pending.settled = true;

        if shared.settle(generation, &result) {
            match &result {
                Ok(data) => {
                    if let Some(hook) = &shared.on_success {
                        hook(data);
                    }
                }
                Err(error) => {
                    if let Some(hook) = &shared.on_error {
                        hook(error);
                    }
                }
            }
        } else {
            debug!(generation, "Discarding superseded operation result");
        }

        result
    }

    /// Run the operation on a background task
    pub fn start(&self, args: A) -> OperationTask<T, E> {
        let operation = self.clone();
        OperationTask {
            handle: tokio::spawn(async move { operation.execute(args).await }),
        }
    }

    /// Mark the operation active and run it if it was built with `immediate`
    pub fn activate(&self) -> Option<OperationTask<T, E>>
    where
        A: Default,
    {
        self.shared.active.store(true, Ordering::SeqCst);
        self.immediate.then(|| self.start(A::default()))
    }

    pub fn state(&self) -> OperationState<T, E> {
        self.shared.state.borrow().clone()
    }
}

impl<A, T, E> AsyncOperation<A, T, E> {
    /// Stop applying results; calls still in flight are discarded on settle
    /// and a `Loading` state falls back to the last result right away
    pub fn deactivate(&self) {
        self.shared.deactivate();
    }

    pub fn is_active(&self) -> bool {
        self.shared.active.load(Ordering::SeqCst)
    }

    pub fn is_immediate(&self) -> bool {
        self.immediate
    }

    pub fn subscribe(&self) -> watch::Receiver<OperationState<T, E>> {
        self.shared.state.subscribe()
    }
}

/// Handle to an operation running on a background task
pub struct OperationTask<T, E> {
    handle: JoinHandle<Result<T, E>>,
}

impl<T, E> OperationTask<T, E> {
    /// Cancel the call; a `Loading` state falls back to the last result
    pub fn abort(&self) {
        self.handle.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the outcome, `None` if the task was aborted
    pub async fn join(self) -> Option<Result<T, E>> {
        match self.handle.await {
            Ok(result) => Some(result),
            Err(e) if e.is_cancelled() => None,
            Err(e) => std::panic::resume_unwind(e.into_panic()),
        }
    }
}
