//! Typed resources
//!
//! A `Resource<T>` binds one endpoint to an `AsyncOperation` running through
//! the `RequestExecutor`. Activation optionally fetches immediately and starts
//! a polling task; deactivation (or drop) stops polling and discards results
//! still in flight.

use crate::error::ClassifiedError;
use crate::executor::RequestExecutor;
use crate::operation::{AsyncOperation, OperationState};
use crate::request::RequestDescriptor;
use serde::de::DeserializeOwned;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::debug;

type SuccessHook<T> = Box<dyn Fn(&T) + Send + Sync>;
type ErrorHook = Box<dyn Fn(&ClassifiedError) + Send + Sync>;

/// Resource behaviour
pub struct ResourceOptions<T> {
    auto_fetch: bool,
    refresh_interval: Option<Duration>,
    on_success: Option<SuccessHook<T>>,
    on_error: Option<ErrorHook>,
}

impl<T> Default for ResourceOptions<T> {
    fn default() -> Self {
        Self {
            auto_fetch: true,
            refresh_interval: None,
            on_success: None,
            on_error: None,
        }
    }
}

impl<T> ResourceOptions<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch as soon as the resource is activated (default: true)
    pub fn auto_fetch(mut self, auto_fetch: bool) -> Self {
        self.auto_fetch = auto_fetch;
        self
    }

    /// Refetch periodically while active
    pub fn refresh_every(mut self, interval: Duration) -> Self {
        self.refresh_interval = Some(interval);
        self
    }

    pub fn refresh_interval(mut self, interval: Option<Duration>) -> Self {
        self.refresh_interval = interval;
        self
    }

    pub fn on_success(mut self, hook: impl Fn(&T) + Send + Sync + 'static) -> Self {
        self.on_success = Some(Box::new(hook));
        self
    }

    pub fn on_error(mut self, hook: impl Fn(&ClassifiedError) + Send + Sync + 'static) -> Self {
        self.on_error = Some(Box::new(hook));
        self
    }
}

/// What a view renders for a resource
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceView<T> {
    pub data: Option<T>,
    pub loading: bool,
    pub error: Option<ClassifiedError>,
    pub is_error: bool,
    pub is_success: bool,
}

impl<T: Clone> From<&OperationState<T>> for ResourceView<T> {
    fn from(state: &OperationState<T>) -> Self {
        Self {
            data: state.data().cloned(),
            loading: state.is_loading(),
            error: state.error().cloned(),
            is_error: state.is_error(),
            is_success: state.is_success(),
        }
    }
}

pub struct Resource<T> {
    operation: AsyncOperation<(), T>,
    request: RequestDescriptor,
    refresh_interval: Option<Duration>,
    poller: Mutex<Option<JoinHandle<()>>>,
}

impl<T> Resource<T>
where
    T: DeserializeOwned + Clone + Send + Sync + 'static,
{
    pub fn new(
        executor: Arc<RequestExecutor>,
        request: RequestDescriptor,
        options: ResourceOptions<T>,
    ) -> Self {
        let descriptor = request.clone();
        let mut builder = AsyncOperation::builder(move |()| {
            let executor = Arc::clone(&executor);
            let request = descriptor.clone();
            async move { executor.execute_data::<T>(&request).await }
        })
        .immediate(options.auto_fetch);

        if let Some(hook) = options.on_success {
            builder = builder.on_success(hook);
        }
        if let Some(hook) = options.on_error {
            builder = builder.on_error(hook);
        }

        Self {
            operation: builder.build(),
            request,
            refresh_interval: options.refresh_interval,
            poller: Mutex::new(None),
        }
    }

    /// Fetch now; the caller gets the outcome, the state gets it if still current
    pub async fn refetch(&self) -> Result<T, ClassifiedError> {
        self.operation.execute(()).await
    }

    /// Start the resource: initial fetch when auto-fetching, then polling
    ///
    /// Must be called from within a Tokio runtime.
    pub fn activate(&self) {
        // The initial fetch runs detached; its result lands in the state
        drop(self.operation.activate());

        if let Some(interval) = self.refresh_interval {
            let operation = self.operation.clone();
            let label = self.request.label();
            let handle = tokio::spawn(async move {
                let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
                loop {
                    ticker.tick().await;
                    if let Err(e) = operation.execute(()).await {
                        debug!("Scheduled refresh of {} failed: {}", label, e);
                    }
                }
            });
            self.replace_poller(Some(handle));
        }
    }

    /// Stop polling and ignore any result still in flight
    ///
    /// A refetch awaited by a caller keeps running to completion. A scheduled
    /// poll that is mid-request is cancelled along with the polling task.
    /// Either way a `Loading` state falls back to the last result.
    pub fn deactivate(&self) {
        self.replace_poller(None);
        self.operation.deactivate();
    }

    pub fn state(&self) -> OperationState<T> {
        self.operation.state()
    }

    pub fn view(&self) -> ResourceView<T> {
        ResourceView::from(&self.operation.state())
    }

    pub fn subscribe(&self) -> watch::Receiver<OperationState<T>> {
        self.operation.subscribe()
    }

    pub fn request(&self) -> &RequestDescriptor {
        &self.request
    }

    pub fn is_polling(&self) -> bool {
        self.poller
            .lock()
            .map(|poller| poller.as_ref().is_some_and(|handle| !handle.is_finished()))
            .unwrap_or(false)
    }

    fn replace_poller(&self, handle: Option<JoinHandle<()>>) {
        let mut poller = match self.poller.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(previous) = std::mem::replace(&mut *poller, handle) {
            previous.abort();
        }
    }
}

impl<T> Drop for Resource<T> {
    fn drop(&mut self) {
        let poller = match self.poller.get_mut() {
            Ok(poller) => poller,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(handle) = poller.take() {
            handle.abort();
        }
        self.operation.deactivate();
    }
}
