//! Retrying request executor
//!
//! Turns a `RequestDescriptor` into an HTTP exchange: every attempt is bounded
//! by a timeout, failures are classified, and retryable failures are retried
//! with exponential backoff until the budget runs out.

use crate::envelope::Envelope;
use crate::error::ClassifiedError;
use crate::request::RequestDescriptor;
use bytes::Bytes;
use metalyzr_core::retry::{
    ObserverSet, RetryExecutorBuilder, RetryIfRetryable, RetryObserver, TracingObserver,
};
use metalyzr_core::types::{ClientConfig, RetryPolicy};
use metalyzr_core::{Error, Result as CoreResult};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use url::Url;

const USER_AGENT: &str = concat!("metalyzr/", env!("CARGO_PKG_VERSION"));

/// Builder for [`RequestExecutor`]
pub struct RequestExecutorBuilder {
    base_url: String,
    policy: RetryPolicy,
    timeout: Duration,
    observer: Option<Arc<dyn RetryObserver>>,
    client: Option<reqwest::Client>,
}

impl RequestExecutorBuilder {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            policy: RetryPolicy::default(),
            timeout: Duration::from_millis(10_000),
            observer: None,
            client: None,
        }
    }

    /// Default retry policy for requests that do not set their own
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Default per-attempt timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Extra observer notified of every attempt, next to the tracing one
    pub fn with_observer(mut self, observer: Arc<dyn RetryObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = Some(client);
        self
    }

    pub fn build(self) -> CoreResult<RequestExecutor> {
        let base_url = self.base_url.trim_end_matches('/').to_string();
        Url::parse(&base_url).map_err(|e| {
            Error::invalid_config(format!("Invalid API base URL '{}': {}", base_url, e))
        })?;

        let client = match self.client {
            Some(client) => client,
            None => reqwest::Client::builder()
                .user_agent(USER_AGENT)
                .build()
                .map_err(|e| Error::invalid_config(format!("Failed to create HTTP client: {}", e)))?,
        };

        Ok(RequestExecutor {
            client,
            base_url,
            policy: self.policy,
            timeout: self.timeout,
            observer: self.observer,
        })
    }
}

/// Executes requests against one API base URL
pub struct RequestExecutor {
    client: reqwest::Client,
    base_url: String,
    policy: RetryPolicy,
    timeout: Duration,
    observer: Option<Arc<dyn RetryObserver>>,
}

impl RequestExecutor {
    pub fn builder(base_url: impl Into<String>) -> RequestExecutorBuilder {
        RequestExecutorBuilder::new(base_url)
    }

    /// Executor using the API and retry settings of a loaded configuration
    pub fn from_config(config: &ClientConfig) -> CoreResult<Self> {
        Self::builder(config.api.base_url.clone())
            .with_policy(config.retry.clone())
            .with_timeout(config.api.timeout())
            .build()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn default_policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn default_timeout(&self) -> Duration {
        self.timeout
    }

    /// Execute and deserialize the body as `T`
    ///
    /// An empty success body deserializes from `null`, so `T = ()` or
    /// `Option<_>` accept 204-style responses.
    pub async fn execute<T: DeserializeOwned>(
        &self,
        request: &RequestDescriptor,
    ) -> Result<T, ClassifiedError> {
        let body = self.fetch(request).await?;
        decode(&body)
    }

    /// Execute and unwrap an optional `{"data": ...}` envelope
    pub async fn execute_data<T: DeserializeOwned>(
        &self,
        request: &RequestDescriptor,
    ) -> Result<T, ClassifiedError> {
        let envelope: Envelope<T> = self.execute(request).await?;
        Ok(envelope.into_inner())
    }

    /// Execute and return the raw success body
    pub async fn fetch(&self, request: &RequestDescriptor) -> Result<Bytes, ClassifiedError> {
        let url = self.url_for(request)?;
        let headers = merged_headers(request);
        let body = request
            .body()
            .map(serde_json::to_vec)
            .transpose()
            .map_err(|e| ClassifiedError::parse(format!("Invalid request body: {}", e)))?
            .map(Bytes::from);

        let policy = request.effective_policy(&self.policy);
        let timeout = request.timeout_override().unwrap_or(self.timeout);

        let mut observers = ObserverSet::new().with(Arc::new(TracingObserver::new(request.label())));
        if let Some(observer) = &self.observer {
            observers = observers.with(Arc::clone(observer));
        }

        let retry = RetryExecutorBuilder::new()
            .with_policy(policy)
            .with_predicate(RetryIfRetryable)
            .with_observer(observers)
            .build();

        retry
            .execute(|| self.attempt(request, &url, &headers, body.clone(), timeout))
            .await
            .map_err(|e| {
                e.into_source()
                    .unwrap_or_else(|| ClassifiedError::network("No request attempt was made"))
            })
    }

    /// One bounded attempt; dropping the in-flight future on timeout cancels it
    async fn attempt(
        &self,
        request: &RequestDescriptor,
        url: &Url,
        headers: &HeaderMap,
        body: Option<Bytes>,
        timeout: Duration,
    ) -> Result<Bytes, ClassifiedError> {
        let mut builder = self
            .client
            .request(request.method().clone(), url.clone())
            .headers(headers.clone());
        if let Some(body) = body {
            builder = builder.body(body);
        }

        let exchange = async {
            let response = builder
                .send()
                .await
                .map_err(|e| ClassifiedError::from_transport(&e))?;
            let status = response.status();

            if !status.is_success() {
                let body = response.bytes().await.unwrap_or_default();
                debug!("{} returned {}", request.label(), status);
                return Err(ClassifiedError::from_response(status.as_u16(), &body));
            }

            response
                .bytes()
                .await
                .map_err(|e| ClassifiedError::from_transport(&e))
        };

        match tokio::time::timeout(timeout, exchange).await {
            Ok(result) => result,
            Err(_) => Err(ClassifiedError::timeout(timeout)),
        }
    }

    fn url_for(&self, request: &RequestDescriptor) -> Result<Url, ClassifiedError> {
        let path = request.path();
        let joined = if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        };

        let mut url = Url::parse(&joined)
            .map_err(|e| ClassifiedError::network(format!("Invalid request URL '{}': {}", joined, e)))?;
        if !request.query_pairs().is_empty() {
            url.query_pairs_mut().extend_pairs(request.query_pairs());
        }
        Ok(url)
    }
}

/// `Content-Type: application/json` first, caller headers on top
fn merged_headers(request: &RequestDescriptor) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.extend(request.headers().clone());
    headers
}

pub(crate) fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, ClassifiedError> {
    let body: &[u8] = if body.iter().all(u8::is_ascii_whitespace) {
        b"null"
    } else {
        body
    };
    serde_json::from_slice(body).map_err(ClassifiedError::from_parse)
}
