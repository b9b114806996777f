//! Error classification
//!
//! Every way a request can fail is mapped to exactly one `ClassifiedError`.
//! The mapping functions are pure; they never log or retry.

use metalyzr_core::retry::Retryable;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// HTTP statuses that describe a caller mistake; retrying cannot fix them
pub const NON_RETRYABLE_STATUSES: [u16; 4] = [400, 401, 403, 404];

/// Failure category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Connection-level failure (DNS, refused, reset)
    #[serde(rename = "NetworkError")]
    Network,
    /// The attempt exceeded its deadline
    #[serde(rename = "TimeoutError")]
    Timeout,
    /// The server answered with a non-2xx status
    #[serde(rename = "HttpError")]
    Http,
    /// A successful response body was not the expected format
    #[serde(rename = "ParseError")]
    Parse,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Network => "NetworkError",
            ErrorKind::Timeout => "TimeoutError",
            ErrorKind::Http => "HttpError",
            ErrorKind::Parse => "ParseError",
        };
        f.write_str(name)
    }
}

/// A request failure normalized for display and retry decisions
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{message}")]
#[serde(rename_all = "camelCase")]
pub struct ClassifiedError {
    message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    status_code: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    code: Option<String>,
    kind: ErrorKind,
}

impl ClassifiedError {
    pub fn network(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status_code: None,
            code: None,
            kind: ErrorKind::Network,
        }
    }

    pub fn timeout(after: Duration) -> Self {
        Self {
            message: format!("Request timed out after {}ms", after.as_millis()),
            status_code: None,
            code: None,
            kind: ErrorKind::Timeout,
        }
    }

    pub fn http(status: u16, message: impl Into<String>, code: Option<String>) -> Self {
        Self {
            message: message.into(),
            status_code: Some(status),
            code,
            kind: ErrorKind::Http,
        }
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status_code: None,
            code: None,
            kind: ErrorKind::Parse,
        }
    }

    /// Classify a completed response with a non-2xx status
    ///
    /// The body is parsed best-effort: `message` (or FastAPI's `detail`) and
    /// `code` are picked up when present, otherwise the message is `HTTP <status>`.
    pub fn from_response(status: u16, body: &[u8]) -> Self {
        let parsed: Option<Value> = serde_json::from_slice(body).ok();
        let field = |name: &str| -> Option<String> {
            match parsed.as_ref()?.get(name)? {
                Value::String(s) if !s.is_empty() => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            }
        };

        let message = field("message")
            .or_else(|| field("detail"))
            .unwrap_or_else(|| format!("HTTP {}", status));

        Self::http(status, message, field("code"))
    }

    /// Classify a transport-level failure raised by the HTTP client
    pub fn from_transport(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            return Self {
                message: err.to_string(),
                status_code: None,
                code: None,
                kind: ErrorKind::Timeout,
            };
        }
        if err.is_decode() {
            return Self::parse(err.to_string());
        }
        Self::network(transport_message(err))
    }

    /// Classify a success body that failed to deserialize
    pub fn from_parse(err: serde_json::Error) -> Self {
        Self::parse(format!("Invalid response body: {}", err))
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn status_code(&self) -> Option<u16> {
        self.status_code
    }

    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn is_timeout(&self) -> bool {
        self.kind == ErrorKind::Timeout
    }
}

impl Retryable for ClassifiedError {
    /// Network, timeout and most HTTP failures are transient; 400/401/403/404
    /// and parse failures are terminal.
    fn is_retryable(&self) -> bool {
        match self.kind {
            ErrorKind::Network | ErrorKind::Timeout => true,
            ErrorKind::Http => !self
                .status_code
                .is_some_and(|status| NON_RETRYABLE_STATUSES.contains(&status)),
            ErrorKind::Parse => false,
        }
    }
}

/// Flatten the reqwest error chain; the top-level message alone is often just
/// "error sending request".
fn transport_message(err: &reqwest::Error) -> String {
    let mut message = err.to_string();
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
