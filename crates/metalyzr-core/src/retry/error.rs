//! Error types for the retry engine

use std::error::Error;
use std::fmt;
use std::time::Duration;

/// Why a retry loop stopped without a successful result
///
/// Generic over `E`, the error type of the operation being retried.
#[derive(Debug)]
pub enum RetryError<E> {
    /// Every allowed attempt failed with a retryable error
    Exhausted {
        /// Number of attempts made
        attempts: u32,
        /// The error from the final attempt
        source: E,
        /// Wall time spent across all attempts and delays
        total_duration: Duration,
    },

    /// An attempt failed with an error the predicate refused to retry
    Rejected {
        /// The attempt that produced the error (1-indexed)
        attempt: u32,
        /// The terminal error
        source: E,
    },

    /// The policy allowed zero attempts
    NoAttempts,
}

impl<E: fmt::Display> fmt::Display for RetryError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RetryError::Exhausted {
                attempts,
                source,
                total_duration,
            } => write!(
                f,
                "gave up after {} attempts over {:.2}s: {}",
                attempts,
                total_duration.as_secs_f64(),
                source
            ),
            RetryError::Rejected { attempt, source } => {
                write!(f, "attempt {} failed with a terminal error: {}", attempt, source)
            }
            RetryError::NoAttempts => write!(f, "retry policy allows no attempts"),
        }
    }
}

impl<E: Error + 'static> Error for RetryError<E> {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.source_ref().map(|e| e as &(dyn Error + 'static))
    }
}

impl<E> RetryError<E> {
    /// Number of attempts made before giving up
    pub fn attempts(&self) -> u32 {
        match self {
            RetryError::Exhausted { attempts, .. } => *attempts,
            RetryError::Rejected { attempt, .. } => *attempt,
            RetryError::NoAttempts => 0,
        }
    }

    /// All attempts were used up
    pub fn is_exhausted(&self) -> bool {
        matches!(self, RetryError::Exhausted { .. })
    }

    /// The loop stopped early on a non-retryable error
    pub fn is_rejected(&self) -> bool {
        matches!(self, RetryError::Rejected { .. })
    }

    /// Take the last operation error, if any attempt ran
    pub fn into_source(self) -> Option<E> {
        match self {
            RetryError::Exhausted { source, .. } | RetryError::Rejected { source, .. } => {
                Some(source)
            }
            RetryError::NoAttempts => None,
        }
    }

    /// Borrow the last operation error, if any attempt ran
    pub fn source_ref(&self) -> Option<&E> {
        match self {
            RetryError::Exhausted { source, .. } | RetryError::Rejected { source, .. } => {
                Some(source)
            }
            RetryError::NoAttempts => None,
        }
    }
}
