//! Error types for the retry execution engine

use std::error::Error;
use std::fmt;
use std::time::Duration;

/// Errors that can occur during retry execution
///
/// Generic over `E`, the error type of the operation being retried.
#[derive(Debug)]
pub enum RetryError<E> {
    /// Every allowed attempt failed with a retryable error
    Exhausted {
        /// Number of attempts made before giving up
        attempts: u32,
        /// The error from the final attempt
        source: E,
        /// Total duration spent across all attempts
        total_duration: Duration,
    },

    /// The predicate classified the error as permanent
    NonRetryable {
        /// Attempt on which the permanent error occurred
        attempt: u32,
        /// The permanent error
        source: E,
    },

    /// The policy allowed no attempts at all
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
                "{} (gave up after {} attempts over {:.1}s)",
                source,
                attempts,
                total_duration.as_secs_f64()
            ),
            RetryError::NonRetryable { source, .. } => write!(f, "{}", source),
            RetryError::NoAttempts => write!(f, "retry policy allows no attempts"),
        }
    }
}

impl<E: Error + 'static> Error for RetryError<E> {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            RetryError::Exhausted { source, .. } => Some(source),
            RetryError::NonRetryable { source, .. } => Some(source),
            RetryError::NoAttempts => None,
        }
    }
}

impl<E> RetryError<E> {
    /// Get the number of attempts made
    pub fn attempts(&self) -> u32 {
        match self {
            RetryError::Exhausted { attempts, .. } => *attempts,
            RetryError::NonRetryable { attempt, .. } => *attempt,
            RetryError::NoAttempts => 0,
        }
    }

    /// Check if this error indicates all retries were exhausted
    pub fn is_exhausted(&self) -> bool {
        matches!(self, RetryError::Exhausted { .. })
    }

    /// Check if this error is non-retryable
    pub fn is_non_retryable(&self) -> bool {
        matches!(self, RetryError::NonRetryable { .. })
    }

    /// Get a reference to the underlying error
    pub fn source_ref(&self) -> Option<&E> {
        match self {
            RetryError::Exhausted { source, .. } => Some(source),
            RetryError::NonRetryable { source, .. } => Some(source),
            RetryError::NoAttempts => None,
        }
    }

    /// Get the underlying error, consuming this error
    pub fn into_source(self) -> Option<E> {
        match self {
            RetryError::Exhausted { source, .. } => Some(source),
            RetryError::NonRetryable { source, .. } => Some(source),
            RetryError::NoAttempts => None,
        }
    }
}
