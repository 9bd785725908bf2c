//! Retry observation and logging

use std::error::Error;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Observer trait for retry attempt events
///
/// Attempt numbers are 1-indexed.
pub trait RetryObserver: Send + Sync {
    /// Called when an attempt is about to start
    fn on_attempt_start(&self, attempt: u32, max_attempts: u32);

    /// Called when an attempt fails and will be retried after `delay`
    fn on_attempt_failed(&self, attempt: u32, error: &dyn Error, delay: Duration);

    /// Called when the operation succeeds
    fn on_success(&self, attempt: u32, total_duration: Duration);

    /// Called when all retry attempts are exhausted
    fn on_exhausted(&self, attempts: u32, final_error: &dyn Error);

    /// Called when the predicate rejects an error as permanent
    fn on_cancelled(&self, attempt: u32, error: &dyn Error) {
        let _ = (attempt, error);
    }
}

/// Observer that discards every event
///
/// This is the default: retry chatter stays out of the user's terminal.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpObserver;

impl RetryObserver for NoOpObserver {
    fn on_attempt_start(&self, _attempt: u32, _max_attempts: u32) {}

    fn on_attempt_failed(&self, _attempt: u32, _error: &dyn Error, _delay: Duration) {}

    fn on_success(&self, _attempt: u32, _total_duration: Duration) {}

    fn on_exhausted(&self, _attempts: u32, _final_error: &dyn Error) {}
}

/// Observer that logs retry events using the `tracing` crate
///
/// # Log Levels
///
/// - `on_attempt_start`: DEBUG
/// - `on_attempt_failed`: WARN
/// - `on_success`: INFO (if > 1 attempt) or DEBUG (first attempt)
/// - `on_exhausted`: ERROR
/// - `on_cancelled`: WARN
#[derive(Debug, Clone)]
pub struct TracingObserver {
    operation: String,
}

impl TracingObserver {
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
            attempt = attempt,
            max_attempts = max_attempts,
            "starting attempt"
        );
    }

    fn on_attempt_failed(&self, attempt: u32, error: &dyn Error, delay: Duration) {
        tracing::warn!(
            operation = %self.operation,
            attempt = attempt,
            error = %error,
            delay_ms = delay.as_millis() as u64,
            "attempt failed, will retry"
        );
    }

    fn on_success(&self, attempt: u32, total_duration: Duration) {
        if attempt > 1 {
            tracing::info!(
                operation = %self.operation,
                attempt = attempt,
                total_duration_ms = total_duration.as_millis() as u64,
                "succeeded after retry"
            );
        } else {
            tracing::debug!(
                operation = %self.operation,
                duration_ms = total_duration.as_millis() as u64,
                "succeeded on first attempt"
            );
        }
    }

    fn on_exhausted(&self, attempts: u32, final_error: &dyn Error) {
        tracing::error!(
            operation = %self.operation,
            attempts = attempts,
            error = %final_error,
            "all retry attempts exhausted"
        );
    }

    fn on_cancelled(&self, attempt: u32, error: &dyn Error) {
        tracing::warn!(
            operation = %self.operation,
            attempt = attempt,
            error = %error,
            "not retrying permanent failure"
        );
    }
}

/// Observer that counts events, useful in tests
#[derive(Debug, Default)]
pub struct StatsObserver {
    attempt_starts: AtomicU32,
    failures: AtomicU32,
    successes: AtomicU32,
    exhaustions: AtomicU32,
    cancellations: AtomicU32,
}

impl StatsObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attempt_starts(&self) -> u32 {
        self.attempt_starts.load(Ordering::SeqCst)
    }

    pub fn failures(&self) -> u32 {
        self.failures.load(Ordering::SeqCst)
    }

    pub fn successes(&self) -> u32 {
        self.successes.load(Ordering::SeqCst)
    }

    pub fn exhaustions(&self) -> u32 {
        self.exhaustions.load(Ordering::SeqCst)
    }

    pub fn cancellations(&self) -> u32 {
        self.cancellations.load(Ordering::SeqCst)
    }
}

impl RetryObserver for StatsObserver {
    fn on_attempt_start(&self, _attempt: u32, _max_attempts: u32) {
        self.attempt_starts.fetch_add(1, Ordering::SeqCst);
    }

    fn on_attempt_failed(&self, _attempt: u32, _error: &dyn Error, _delay: Duration) {
        self.failures.fetch_add(1, Ordering::SeqCst);
    }

    fn on_success(&self, _attempt: u32, _total_duration: Duration) {
        self.successes.fetch_add(1, Ordering::SeqCst);
    }

    fn on_exhausted(&self, _attempts: u32, _final_error: &dyn Error) {
        self.exhaustions.fetch_add(1, Ordering::SeqCst);
    }

    fn on_cancelled(&self, _attempt: u32, _error: &dyn Error) {
        self.cancellations.fetch_add(1, Ordering::SeqCst);
    }
}

impl<T: RetryObserver + ?Sized> RetryObserver for Arc<T> {
    fn on_attempt_start(&self, attempt: u32, max_attempts: u32) {
        (**self).on_attempt_start(attempt, max_attempts)
    }

    fn on_attempt_failed(&self, attempt: u32, error: &dyn Error, delay: Duration) {
        (**self).on_attempt_failed(attempt, error, delay)
    }

    fn on_success(&self, attempt: u32, total_duration: Duration) {
        (**self).on_success(attempt, total_duration)
    }

    fn on_exhausted(&self, attempts: u32, final_error: &dyn Error) {
        (**self).on_exhausted(attempts, final_error)
    }

    fn on_cancelled(&self, attempt: u32, error: &dyn Error) {
        (**self).on_cancelled(attempt, error)
    }
}

impl<T: RetryObserver + ?Sized> RetryObserver for Box<T> {
    fn on_attempt_start(&self, attempt: u32, max_attempts: u32) {
        (**self).on_attempt_start(attempt, max_attempts)
    }

    fn on_attempt_failed(&self, attempt: u32, error: &dyn Error, delay: Duration) {
        (**self).on_attempt_failed(attempt, error, delay)
    }

    fn on_success(&self, attempt: u32, total_duration: Duration) {
        (**self).on_success(attempt, total_duration)
    }

    fn on_exhausted(&self, attempts: u32, final_error: &dyn Error) {
        (**self).on_exhausted(attempts, final_error)
    }

    fn on_cancelled(&self, attempt: u32, error: &dyn Error) {
        (**self).on_cancelled(attempt, error)
    }
}
