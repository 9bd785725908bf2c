//! Retry executor implementation

use super::error::RetryError;
use super::observer::{NoOpObserver, RetryObserver};
use super::strategies::{calculate_delay, AlwaysRetry, RetryPredicate};
use crate::types::RetryPolicy;
use std::error::Error;
use std::fmt;
use std::future::Future;
use std::marker::PhantomData;
use std::time::Instant;

/// Runs an async operation under a `RetryPolicy`
///
/// The predicate and observer are type parameters so the common case
/// (retry everything, observe nothing) costs nothing at runtime.
pub struct RetryExecutor<E, P = AlwaysRetry, O = NoOpObserver> {
    policy: RetryPolicy,
    predicate: P,
    observer: O,
    jitter: bool,
    _phantom: PhantomData<fn() -> E>,
}

impl<E> RetryExecutor<E, AlwaysRetry, NoOpObserver> {
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            policy,
            predicate: AlwaysRetry,
            observer: NoOpObserver,
            jitter: true,
            _phantom: PhantomData,
        }
    }
}

impl<E, P, O> RetryExecutor<E, P, O> {
    /// Set the retry predicate
    pub fn with_predicate<P2>(self, predicate: P2) -> RetryExecutor<E, P2, O> {
        RetryExecutor {
            policy: self.policy,
            predicate,
            observer: self.observer,
            jitter: self.jitter,
            _phantom: PhantomData,
        }
    }

    /// Set the observer
    pub fn with_observer<O2>(self, observer: O2) -> RetryExecutor<E, P, O2> {
        RetryExecutor {
            policy: self.policy,
            predicate: self.predicate,
            observer,
            jitter: self.jitter,
            _phantom: PhantomData,
        }
    }

    /// Enable or disable jitter
    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }
}

impl<E, P, O> RetryExecutor<E, P, O>
where
    E: fmt::Display,
    P: RetryPredicate<E>,
    O: RetryObserver,
{
    /// Execute an operation with retry logic
    ///
    /// `op` is invoked once per attempt and must produce a fresh future
    /// each time.
    pub async fn execute<F, Fut, T>(&self, mut op: F) -> Result<T, RetryError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let start = Instant::now();
        let max_attempts = self.policy.max_attempts;

        for attempt in 1..=max_attempts {
            self.observer.on_attempt_start(attempt, max_attempts);

            let err = match op().await {
                Ok(value) => {
                    self.observer.on_success(attempt, start.elapsed());
                    return Ok(value);
                }
                Err(err) => err,
            };

            let display_err = DisplayError(err.to_string());

            if !self.predicate.should_retry(&err) {
                self.observer.on_cancelled(attempt, &display_err);
                return Err(RetryError::NonRetryable {
                    attempt,
                    source: err,
                });
            }

            if attempt >= max_attempts {
                self.observer.on_exhausted(attempt, &display_err);
                return Err(RetryError::Exhausted {
                    attempts: attempt,
                    source: err,
                    total_duration: start.elapsed(),
                });
            }

            let delay = calculate_delay(&self.policy, attempt, self.jitter);
            self.observer.on_attempt_failed(attempt, &display_err, delay);

            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }

        Err(RetryError::NoAttempts)
    }
}

/// Adapts a `Display` error to `dyn Error` for observer callbacks
#[derive(Debug)]
struct DisplayError(String);

impl fmt::Display for DisplayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Error for DisplayError {}
