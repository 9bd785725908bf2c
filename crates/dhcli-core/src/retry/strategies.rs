//! Retry delay strategies and predicates

use crate::types::{RetryPolicy, RetryStrategy};
use rand::Rng;
use std::time::Duration;

/// Calculate the delay before the next retry attempt
///
/// `attempt` is the 1-indexed attempt that just failed. With `jitter`,
/// up to 25% of the capped delay is added at random.
///
/// # Example
///
/// ```rust
/// use dhcli_core::retry::calculate_delay;
/// use dhcli_core::types::{RetryPolicy, RetryStrategy};
///
/// let policy = RetryPolicy {
///     max_attempts: 10,
///     strategy: RetryStrategy::ExponentialBackoff,
///     backoff_multiplier: 2.0,
///     initial_delay_ms: 1000,
///     max_delay_ms: 30000,
/// };
///
/// assert_eq!(calculate_delay(&policy, 1, false).as_millis(), 1000);
/// assert_eq!(calculate_delay(&policy, 2, false).as_millis(), 2000);
/// ```
pub fn calculate_delay(policy: &RetryPolicy, attempt: u32, jitter: bool) -> Duration {
    let attempt_index = attempt.saturating_sub(1);

    let base_delay_ms = match policy.strategy {
        RetryStrategy::None => 0,

        RetryStrategy::FixedDelay => policy.initial_delay_ms,

        RetryStrategy::ExponentialBackoff => {
            let multiplier = policy.backoff_multiplier.powf(attempt_index as f64);
            (policy.initial_delay_ms as f64 * multiplier) as u64
        }

        RetryStrategy::LinearBackoff => policy
            .initial_delay_ms
            .saturating_mul(attempt_index as u64 + 1),
    };

    let capped_delay_ms = base_delay_ms.min(policy.max_delay_ms);

    let final_delay_ms = if jitter && capped_delay_ms > 0 {
        let jitter_range = capped_delay_ms / 4;
        capped_delay_ms.saturating_add(rand::rng().random_range(0..=jitter_range))
    } else {
        capped_delay_ms
    };

    Duration::from_millis(final_delay_ms)
}

/// Decides whether a failed attempt is worth repeating
pub trait RetryPredicate<E: ?Sized>: Send + Sync {
    fn should_retry(&self, error: &E) -> bool;
}

/// A predicate that treats every error as retryable
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysRetry;

impl<E: ?Sized> RetryPredicate<E> for AlwaysRetry {
    fn should_retry(&self, _error: &E) -> bool {
        true
    }
}

/// Errors produced by a single HTTP request attempt
pub trait HttpFailure {
    /// The response status, or `None` when no response was received
    fn status_code(&self) -> Option<u16>;
}

/// Retries transport failures and transient HTTP statuses
///
/// No status (connection refused, reset, timeout) is retried. Of the
/// statuses, 408, 425, 429 and every 5xx except 501 are retried. Any
/// other status is final.
#[derive(Debug, Clone, Copy, Default)]
pub struct TransientHttpPredicate;

impl TransientHttpPredicate {
    pub fn is_transient_status(code: u16) -> bool {
        matches!(code, 408 | 425 | 429) || ((500..600).contains(&code) && code != 501)
    }
}

impl<E: HttpFailure> RetryPredicate<E> for TransientHttpPredicate {
    fn should_retry(&self, error: &E) -> bool {
        error
            .status_code()
            .map(Self::is_transient_status)
            .unwrap_or(true)
    }
}
