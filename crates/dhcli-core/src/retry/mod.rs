//! Retry execution engine with policy-based configuration
//!
//! Wraps a fallible async operation and re-runs it according to a
//! `RetryPolicy`, waiting an increasing delay between attempts. A
//! `RetryPredicate` decides which failures are transient, and a
//! `RetryObserver` receives one callback per attempt.
//!
//! # Example
//!
//! ```rust,no_run
//! use dhcli_core::retry::{RetryError, RetryExecutor};
//! use dhcli_core::types::RetryPolicy;
//!
//! async fn example() -> Result<String, RetryError<std::io::Error>> {
//!     RetryExecutor::new(RetryPolicy::default())
//!         .execute(|| async { Ok("fetched".to_string()) })
//!         .await
//! }
//! ```

mod error;
mod executor;
mod observer;
mod strategies;

pub use error::RetryError;
pub use executor::RetryExecutor;
pub use observer::{NoOpObserver, RetryObserver, StatsObserver, TracingObserver};
pub use strategies::{
    calculate_delay, AlwaysRetry, HttpFailure, RetryPredicate, TransientHttpPredicate,
};
