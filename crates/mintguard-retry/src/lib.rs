//! Bounded retry executor for calls to a remote authority.
//!
//! [`RetryExecutor::run`] invokes an async operation up to `max_attempts`
//! times. Between attempts it sleeps for a delay that starts at
//! `initial_delay` and grows by `backoff_multiplier`, capped at `max_delay`.
//! Errors rejected by the retry predicate are returned immediately.
//!
//! # Features
//!
//! - **IntervalFunction abstraction**: pluggable backoff strategies
//!   - Fixed interval
//!   - Exponential backoff with configurable multiplier and cap
//!   - Exponential random backoff with randomization factor
//!   - Custom function-based backoff
//! - **Classification-aware predicate**: [`RetryConfigBuilder::transient_only`]
//!   retries only errors classified as transient
//! - **Event system**: observability through [`RetryEvent`]s
//! - **Statistics**: cumulative [`RetryStats`] kept in atomics
//!
//! # Examples
//!
//! ```
//! use mintguard_core::RemoteError;
//! use mintguard_retry::{RetryConfig, RetryExecutor};
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), RemoteError> {
//! let retry = RetryExecutor::new(
//!     RetryConfig::<RemoteError>::builder()
//!         .name("authority")
//!         .max_attempts(5)
//!         .initial_delay(Duration::from_millis(100))
//!         .transient_only()
//!         .on_retry(|attempt, delay| {
//!             println!("attempt {} failed, retrying in {:?}", attempt, delay);
//!         })
//!         .build(),
//! );
//!
//! let id = retry
//!     .run(|| async { Ok::<_, RemoteError>("01-A-CHI-1234-P-2509-3-X") })
//!     .await?;
//! # let _ = id;
//! # Ok(())
//! # }
//! ```

mod backoff;
mod config;
mod events;
mod executor;
mod stats;

pub use backoff::{
    ExponentialBackoff, ExponentialRandomBackoff, FixedInterval, FnInterval, IntervalFunction,
};
pub use config::{RetryConfig, RetryConfigBuilder, RetryPredicate};
pub use events::RetryEvent;
pub use executor::RetryExecutor;
pub use stats::RetryStats;
