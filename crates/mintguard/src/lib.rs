//! Fault tolerance for calls to a single remote authority.
//!
//! `mintguard` composes four components into one call path:
//!
//! - **Circuit breaker** ([`circuitbreaker`]): stops calling a dependency
//!   that keeps failing, then probes it again after a cool-down
//! - **Retry** ([`retry`]): bounded attempts with exponential backoff for
//!   transient failures
//! - **Cache** ([`cache`]): TTL + LRU cache for validation results
//! - **Connection** ([`connection`]): background health probing with
//!   automatic reconnection
//!
//! ```text
//! caller -> ResilientCallFacade -> CircuitBreaker -> RetryExecutor -> remote operation
//!                 |                                                        ^
//!                 +-- optional gate: ConnectionManager (background probes) |
//!            ResultCache consulted before, filled after ---------------------+
//! ```
//!
//! # Example
//!
//! ```rust
//! use mintguard::{CallError, ResilienceRuntime, ResilienceSettings};
//! use mintguard_core::RemoteError;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let mut settings = ResilienceSettings::default();
//! settings.name = "authority".to_string();
//! settings.circuit_breaker.failure_threshold = 3;
//!
//! let runtime: ResilienceRuntime<RemoteError> = ResilienceRuntime::new(settings).unwrap();
//!
//! let result = runtime
//!     .facade()
//!     .call(|| async { Err::<bool, _>(RemoteError::new("invalid entity type")) })
//!     .await;
//!
//! // Permanent errors are surfaced after one attempt.
//! assert!(matches!(result, Err(CallError::Operation(_))));
//! assert_eq!(runtime.facade().retry().stats().attempts, 1);
//! # }
//! ```
//!
//! # Tower
//!
//! [`ResilientLayer`] wraps any `tower::Service` whose requests are `Clone`
//! so that each request goes through the facade.
//!
//! # Feature Flags
//!
//! - `tracing`: structured logs from every component
//! - `metrics`: counters and gauges from every component (see [`observability`])
//! - `serde`: `Deserialize` for [`ResilienceSettings`], `Serialize` for every
//!   status and statistics struct
//! - `full`: all of the above

mod error;
mod facade;
mod layer;
mod runtime;
mod settings;

pub mod observability;

pub use error::CallError;
pub use facade::ResilientCallFacade;
pub use layer::{ResilientLayer, ResilientService};
pub use runtime::{ConnectionStatus, ResilienceRuntime, RuntimeStatus};
pub use settings::{
    BreakerSettings, CacheSettings, ConnectionSettings, ResilienceSettings, RetrySettings,
    SettingsError,
};

pub use mintguard_cache as cache;
pub use mintguard_circuitbreaker as circuitbreaker;
pub use mintguard_connection as connection;
pub use mintguard_core as core;
pub use mintguard_retry as retry;
