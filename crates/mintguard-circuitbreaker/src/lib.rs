//! Circuit breaker guarding calls to a flaky remote dependency.
//!
//! A circuit breaker prevents cascading failures by counting failures in a
//! rolling time window and temporarily rejecting calls once too many occur.
//!
//! ## States
//! - **Closed**: Normal operation, all calls pass through
//! - **Open**: Circuit is tripped, calls are rejected immediately with the
//!   remaining wait
//! - **Half-Open**: Entered lazily by the first call after the reset timeout;
//!   enough successes close the circuit, any failure reopens it
//!
//! ## Usage
//!
//! ```rust
//! use mintguard_circuitbreaker::{CircuitBreaker, CircuitBreakerConfig, CircuitBreakerError};
//! use std::time::Duration;
//!
//! # async fn example() {
//! let breaker = CircuitBreaker::new(
//!     CircuitBreakerConfig::builder()
//!         .name("authority")
//!         .failure_threshold(3)
//!         .monitor_window(Duration::from_secs(10))
//!         .reset_timeout(Duration::from_secs(30))
//!         .on_state_transition(|from, to| println!("circuit {} -> {}", from, to))
//!         .build(),
//! );
//!
//! match breaker.execute(|| async { Ok::<_, std::io::Error>("minted") }).await {
//!     Ok(id) => println!("got {}", id),
//!     Err(CircuitBreakerError::OpenCircuit { retry_after }) => {
//!         eprintln!("dependency unavailable, retry in {:?}", retry_after);
//!     }
//!     Err(CircuitBreakerError::Inner(e)) => eprintln!("call failed: {}", e),
//! }
//! # }
//! ```
//!
//! ## State Inspection and Observability
//!
//! ```rust
//! use mintguard_circuitbreaker::{CircuitBreaker, CircuitState};
//!
//! # async fn example() {
//! let breaker = CircuitBreaker::default();
//!
//! // Lock-free, usable from sync code
//! match breaker.state_sync() {
//!     CircuitState::Closed => println!("healthy"),
//!     CircuitState::Open => println!("rejecting calls"),
//!     CircuitState::HalfOpen => println!("probing"),
//! }
//!
//! let metrics = breaker.metrics().await;
//! println!("{} failures in window", metrics.failure_count);
//! println!("{:?}", breaker.stats());
//! # }
//! ```
//!
//! ## Feature Flags
//! - `metrics`: enables metrics collection using the `metrics` crate
//! - `tracing`: enables logging using the `tracing` crate
//! - `serde`: enables `Serialize` for `CircuitState`, `CircuitMetrics` and `BreakerStats`

use crate::circuit::Circuit;
use crate::stats::StatsCounters;
#[cfg(feature = "metrics")]
use metrics::{counter, describe_counter, describe_gauge};
use std::future::Future;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
#[cfg(feature = "metrics")]
use std::sync::Once;
use tokio::sync::Mutex;
#[cfg(feature = "tracing")]
use tracing::debug;

pub use circuit::{CircuitMetrics, CircuitState};
pub use config::{CircuitBreakerConfig, CircuitBreakerConfigBuilder};
pub use error::CircuitBreakerError;
pub use events::CircuitBreakerEvent;
pub use stats::BreakerStats;

mod circuit;
mod config;
mod error;
mod events;
mod stats;

#[cfg(feature = "metrics")]
static METRICS_INIT: Once = Once::new();

/// A failure-counting circuit breaker.
///
/// Cloning is cheap; clones share state, so one breaker can be handed to
/// every caller of the same dependency.
pub struct CircuitBreaker {
    circuit: Arc<Mutex<Circuit>>,
    state_atomic: Arc<AtomicU8>,
    stats: Arc<StatsCounters>,
    config: Arc<CircuitBreakerConfig>,
}

impl CircuitBreaker {
    /// Creates a breaker in the closed state.
    pub fn new(config: CircuitBreakerConfig) -> Self {
        #[cfg(feature = "metrics")]
        {
            METRICS_INIT.call_once(|| {
                describe_counter!(
                    "circuitbreaker_calls_total",
                    "Total number of calls through the circuit breaker"
                );
                describe_counter!(
                    "circuitbreaker_transitions_total",
                    "Total number of circuit breaker state transitions"
                );
                describe_gauge!(
                    "circuitbreaker_state",
                    "Current state of the circuit breaker (0 closed, 1 open, 2 half-open)"
                );
            });
        }

        let state_atomic = Arc::new(AtomicU8::new(CircuitState::Closed as u8));
        let stats = Arc::new(StatsCounters::default());
        Self {
            circuit: Arc::new(Mutex::new(Circuit::new(
                Arc::clone(&state_atomic),
                Arc::clone(&stats),
            ))),
            state_atomic,
            stats,
            config: Arc::new(config),
        }
    }

    /// Runs `operation` if the circuit permits it and records the outcome.
    ///
    /// Returns [`CircuitBreakerError::OpenCircuit`] without invoking
    /// `operation` while the circuit is open, or while half-open with every
    /// trial slot taken. The lock is released while the operation runs. If the
    /// returned future is dropped before the operation completes, nothing is
    /// recorded and any trial slot is freed.
    pub async fn execute<T, E, F, Fut>(&self, operation: F) -> Result<T, CircuitBreakerError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let config = &self.config;
        self.stats.call();

        let permitted = {
            let mut circuit = self.circuit.lock().await;
            circuit.try_acquire(config)
        };

        let trial = match permitted {
            Ok(trial) => trial,
            Err(retry_after) => {
                self.stats.rejection();

                #[cfg(feature = "tracing")]
                debug!(breaker = %config.name, ?retry_after, "circuit breaker rejected call");

                #[cfg(feature = "metrics")]
                counter!("circuitbreaker_calls_total", "circuitbreaker" => config.name.clone(), "outcome" => "rejected").increment(1);

                return Err(CircuitBreakerError::OpenCircuit { retry_after });
            }
        };

        #[cfg(feature = "tracing")]
        debug!(breaker = %config.name, "circuit breaker permitted call");

        let result = operation().await;

        let mut circuit = self.circuit.lock().await;
        let outcome = match result {
            Ok(value) => {
                self.stats.success();
                circuit.record_success(config);

                #[cfg(feature = "metrics")]
                counter!("circuitbreaker_calls_total", "circuitbreaker" => config.name.clone(), "outcome" => "success").increment(1);

                Ok(value)
            }
            Err(error) => {
                self.stats.failure();
                circuit.record_failure(config);

                #[cfg(feature = "metrics")]
                counter!("circuitbreaker_calls_total", "circuitbreaker" => config.name.clone(), "outcome" => "failure").increment(1);

                Err(CircuitBreakerError::Inner(error))
            }
        };
        // The trial slot goes back while the outcome is still under the lock.
        drop(trial);
        outcome
    }

    /// Forces the circuit into the open state.
    pub async fn force_open(&self) {
        let mut circuit = self.circuit.lock().await;
        circuit.force_open(&self.config);
    }

    /// Resets the circuit to the closed state, clearing the failure window
    /// and the cumulative counters.
    pub async fn reset(&self) {
        let mut circuit = self.circuit.lock().await;
        circuit.reset(&self.config);
        self.stats.reset();
    }

    /// Returns a snapshot of the circuit's current state.
    pub async fn metrics(&self) -> CircuitMetrics {
        let mut circuit = self.circuit.lock().await;
        circuit.metrics(&self.config)
    }

    /// Returns the current state of the circuit.
    pub async fn state(&self) -> CircuitState {
        let circuit = self.circuit.lock().await;
        circuit.state()
    }

    /// Returns the current state of the circuit without requiring async context.
    ///
    /// An open circuit whose reset timeout has passed still reads as open
    /// until the next call moves it to half-open.
    pub fn state_sync(&self) -> CircuitState {
        CircuitState::from_u8(self.state_atomic.load(Ordering::Acquire))
    }

    /// Returns whether the circuit is currently open.
    pub fn is_open(&self) -> bool {
        self.state_sync() == CircuitState::Open
    }

    /// Returns cumulative counters.
    pub fn stats(&self) -> BreakerStats {
        self.stats.snapshot()
    }

    /// Returns "healthy" when closed, "degraded" when half-open, "unhealthy" when open.
    pub fn health_status(&self) -> &'static str {
        match self.state_sync() {
            CircuitState::Closed => "healthy",
            CircuitState::HalfOpen => "degraded",
            CircuitState::Open => "unhealthy",
        }
    }

    /// Returns the breaker's configuration.
    pub fn config(&self) -> &CircuitBreakerConfig {
        &self.config
    }
}

impl Default for CircuitBreaker {
    fn default() -> Self {
        Self::new(CircuitBreakerConfig::builder().build())
    }
}

impl Clone for CircuitBreaker {
    fn clone(&self) -> Self {
        Self {
            circuit: Arc::clone(&self.circuit),
            state_atomic: Arc::clone(&self.state_atomic),
            stats: Arc::clone(&self.stats),
            config: Arc::clone(&self.config),
        }
    }
}

impl std::fmt::Debug for CircuitBreaker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CircuitBreaker")
            .field("name", &self.config.name)
            .field("state", &self.state_sync())
            .finish()
    }
}
