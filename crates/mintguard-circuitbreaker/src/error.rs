use std::time::Duration;
use thiserror::Error;

/// Errors returned by [`CircuitBreaker::execute`](crate::CircuitBreaker::execute).
#[derive(Debug, Error)]
pub enum CircuitBreakerError<E> {
    /// The circuit is open; the operation was not invoked.
    #[error("circuit breaker is open; retry after {retry_after:?}")]
    OpenCircuit {
        /// Remaining time before a call may probe the dependency.
        retry_after: Duration,
    },

    /// The operation ran and failed.
    #[error(transparent)]
    Inner(E),
}

impl<E> CircuitBreakerError<E> {
    /// Returns true if the error indicates the circuit is open.
    pub fn is_circuit_open(&self) -> bool {
        matches!(self, CircuitBreakerError::OpenCircuit { .. })
    }

    /// Remaining wait, if the circuit was open.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            CircuitBreakerError::OpenCircuit { retry_after } => Some(*retry_after),
            CircuitBreakerError::Inner(_) => None,
        }
    }

    /// Returns the inner error if present.
    pub fn into_inner(self) -> Option<E> {
        match self {
            CircuitBreakerError::Inner(e) => Some(e),
            CircuitBreakerError::OpenCircuit { .. } => None,
        }
    }
}
