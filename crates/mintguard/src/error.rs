use mintguard_circuitbreaker::CircuitBreakerError;
use mintguard_connection::ConnectionState;
use std::time::Duration;
use thiserror::Error;

/// Error returned by [`ResilientCallFacade::call`](crate::ResilientCallFacade::call).
#[derive(Debug, Error)]
pub enum CallError<E> {
    /// The circuit breaker rejected the call without running it.
    #[error("circuit breaker is open; retry after {retry_after:?}")]
    CircuitOpen { retry_after: Duration },
    /// The connection gate rejected the call because the dependency is
    /// known to be unreachable.
    #[error("dependency unavailable (connection {state})")]
    Unavailable { state: ConnectionState },
    /// The operation failed, after any retries.
    #[error(transparent)]
    Operation(E),
}

impl<E> CallError<E> {
    /// True if the breaker rejected the call.
    pub fn is_circuit_open(&self) -> bool {
        matches!(self, CallError::CircuitOpen { .. })
    }

    /// Estimated wait before the breaker admits calls again, if it rejected this one.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            CallError::CircuitOpen { retry_after } => Some(*retry_after),
            _ => None,
        }
    }

    /// Returns the operation's error, if that is what failed.
    pub fn into_operation(self) -> Option<E> {
        match self {
            CallError::Operation(error) => Some(error),
            _ => None,
        }
    }
}

impl<E> From<CircuitBreakerError<E>> for CallError<E> {
    fn from(error: CircuitBreakerError<E>) -> Self {
        match error {
            CircuitBreakerError::OpenCircuit { retry_after } => CallError::CircuitOpen { retry_after },
            CircuitBreakerError::Inner(error) => CallError::Operation(error),
        }
    }
}
