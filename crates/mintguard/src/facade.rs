//! The single call path through breaker, retries and connection gate.

use crate::error::CallError;
use mintguard_cache::ResultCache;
use mintguard_circuitbreaker::CircuitBreaker;
use mintguard_connection::{BoxHealthProbe, ConnectionManager, ConnectionState};
use mintguard_retry::RetryExecutor;
use std::future::Future;

#[cfg(feature = "tracing")]
use tracing::debug;

/// Runs remote operations through a circuit breaker wrapped around a retry
/// executor.
///
/// The breaker is the outer gate: a retry sequence counts as one breaker
/// call, recorded as a success if any attempt succeeds and as a failure if
/// the executor gives up. An open breaker rejects without running the
/// operation at all.
///
/// Cloning is cheap; clones share the breaker, executor and connection manager.
///
/// # Example
///
/// ```
/// use mintguard::{CallError, ResilientCallFacade};
/// use mintguard_circuitbreaker::CircuitBreaker;
/// use mintguard_core::RemoteError;
/// use mintguard_retry::RetryExecutor;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let facade = ResilientCallFacade::new(CircuitBreaker::default(), RetryExecutor::default());
///
/// let valid: Result<bool, CallError<RemoteError>> =
///     facade.call(|| async { Ok(true) }).await;
/// assert!(valid.unwrap());
/// # }
/// ```
pub struct ResilientCallFacade<E> {
    breaker: CircuitBreaker,
    retry: RetryExecutor<E>,
    connection: Option<ConnectionManager<BoxHealthProbe>>,
    require_connection: bool,
    enabled: bool,
}

impl<E> Clone for ResilientCallFacade<E> {
    fn clone(&self) -> Self {
        Self {
            breaker: self.breaker.clone(),
            retry: self.retry.clone(),
            connection: self.connection.clone(),
            require_connection: self.require_connection,
            enabled: self.enabled,
        }
    }
}

impl<E> ResilientCallFacade<E> {
    /// Composes a breaker and a retry executor. Resilience starts enabled.
    pub fn new(breaker: CircuitBreaker, retry: RetryExecutor<E>) -> Self {
        Self {
            breaker,
            retry,
            connection: None,
            require_connection: false,
            enabled: true,
        }
    }

    /// Attaches a connection manager. With `require` set, calls fail with
    /// [`CallError::Unavailable`] while the manager is
    /// [`Failed`](ConnectionState::Failed).
    pub fn with_connection(
        mut self,
        connection: ConnectionManager<BoxHealthProbe>,
        require: bool,
    ) -> Self {
        self.connection = Some(connection);
        self.require_connection = require;
        self
    }

    /// When disabled, operations run once, directly, with no breaker or retries.
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Whether calls go through the breaker and retries.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// The circuit breaker that gates every call.
    pub fn breaker(&self) -> &CircuitBreaker {
        &self.breaker
    }

    /// The retry executor run inside the breaker.
    pub fn retry(&self) -> &RetryExecutor<E> {
        &self.retry
    }

    /// The attached connection manager, if any.
    pub fn connection(&self) -> Option<&ConnectionManager<BoxHealthProbe>> {
        self.connection.as_ref()
    }

    /// Runs `operation` with resilience applied.
    pub async fn call<T, F, Fut>(&self, mut operation: F) -> Result<T, CallError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if !self.enabled {
            #[cfg(feature = "tracing")]
            debug!(breaker = %self.breaker.config().name(), "resilience disabled; calling directly");

            return operation().await.map_err(CallError::Operation);
        }

        if let Some(state) = self.gate() {
            #[cfg(feature = "tracing")]
            debug!(breaker = %self.breaker.config().name(), %state, "dependency unavailable; rejecting call");

            return Err(CallError::Unavailable { state });
        }

        let retry = &self.retry;
        self.breaker
            .execute(|| retry.run(operation))
            .await
            .map_err(CallError::from)
    }

    /// Looks `key` up in `cache`; on a miss, runs `operation` through
    /// [`call`](Self::call) and caches a successful result.
    ///
    /// Failures are never cached.
    pub async fn cached_call<V, F, Fut>(
        &self,
        cache: &ResultCache<V>,
        key: &str,
        operation: F,
    ) -> Result<V, CallError<E>>
    where
        V: Clone + Send + 'static,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = cache.get(key) {
            return Ok(value);
        }

        let value = self.call(operation).await?;
        cache.set(key, value.clone());
        Ok(value)
    }

    fn gate(&self) -> Option<ConnectionState> {
        if !self.require_connection {
            return None;
        }
        let state = self.connection.as_ref()?.state();
        (state == ConnectionState::Failed).then_some(state)
    }
}

impl<E> std::fmt::Debug for ResilientCallFacade<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResilientCallFacade")
            .field("breaker", &self.breaker)
            .field("connection", &self.connection)
            .field("require_connection", &self.require_connection)
            .field("enabled", &self.enabled)
            .finish()
    }
}
