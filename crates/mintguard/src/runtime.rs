//! Composition root owning one instance of every component.

use crate::facade::ResilientCallFacade;
use crate::settings::{ResilienceSettings, SettingsError};
use mintguard_cache::{CacheStats, MaintenanceHandle, ResultCache};
use mintguard_circuitbreaker::{BreakerStats, CircuitBreaker, CircuitMetrics};
use mintguard_connection::{
    BoxHealthProbe, ConnectionManager, ConnectionMetrics, ConnectionStats, HealthProbe,
};
use mintguard_core::{Classify, RemoteError};
use mintguard_retry::{RetryExecutor, RetryStats};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

#[cfg(feature = "tracing")]
use tracing::info;

/// Aggregate observability snapshot of a runtime.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct RuntimeStatus {
    /// Whether calls go through the breaker and retry executor.
    pub enabled: bool,
    /// "healthy", "degraded" or "unhealthy", from the breaker state.
    pub health: &'static str,
    /// Current breaker state and failure window.
    pub circuit_breaker: CircuitMetrics,
    /// Cumulative breaker counters.
    pub circuit_breaker_stats: BreakerStats,
    /// Cumulative retry counters.
    pub retry: RetryStats,
    /// Cache counters and occupancy.
    pub cache: CacheStats,
    /// Present when the runtime has a connection manager.
    pub connection: Option<ConnectionStatus>,
}

/// Connection manager part of [`RuntimeStatus`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ConnectionStatus {
    /// Current state and reconnect progress.
    pub metrics: ConnectionMetrics,
    /// Cumulative health-check counters.
    pub stats: ConnectionStats,
}

/// Owns the breaker, retry executor, result cache and optional connection
/// manager for one remote dependency.
///
/// Construct one per dependency at startup and hand out the
/// [`facade`](Self::facade) and [`cache`](Self::cache) to callers.
/// [`reset`](Self::reset) returns everything to its initial state, which is
/// what tests use for isolation.
///
/// ```
/// use mintguard::{ResilienceRuntime, ResilienceSettings};
/// use mintguard_core::RemoteError;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let runtime: ResilienceRuntime<RemoteError> =
///     ResilienceRuntime::new(ResilienceSettings::default()).unwrap();
///
/// let valid = runtime
///     .facade()
///     .cached_call(runtime.cache(), "entity-1", || async { Ok(true) })
///     .await
///     .unwrap();
/// assert!(valid);
/// assert_eq!(runtime.cache().get("entity-1"), Some(true));
/// # }
/// ```
pub struct ResilienceRuntime<E = RemoteError> {
    settings: ResilienceSettings,
    facade: ResilientCallFacade<E>,
    cache: ResultCache<bool>,
    maintenance: Mutex<Option<MaintenanceHandle>>,
}

impl<E> ResilienceRuntime<E>
where
    E: Classify + 'static,
{
    /// Builds a runtime without a connection manager. Only transient errors
    /// are retried.
    pub fn new(settings: ResilienceSettings) -> Result<Self, SettingsError> {
        Self::build(settings, None)
    }

    /// Builds a runtime whose connection manager monitors the dependency with `probe`.
    pub fn with_probe(
        settings: ResilienceSettings,
        probe: impl HealthProbe,
    ) -> Result<Self, SettingsError> {
        Self::build(settings, Some(BoxHealthProbe::new(probe)))
    }

    fn build(
        settings: ResilienceSettings,
        probe: Option<BoxHealthProbe>,
    ) -> Result<Self, SettingsError> {
        settings.validate()?;

        let breaker = CircuitBreaker::new(settings.breaker_config());
        let retry = RetryExecutor::new(settings.retry_config::<E>().transient_only().build());
        let mut facade = ResilientCallFacade::new(breaker, retry).enabled(settings.enabled);
        if let Some(probe) = probe {
            let manager = ConnectionManager::new(probe, settings.connection_config());
            facade = facade.with_connection(manager, settings.require_connection);
        }

        #[cfg(feature = "tracing")]
        info!(
            runtime = %settings.name,
            enabled = settings.enabled,
            connection = facade.connection().is_some(),
            "resilience runtime created"
        );

        Ok(Self {
            cache: ResultCache::new(settings.cache_config()),
            settings,
            facade,
            maintenance: Mutex::new(None),
        })
    }
}

impl<E> ResilienceRuntime<E> {
    /// The facade that routes calls through the breaker and retry executor.
    pub fn facade(&self) -> &ResilientCallFacade<E> {
        &self.facade
    }

    /// The shared result cache.
    pub fn cache(&self) -> &ResultCache<bool> {
        &self.cache
    }

    /// The connection manager, when built with [`with_probe`](ResilienceRuntime::with_probe).
    pub fn connection(&self) -> Option<&ConnectionManager<BoxHealthProbe>> {
        self.facade.connection()
    }

    /// The settings this runtime was built from.
    pub fn settings(&self) -> &ResilienceSettings {
        &self.settings
    }

    /// Connects the connection manager, if any, and starts the cache's
    /// expiry sweep if one is configured. Returns whether the dependency is
    /// reachable (always true without a connection manager).
    ///
    /// Must be called from within a Tokio runtime.
    pub async fn start(&self) -> bool {
        if let Some(interval) = self.settings.cache.maintenance_interval_ms {
            let mut maintenance = self
                .maintenance
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            if maintenance.is_none() {
                *maintenance = Some(
                    self.cache
                        .spawn_maintenance(Duration::from_millis(interval)),
                );
            }
        }

        match self.connection() {
            Some(connection) => connection.connect().await,
            None => true,
        }
    }

    /// Returns an aggregate snapshot of every component.
    pub async fn status(&self) -> RuntimeStatus {
        let breaker = self.facade.breaker();
        RuntimeStatus {
            enabled: self.facade.is_enabled(),
            health: breaker.health_status(),
            circuit_breaker: breaker.metrics().await,
            circuit_breaker_stats: breaker.stats(),
            retry: self.facade.retry().stats(),
            cache: self.cache.stats(),
            connection: self.connection().map(|connection| ConnectionStatus {
                metrics: connection.metrics(),
                stats: connection.stats(),
            }),
        }
    }

    /// Closes the breaker, empties the cache, disconnects and zeroes every
    /// counter.
    ///
    /// Disconnecting stops connection monitoring and any pending reconnect;
    /// call [`start`](Self::start) again to resume them. The cache's expiry
    /// sweep keeps running.
    pub async fn reset(&self) {
        self.facade.breaker().reset().await;
        self.facade.retry().reset_stats();
        self.cache.reset();
        if let Some(connection) = self.connection() {
            connection.reset();
        }

        #[cfg(feature = "tracing")]
        info!(runtime = %self.settings.name, "resilience runtime reset");
    }

    /// Stops every background task.
    pub fn shutdown(&self) {
        let handle = self
            .maintenance
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            handle.stop();
        }
        if let Some(connection) = self.connection() {
            connection.disconnect();
        }
    }
}

impl<E> std::fmt::Debug for ResilienceRuntime<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResilienceRuntime")
            .field("name", &self.settings.name)
            .field("facade", &self.facade)
            .field("cache", &self.cache)
            .finish()
    }
}
