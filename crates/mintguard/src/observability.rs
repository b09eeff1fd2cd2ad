//! Observability guide for mintguard.
//!
//! Every component reports through three independent channels: `stats()`
//! snapshots that are always available, optional `metrics` counters, and
//! optional `tracing` logs. Listener callbacks cover anything else.

/// Metrics documentation
pub mod metrics {
    //! # Metrics Guide
    //!
    //! Enable the `metrics` feature and install any `metrics` recorder:
    //!
    //! ```toml
    //! [dependencies]
    //! mintguard = { version = "0.1", features = ["metrics"] }
    //! metrics-exporter-prometheus = "0.16"
    //! ```
    //!
    //! Every metric carries the component's name as a label, taken from
    //! `ResilienceSettings::name` or the builders' `.name(..)`.
    //!
    //! ## Available Metrics
    //!
    //! ### Circuit Breaker
    //!
    //! - `circuitbreaker_calls_total{circuitbreaker, outcome}` - Calls by outcome (success/failure/rejected)
    //! - `circuitbreaker_transitions_total{circuitbreaker, from, to}` - State transitions
    //! - `circuitbreaker_state{circuitbreaker}` - Current state (0 closed, 1 open, 2 half-open)
    //!
    //! ### Retry
    //!
    //! - `retry_calls_total{retry, result}` - Calls by final result (success/exhausted/non_retryable)
    //! - `retry_attempts_total{retry}` - Individual attempts
    //!
    //! ### Cache
    //!
    //! - `cache_requests_total{cache, result}` - Lookups (hit/miss)
    //! - `cache_evictions_total{cache}` - LRU evictions
    //! - `cache_size{cache}` - Current number of entries
    //!
    //! ### Connection
    //!
    //! - `connection_health_checks_total{connection, result}` - Probes (success/failure)
    //! - `connection_reconnect_attempts_total{connection}` - Scheduled reconnects
    //! - `connection_state{connection}` - Current state (0 disconnected, 1 connecting,
    //!   2 connected, 3 reconnecting, 4 failed)
    //!
    //! ## Example Prometheus Queries
    //!
    //! ```promql
    //! # Share of breaker calls rejected
    //! rate(circuitbreaker_calls_total{outcome="rejected"}[5m])
    //!   / rate(circuitbreaker_calls_total[5m])
    //!
    //! # Average attempts per call
    //! rate(retry_attempts_total[5m]) / rate(retry_calls_total[5m])
    //!
    //! # Cache hit rate
    //! rate(cache_requests_total{result="hit"}[5m]) / rate(cache_requests_total[5m])
    //! ```
    //!
    //! ## Alert Examples
    //!
    //! ```yaml
    //! - alert: CircuitBreakerOpen
    //!   expr: circuitbreaker_state == 1
    //!   for: 1m
    //!
    //! - alert: DependencyUnreachable
    //!   expr: connection_state == 4
    //! ```
}

/// Tracing documentation
pub mod tracing_guide {
    //! # Tracing Guide
    //!
    //! Enable structured logs with the `tracing` feature:
    //!
    //! ```toml
    //! [dependencies]
    //! mintguard = { version = "0.1", features = ["tracing"] }
    //! tracing-subscriber = "0.3"
    //! ```
    //!
    //! ```text
    //! DEBUG circuitbreaker: circuit breaker rejected call breaker="authority" retry_after=41.2s
    //! INFO  circuitbreaker: circuit state transition breaker="authority" from=closed to=open
    //! WARN  retry: attempt failed, retrying retry="authority" attempt=1 max_attempts=3 delay_ms=1000
    //! WARN  connection: health check failed connection="authority" error="health check timed out after 5s"
    //! ```
    //!
    //! A listener that panics is logged at WARN and skipped; the remaining
    //! listeners still run.
}

/// Event system documentation
pub mod events {
    //! # Event System Guide
    //!
    //! Builders accept callbacks for the events each component emits:
    //!
    //! ```rust
    //! use mintguard_circuitbreaker::CircuitBreakerConfig;
    //! use mintguard_connection::{ConnectionConfig, ConnectionEventKind};
    //!
    //! let breaker = CircuitBreakerConfig::builder()
    //!     .on_state_transition(|from, to| println!("breaker {from} -> {to}"))
    //!     .build();
    //!
    //! let connection = ConnectionConfig::builder()
    //!     .on(ConnectionEventKind::MaxReconnectAttemptsReached, |event| {
    //!         eprintln!("giving up: {event:?}");
    //!     })
    //!     .build();
    //! ```
    //!
    //! A running `ConnectionManager` also accepts listeners through
    //! `on(kind, handler)`, which returns an id for `off(id)`.
}
