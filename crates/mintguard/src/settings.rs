//! Grouped thresholds for every component of a [`ResilienceRuntime`](crate::ResilienceRuntime).
//!
//! Durations are plain millisecond counts (`*_ms` fields) so the settings
//! can be read from any configuration format. With the `serde` feature,
//! omitted fields take their defaults:
//!
//! ```
//! # #[cfg(feature = "serde")]
//! # {
//! use mintguard::ResilienceSettings;
//!
//! let settings: ResilienceSettings = serde_json::from_str(
//!     r#"{ "name": "authority", "circuit_breaker": { "failure_threshold": 3 } }"#,
//! ).unwrap();
//! assert_eq!(settings.circuit_breaker.failure_threshold, 3);
//! assert_eq!(settings.circuit_breaker.reset_timeout_ms, 60_000);
//! # }
//! ```

use mintguard_cache::CacheConfig;
use mintguard_circuitbreaker::CircuitBreakerConfig;
use mintguard_connection::ConnectionConfig;
use mintguard_retry::RetryConfig;
use std::time::Duration;
use thiserror::Error;

/// Invalid settings.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SettingsError {
    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },
    #[error("{field} must be at least 1.0, got {value}")]
    MultiplierBelowOne { field: &'static str, value: f64 },
    #[error("{field} must be between 0.0 and 1.0, got {value}")]
    OutOfUnitRange { field: &'static str, value: f64 },
    #[error("{max_field} ({max_ms}ms) is smaller than {min_field} ({min_ms}ms)")]
    InvertedRange {
        min_field: &'static str,
        min_ms: u64,
        max_field: &'static str,
        max_ms: u64,
    },
}

/// Settings for the whole runtime.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ResilienceSettings {
    /// When false, calls bypass the breaker and retries entirely.
    pub enabled: bool,
    /// Name given to every component for logs and metrics.
    pub name: String,
    /// Reject calls while an attached connection manager is Failed.
    pub require_connection: bool,
    /// Circuit breaker thresholds.
    pub circuit_breaker: BreakerSettings,
    /// Retry attempts and backoff.
    pub retry: RetrySettings,
    /// Result cache capacity and expiry.
    pub cache: CacheSettings,
    /// Health checking and reconnect backoff.
    pub connection: ConnectionSettings,
}

impl Default for ResilienceSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            name: String::from("<unnamed>"),
            require_connection: false,
            circuit_breaker: BreakerSettings::default(),
            retry: RetrySettings::default(),
            cache: CacheSettings::default(),
            connection: ConnectionSettings::default(),
        }
    }
}

/// Circuit breaker part of [`ResilienceSettings`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BreakerSettings {
    /// Failures within the monitor window that open the circuit.
    pub failure_threshold: usize,
    /// How long the circuit stays open before a trial call.
    pub reset_timeout_ms: u64,
    /// Failures older than this no longer count.
    pub monitor_window_ms: u64,
    /// Half-open successes needed to close, and the cap on concurrent trials.
    pub half_open_attempts: usize,
}

impl Default for BreakerSettings {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            reset_timeout_ms: 60_000,
            monitor_window_ms: 120_000,
            half_open_attempts: 3,
        }
    }
}

/// Retry part of [`ResilienceSettings`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RetrySettings {
    /// Total attempts, including the first.
    pub max_attempts: usize,
    /// Delay before the first retry.
    pub initial_delay_ms: u64,
    /// Upper bound on any single delay.
    pub max_delay_ms: u64,
    /// Growth factor between consecutive delays.
    pub backoff_multiplier: f64,
    /// Randomization factor in `0.0..=1.0`; `None` keeps delays exact.
    pub jitter: Option<f64>,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay_ms: 1_000,
            max_delay_ms: 10_000,
            backoff_multiplier: 2.0,
            jitter: None,
        }
    }
}

/// Cache part of [`ResilienceSettings`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CacheSettings {
    /// Entries kept before the least recently used is evicted.
    pub max_size: usize,
    /// Age after which an entry is treated as absent.
    pub ttl_ms: u64,
    /// Period of the background expiry sweep started by
    /// [`ResilienceRuntime::start`](crate::ResilienceRuntime::start). `None` disables it.
    pub maintenance_interval_ms: Option<u64>,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            max_size: 1000,
            ttl_ms: 300_000,
            maintenance_interval_ms: Some(60_000),
        }
    }
}

/// Connection manager part of [`ResilienceSettings`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ConnectionSettings {
    /// Period of health checks while connected.
    pub health_check_interval_ms: u64,
    /// Hard limit on a single health check.
    pub health_check_timeout_ms: u64,
    /// Delay before the first reconnect attempt.
    pub reconnect_delay_ms: u64,
    /// Upper bound on the reconnect delay.
    pub max_reconnect_delay_ms: u64,
    /// Growth factor between reconnect delays.
    pub reconnect_multiplier: f64,
    /// `None` reconnects forever.
    pub max_reconnect_attempts: Option<u32>,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            health_check_interval_ms: 30_000,
            health_check_timeout_ms: 5_000,
            reconnect_delay_ms: 1_000,
            max_reconnect_delay_ms: 30_000,
            reconnect_multiplier: 2.0,
            max_reconnect_attempts: None,
        }
    }
}

fn non_zero(field: &'static str, value: u64) -> Result<(), SettingsError> {
    if value == 0 {
        Err(SettingsError::Zero { field })
    } else {
        Ok(())
    }
}

fn multiplier(field: &'static str, value: f64) -> Result<(), SettingsError> {
    // Also rejects NaN.
    if value >= 1.0 {
        Ok(())
    } else {
        Err(SettingsError::MultiplierBelowOne { field, value })
    }
}

fn ordered(
    min_field: &'static str,
    min_ms: u64,
    max_field: &'static str,
    max_ms: u64,
) -> Result<(), SettingsError> {
    if max_ms < min_ms {
        Err(SettingsError::InvertedRange {
            min_field,
            min_ms,
            max_field,
            max_ms,
        })
    } else {
        Ok(())
    }
}

impl ResilienceSettings {
    /// Checks every threshold. The component builders clamp silently; this
    /// reports what would have been clamped.
    pub fn validate(&self) -> Result<(), SettingsError> {
        let cb = &self.circuit_breaker;
        non_zero("circuit_breaker.failure_threshold", cb.failure_threshold as u64)?;
        non_zero("circuit_breaker.reset_timeout_ms", cb.reset_timeout_ms)?;
        non_zero("circuit_breaker.monitor_window_ms", cb.monitor_window_ms)?;
        non_zero("circuit_breaker.half_open_attempts", cb.half_open_attempts as u64)?;

        let retry = &self.retry;
        non_zero("retry.max_attempts", retry.max_attempts as u64)?;
        multiplier("retry.backoff_multiplier", retry.backoff_multiplier)?;
        ordered(
            "retry.initial_delay_ms",
            retry.initial_delay_ms,
            "retry.max_delay_ms",
            retry.max_delay_ms,
        )?;
        if let Some(value) = retry.jitter {
            if !(0.0..=1.0).contains(&value) {
                return Err(SettingsError::OutOfUnitRange {
                    field: "retry.jitter",
                    value,
                });
            }
        }

        non_zero("cache.max_size", self.cache.max_size as u64)?;
        non_zero("cache.ttl_ms", self.cache.ttl_ms)?;
        if let Some(interval) = self.cache.maintenance_interval_ms {
            non_zero("cache.maintenance_interval_ms", interval)?;
        }

        let conn = &self.connection;
        non_zero("connection.health_check_interval_ms", conn.health_check_interval_ms)?;
        non_zero("connection.health_check_timeout_ms", conn.health_check_timeout_ms)?;
        multiplier("connection.reconnect_multiplier", conn.reconnect_multiplier)?;
        ordered(
            "connection.reconnect_delay_ms",
            conn.reconnect_delay_ms,
            "connection.max_reconnect_delay_ms",
            conn.max_reconnect_delay_ms,
        )?;
        Ok(())
    }

    /// Circuit breaker configuration for these settings.
    pub fn breaker_config(&self) -> CircuitBreakerConfig {
        let cb = &self.circuit_breaker;
        CircuitBreakerConfig::builder()
            .name(self.name.clone())
            .failure_threshold(cb.failure_threshold)
            .reset_timeout(Duration::from_millis(cb.reset_timeout_ms))
            .monitor_window(Duration::from_millis(cb.monitor_window_ms))
            .half_open_attempts(cb.half_open_attempts)
            .build()
    }

    /// Retry configuration builder for these settings. The retry predicate is
    /// left to the caller.
    pub fn retry_config<E>(&self) -> mintguard_retry::RetryConfigBuilder<E> {
        let retry = &self.retry;
        let mut builder = RetryConfig::<E>::builder()
            .name(self.name.clone())
            .max_attempts(retry.max_attempts)
            .initial_delay(Duration::from_millis(retry.initial_delay_ms))
            .max_delay(Duration::from_millis(retry.max_delay_ms))
            .backoff_multiplier(retry.backoff_multiplier);
        if let Some(factor) = retry.jitter {
            builder = builder.jitter(factor);
        }
        builder
    }

    /// Cache configuration for these settings.
    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig::builder()
            .name(self.name.clone())
            .max_size(self.cache.max_size)
            .ttl(Duration::from_millis(self.cache.ttl_ms))
            .build()
    }

    /// Connection manager configuration for these settings.
    pub fn connection_config(&self) -> ConnectionConfig {
        let conn = &self.connection;
        let mut builder = ConnectionConfig::builder()
            .name(self.name.clone())
            .health_check_interval(Duration::from_millis(conn.health_check_interval_ms))
            .health_check_timeout(Duration::from_millis(conn.health_check_timeout_ms))
            .reconnect_delay(Duration::from_millis(conn.reconnect_delay_ms))
            .max_reconnect_delay(Duration::from_millis(conn.max_reconnect_delay_ms))
            .reconnect_multiplier(conn.reconnect_multiplier);
        if let Some(max) = conn.max_reconnect_attempts {
            builder = builder.max_reconnect_attempts(max);
        }
        builder.build()
    }
}
