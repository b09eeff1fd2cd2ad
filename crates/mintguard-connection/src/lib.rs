//! Health monitoring and automatic reconnection for a remote dependency.
//!
//! [`ConnectionManager`] tracks whether a dependency is reachable by running
//! a [`HealthProbe`] on a timer. It is independent of any circuit breaker:
//! the breaker reacts to failures of real calls, the manager to failures of
//! background probes, so the manager may be Connected while a breaker for a
//! particular call path is open.
//!
//! # State machine
//!
//! ```text
//! Disconnected --connect()--> Connecting --ok--> Connected
//!                                 |                  |
//!                               fail            probe fails
//!                                 v                  v
//!                           Reconnecting <-----------+
//!                              |     |
//!                          probe ok  budget exhausted
//!                              v     v
//!                        Connected   Failed
//! ```
//!
//! `disconnect()` returns to Disconnected from any state and cancels every
//! timer.
//!
//! # Example
//!
//! ```rust
//! use mintguard_connection::{
//!     ConnectionConfig, ConnectionEventKind, ConnectionManager, ConnectionState,
//! };
//! use std::time::Duration;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let config = ConnectionConfig::builder()
//!     .name("authority")
//!     .reconnect_delay(Duration::from_millis(100))
//!     .max_reconnect_attempts(5)
//!     .build();
//!
//! let manager = ConnectionManager::new(|| async { Ok::<_, std::io::Error>(true) }, config);
//! let id = manager.on(ConnectionEventKind::Connected, |_| println!("connected"));
//!
//! assert!(manager.connect().await);
//! assert_eq!(manager.state(), ConnectionState::Connected);
//!
//! manager.off(id);
//! manager.disconnect();
//! # }
//! ```
//!
//! # Feature Flags
//!
//! - `metrics`: health check and reconnect counters plus a state gauge
//! - `tracing`: state transitions, failed probes and reconnect scheduling
//! - `serde`: `Serialize` for [`ConnectionState`], [`ConnectionMetrics`] and [`ConnectionStats`]

mod config;
mod events;
mod manager;
mod probe;
mod state;
mod stats;

pub use config::{ConnectionConfig, ConnectionConfigBuilder};
pub use events::{ConnectionEvent, ConnectionEventKind};
pub use manager::{ConnectionManager, ConnectionMetrics};
pub use probe::{BoxHealthProbe, HealthProbe, ProbeError};
pub use state::ConnectionState;
pub use stats::ConnectionStats;

pub use mintguard_core::events::ListenerId;
pub use mintguard_retry::{
    ExponentialBackoff, ExponentialRandomBackoff, FixedInterval, IntervalFunction,
};
