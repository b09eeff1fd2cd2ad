//! Tests for the connection manager.
//!
//! Test organization:
//! - lifecycle.rs: connect, monitor, disconnect, reset
//! - reconnect.rs: backoff schedule, attempt budget and recovery
//! - health.rs: probe outcomes, timeouts and one-off checks
//! - listeners.rs: runtime subscription and event payloads

mod lifecycle;

use mintguard_connection::{ConnectionConfig, ConnectionConfigBuilder, ConnectionManager};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// A probe whose outcome the test flips at will.
#[derive(Clone)]
pub(crate) struct Switch {
    healthy: Arc<AtomicBool>,
    probes: Arc<AtomicUsize>,
}

impl Switch {
    pub(crate) fn new(healthy: bool) -> Self {
        Self {
            healthy: Arc::new(AtomicBool::new(healthy)),
            probes: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub(crate) fn set(&self, healthy: bool) {
        self.healthy.store(healthy, Ordering::SeqCst);
    }

    pub(crate) fn probes(&self) -> usize {
        self.probes.load(Ordering::SeqCst)
    }

    pub(crate) fn manager(
        &self,
        config: ConnectionConfigBuilder,
    ) -> ConnectionManager<impl mintguard_connection::HealthProbe> {
        let switch = self.clone();
        ConnectionManager::new(
            move || {
                switch.probes.fetch_add(1, Ordering::SeqCst);
                let healthy = switch.healthy.load(Ordering::SeqCst);
                async move { Ok::<_, std::io::Error>(healthy) }
            },
            config.build(),
        )
    }
}

pub(crate) fn config() -> ConnectionConfigBuilder {
    ConnectionConfig::builder()
        .name("authority")
        .health_check_interval(Duration::from_secs(30))
        .health_check_timeout(Duration::from_secs(5))
        .reconnect_delay(Duration::from_secs(1))
        .max_reconnect_delay(Duration::from_secs(30))
        .reconnect_multiplier(2.0)
}
