use std::sync::atomic::{AtomicU64, Ordering};

/// Cumulative connection manager counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ConnectionStats {
    /// Health checks performed, including those that timed out.
    pub health_checks: u64,
    pub successful_checks: u64,
    pub failed_checks: u64,
    /// Reconnect attempts scheduled.
    pub reconnect_attempts: u64,
    /// Transitions into Connected.
    pub connections: u64,
}

#[derive(Debug, Default)]
pub(crate) struct StatsCounters {
    health_checks: AtomicU64,
    successful_checks: AtomicU64,
    failed_checks: AtomicU64,
    reconnect_attempts: AtomicU64,
    connections: AtomicU64,
}

impl StatsCounters {
    pub(crate) fn check(&self, healthy: bool) {
        self.health_checks.fetch_add(1, Ordering::Relaxed);
        if healthy {
            self.successful_checks.fetch_add(1, Ordering::Relaxed);
        } else {
            self.failed_checks.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub(crate) fn reconnect_attempt(&self) {
        self.reconnect_attempts.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn connection(&self) {
        self.connections.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> ConnectionStats {
        ConnectionStats {
            health_checks: self.health_checks.load(Ordering::Relaxed),
            successful_checks: self.successful_checks.load(Ordering::Relaxed),
            failed_checks: self.failed_checks.load(Ordering::Relaxed),
            reconnect_attempts: self.reconnect_attempts.load(Ordering::Relaxed),
            connections: self.connections.load(Ordering::Relaxed),
        }
    }

    pub(crate) fn reset(&self) {
        for counter in [
            &self.health_checks,
            &self.successful_checks,
            &self.failed_checks,
            &self.reconnect_attempts,
            &self.connections,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }
}
