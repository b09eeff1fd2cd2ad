use std::sync::atomic::{AtomicU64, Ordering};

/// Cumulative circuit breaker counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct BreakerStats {
    /// Calls submitted to `execute`, permitted or not.
    pub calls: u64,
    /// Permitted calls whose operation succeeded.
    pub successes: u64,
    /// Permitted calls whose operation failed.
    pub failures: u64,
    /// Calls rejected while the circuit was open.
    pub rejections: u64,
    /// State transitions.
    pub state_transitions: u64,
}

#[derive(Debug, Default)]
pub(crate) struct StatsCounters {
    calls: AtomicU64,
    successes: AtomicU64,
    failures: AtomicU64,
    rejections: AtomicU64,
    state_transitions: AtomicU64,
}

impl StatsCounters {
    pub(crate) fn call(&self) {
        self.calls.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn success(&self) {
        self.successes.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn failure(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn rejection(&self) {
        self.rejections.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn transition(&self) {
        self.state_transitions.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> BreakerStats {
        BreakerStats {
            calls: self.calls.load(Ordering::Relaxed),
            successes: self.successes.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
            rejections: self.rejections.load(Ordering::Relaxed),
            state_transitions: self.state_transitions.load(Ordering::Relaxed),
        }
    }

    pub(crate) fn reset(&self) {
        for counter in [
            &self.calls,
            &self.successes,
            &self.failures,
            &self.rejections,
            &self.state_transitions,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }
}
