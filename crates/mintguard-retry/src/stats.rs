use std::sync::atomic::{AtomicU64, Ordering};

/// Snapshot of cumulative retry statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct RetryStats {
    /// Invocations of `run`.
    pub calls: u64,
    /// Operation attempts across all calls.
    pub attempts: u64,
    /// Attempts that were retries of an earlier failure.
    pub retries: u64,
    /// Calls that eventually succeeded.
    pub successes: u64,
    /// Calls that failed after the final attempt.
    pub exhausted: u64,
    /// Calls that failed with an error the predicate rejected.
    pub non_retryable: u64,
}

#[derive(Debug, Default)]
pub(crate) struct StatsCounters {
    calls: AtomicU64,
    attempts: AtomicU64,
    retries: AtomicU64,
    successes: AtomicU64,
    exhausted: AtomicU64,
    non_retryable: AtomicU64,
}

impl StatsCounters {
    pub(crate) fn call(&self) {
        self.calls.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn attempt(&self, retry: bool) {
        self.attempts.fetch_add(1, Ordering::Relaxed);
        if retry {
            self.retries.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub(crate) fn success(&self) {
        self.successes.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn exhausted(&self) {
        self.exhausted.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn non_retryable(&self) {
        self.non_retryable.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> RetryStats {
        RetryStats {
            calls: self.calls.load(Ordering::Relaxed),
            attempts: self.attempts.load(Ordering::Relaxed),
            retries: self.retries.load(Ordering::Relaxed),
            successes: self.successes.load(Ordering::Relaxed),
            exhausted: self.exhausted.load(Ordering::Relaxed),
            non_retryable: self.non_retryable.load(Ordering::Relaxed),
        }
    }

    pub(crate) fn reset(&self) {
        for counter in [
            &self.calls,
            &self.attempts,
            &self.retries,
            &self.successes,
            &self.exhausted,
            &self.non_retryable,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }
}
