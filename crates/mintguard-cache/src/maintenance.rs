//! Periodic expiry sweep.

use crate::ResultCache;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Handle to a background sweep started by
/// [`ResultCache::spawn_maintenance`]. Dropping it stops the sweep.
#[derive(Debug)]
pub struct MaintenanceHandle {
    task: JoinHandle<()>,
}

impl MaintenanceHandle {
    /// Stops the sweep.
    pub fn stop(self) {
        drop(self);
    }

    /// True once the sweep task has ended.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for MaintenanceHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

impl<V: Clone + Send + 'static> ResultCache<V> {
    /// Starts a Tokio task that calls [`maintain`](Self::maintain) every
    /// `interval`, beginning one interval from now.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn spawn_maintenance(&self, interval: Duration) -> MaintenanceHandle {
        let cache = self.clone();
        let period = interval.max(Duration::from_millis(1));

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                cache.maintain();
            }
        });

        MaintenanceHandle { task }
    }
}
