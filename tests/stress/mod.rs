//! Stress tests for the mintguard components.
//!
//! ## What We Test
//!
//! - **High volume**: hundreds of thousands of calls or cache operations
//! - **High concurrency**: thousands of tasks sharing one component
//! - **State consistency**: counters and state agree after the load
//! - **Resource cleanup**: background tasks stop, nothing deadlocks

pub mod retry;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Utility: track peak concurrent operations
pub struct ConcurrencyTracker {
    current: AtomicUsize,
    peak: AtomicUsize,
}

impl ConcurrencyTracker {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            current: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        })
    }

    pub fn enter(&self) {
        let current = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(current, Ordering::SeqCst);
    }

    pub fn exit(&self) {
        self.current.fetch_sub(1, Ordering::SeqCst);
    }

    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    pub fn current(&self) -> usize {
        self.current.load(Ordering::SeqCst)
    }
}
