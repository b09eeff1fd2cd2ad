//! Event types for the result cache.

use mintguard_core::events::ResilienceEvent;
use tokio::time::Instant;

/// Events emitted by the cache.
#[derive(Debug, Clone)]
pub enum CacheEvent {
    /// A lookup found a fresh entry.
    Hit {
        pattern_name: String,
        timestamp: Instant,
        key: String,
    },
    /// A lookup found nothing, or only an expired entry.
    Miss {
        pattern_name: String,
        timestamp: Instant,
        key: String,
    },
    /// An entry was evicted to make room for a new key.
    Eviction {
        pattern_name: String,
        timestamp: Instant,
        key: String,
    },
    /// A maintenance sweep removed expired entries.
    Expired {
        pattern_name: String,
        timestamp: Instant,
        removed: usize,
    },
}

impl ResilienceEvent for CacheEvent {
    fn event_type(&self) -> &'static str {
        match self {
            CacheEvent::Hit { .. } => "cache_hit",
            CacheEvent::Miss { .. } => "cache_miss",
            CacheEvent::Eviction { .. } => "cache_eviction",
            CacheEvent::Expired { .. } => "cache_expired",
        }
    }

    fn timestamp(&self) -> Instant {
        match self {
            CacheEvent::Hit { timestamp, .. }
            | CacheEvent::Miss { timestamp, .. }
            | CacheEvent::Eviction { timestamp, .. }
            | CacheEvent::Expired { timestamp, .. } => *timestamp,
        }
    }

    fn pattern_name(&self) -> &str {
        match self {
            CacheEvent::Hit { pattern_name, .. }
            | CacheEvent::Miss { pattern_name, .. }
            | CacheEvent::Eviction { pattern_name, .. }
            | CacheEvent::Expired { pattern_name, .. } => pattern_name,
        }
    }
}
