//! Configuration for the result cache.

use crate::events::CacheEvent;
use mintguard_core::events::{EventListeners, FnListener};
use std::time::Duration;

/// Configuration for [`ResultCache`](crate::ResultCache).
pub struct CacheConfig {
    pub(crate) max_size: usize,
    pub(crate) ttl: Duration,
    pub(crate) event_listeners: EventListeners<CacheEvent>,
    pub(crate) name: String,
}

impl CacheConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> CacheConfigBuilder {
        CacheConfigBuilder::new()
    }

    /// Maximum number of entries.
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Time-to-live of each entry.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// The cache's name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Builder for configuring and constructing a cache.
pub struct CacheConfigBuilder {
    max_size: usize,
    ttl: Duration,
    event_listeners: EventListeners<CacheEvent>,
    name: String,
}

impl Default for CacheConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CacheConfigBuilder {
    /// Creates a new builder with default values.
    pub fn new() -> Self {
        Self {
            max_size: 1000,
            ttl: Duration::from_secs(300),
            event_listeners: EventListeners::new(),
            name: String::from("<unnamed>"),
        }
    }

    /// Sets the maximum number of entries in the cache.
    ///
    /// Zero is treated as one.
    ///
    /// Default: 1000
    pub fn max_size(mut self, size: usize) -> Self {
        self.max_size = size;
        self
    }

    /// Sets the time-to-live for cached entries, measured from insertion.
    ///
    /// Default: 5 minutes
    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Give this cache a human-readable name for observability.
    ///
    /// Default: `<unnamed>`
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Registers a callback invoked on cache hits with the key.
    pub fn on_hit<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(move |event| {
            if let CacheEvent::Hit { key, .. } = event {
                f(key);
            }
        }));
        self
    }

    /// Registers a callback invoked on cache misses (absent or expired) with the key.
    pub fn on_miss<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(move |event| {
            if let CacheEvent::Miss { key, .. } = event {
                f(key);
            }
        }));
        self
    }

    /// Registers a callback invoked when an entry is evicted to make room,
    /// with the evicted key.
    pub fn on_eviction<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(move |event| {
            if let CacheEvent::Eviction { key, .. } = event {
                f(key);
            }
        }));
        self
    }

    /// Registers a callback invoked after a maintenance sweep removed
    /// expired entries, with the number removed.
    pub fn on_expired<F>(mut self, f: F) -> Self
    where
        F: Fn(usize) + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(move |event| {
            if let CacheEvent::Expired { removed, .. } = event {
                f(*removed);
            }
        }));
        self
    }

    /// Builds the configuration.
    pub fn build(self) -> CacheConfig {
        CacheConfig {
            max_size: self.max_size.max(1),
            ttl: self.ttl,
            event_listeners: self.event_listeners,
            name: self.name,
        }
    }
}
