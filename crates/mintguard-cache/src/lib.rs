//! TTL + LRU result cache for answers from a remote authority.
//!
//! [`ResultCache`] maps opaque string keys to cloned values (validation
//! verdicts by default). Entries expire `ttl` after insertion; when the cache
//! is full, inserting a new key evicts the least-recently-used entry.
//!
//! # Basic Example
//!
//! ```
//! use mintguard_cache::{CacheConfig, ResultCache};
//! use std::time::Duration;
//!
//! let cache: ResultCache = ResultCache::new(
//!     CacheConfig::builder()
//!         .name("validation")
//!         .max_size(2)
//!         .ttl(Duration::from_secs(60))
//!         .build(),
//! );
//!
//! cache.set("a", true);
//! cache.set("b", false);
//! assert_eq!(cache.get("a"), Some(true)); // "a" is now most recent
//! cache.set("c", true); // evicts "b"
//! assert!(!cache.has("b"));
//! assert_eq!(cache.stats().evictions, 1);
//! ```
//!
//! # Background maintenance
//!
//! Expired entries are removed lazily on read. To also reclaim entries that
//! are never read again, run a periodic sweep:
//!
//! ```no_run
//! # use mintguard_cache::ResultCache;
//! # use std::time::Duration;
//! # async fn example() {
//! let cache: ResultCache = ResultCache::default();
//! let handle = cache.spawn_maintenance(Duration::from_secs(60));
//! // ... dropping the handle stops the sweep
//! drop(handle);
//! # }
//! ```
//!
//! # Feature Flags
//!
//! - `metrics`: request/eviction counters and a size gauge via the `metrics` crate
//! - `tracing`: debug/info logs via the `tracing` crate
//! - `serde`: `Serialize` for [`CacheStats`]

mod config;
mod events;
mod maintenance;
mod stats;
mod store;

pub use config::{CacheConfig, CacheConfigBuilder};
pub use events::CacheEvent;
pub use maintenance::MaintenanceHandle;
pub use stats::CacheStats;

use stats::StatsCounters;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use store::{CacheStore, Inserted, Lookup};
use tokio::time::Instant;

#[cfg(feature = "metrics")]
use metrics::{counter, describe_counter, describe_gauge, gauge};

#[cfg(feature = "tracing")]
use tracing::{debug, info};

/// A bounded, expiring cache keyed by strings.
///
/// Cloning is cheap; clones share entries and statistics.
pub struct ResultCache<V = bool> {
    store: Arc<Mutex<CacheStore<V>>>,
    config: Arc<CacheConfig>,
    stats: Arc<StatsCounters>,
}

impl<V> Clone for ResultCache<V> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            config: Arc::clone(&self.config),
            stats: Arc::clone(&self.stats),
        }
    }
}

impl<V: Clone + Send + 'static> ResultCache<V> {
    /// Creates an empty cache.
    pub fn new(config: CacheConfig) -> Self {
        #[cfg(feature = "metrics")]
        {
            describe_counter!(
                "cache_requests_total",
                "Total number of cache requests (hits and misses)"
            );
            describe_counter!("cache_evictions_total", "Total number of cache evictions");
            describe_gauge!("cache_size", "Current number of entries in the cache");
        }

        let store = CacheStore::new(config.max_size, config.ttl);
        Self {
            store: Arc::new(Mutex::new(store)),
            config: Arc::new(config),
            stats: Arc::new(StatsCounters::default()),
        }
    }

    /// Returns the cached value if present and unexpired.
    ///
    /// A hit refreshes the entry's recency. An expired entry is removed and
    /// reported as a miss.
    pub fn get(&self, key: &str) -> Option<V> {
        let (lookup, _size) = {
            let mut store = self.lock();
            let lookup = store.get(key, Instant::now());
            (lookup, store.len())
        };

        let name = &self.config.name;
        match lookup {
            Lookup::Hit(value) => {
                self.stats.hit();

                #[cfg(feature = "metrics")]
                counter!("cache_requests_total", "cache" => name.clone(), "result" => "hit")
                    .increment(1);

                #[cfg(feature = "tracing")]
                debug!(cache = %name, key, "cache hit");

                self.config.event_listeners.emit(&CacheEvent::Hit {
                    pattern_name: name.clone(),
                    timestamp: Instant::now(),
                    key: key.to_string(),
                });
                Some(value)
            }
            lookup => {
                let expired = matches!(lookup, Lookup::Expired);
                self.stats.miss();
                if expired {
                    self.stats.expired(1);

                    #[cfg(feature = "metrics")]
                    gauge!("cache_size", "cache" => name.clone()).set(_size as f64);
                }

                #[cfg(feature = "metrics")]
                counter!("cache_requests_total", "cache" => name.clone(), "result" => "miss")
                    .increment(1);

                #[cfg(feature = "tracing")]
                debug!(cache = %name, key, expired, "cache miss");

                self.config.event_listeners.emit(&CacheEvent::Miss {
                    pattern_name: name.clone(),
                    timestamp: Instant::now(),
                    key: key.to_string(),
                });
                None
            }
        }
    }

    /// Stores `value` under `key`, stamping it with the current time.
    ///
    /// Inserting a new key into a full cache evicts the least-recently-used
    /// entry first; overwriting an existing key never evicts.
    pub fn set(&self, key: impl Into<String>, value: V) {
        let (inserted, _size) = {
            let mut store = self.lock();
            let inserted = store.insert(key.into(), value, Instant::now());
            (inserted, store.len())
        };
        self.stats.set();

        #[cfg(feature = "metrics")]
        gauge!("cache_size", "cache" => self.config.name.clone()).set(_size as f64);

        if let Inserted::Evicted(evicted) = inserted {
            self.stats.eviction();

            #[cfg(feature = "metrics")]
            counter!("cache_evictions_total", "cache" => self.config.name.clone()).increment(1);

            #[cfg(feature = "tracing")]
            info!(cache = %self.config.name, key = %evicted, "cache eviction occurred");

            self.config.event_listeners.emit(&CacheEvent::Eviction {
                pattern_name: self.config.name.clone(),
                timestamp: Instant::now(),
                key: evicted,
            });
        }
    }

    /// True if `key` is present and unexpired. Does not refresh recency.
    pub fn has(&self, key: &str) -> bool {
        self.lock().contains(key, Instant::now())
    }

    /// Removes `key`; returns whether it was present.
    pub fn invalidate(&self, key: &str) -> bool {
        let mut store = self.lock();
        let removed = store.remove(key);

        #[cfg(feature = "metrics")]
        gauge!("cache_size", "cache" => self.config.name.clone()).set(store.len() as f64);

        removed
    }

    /// Removes every entry. Statistics are kept.
    pub fn clear(&self) {
        self.lock().clear();

        #[cfg(feature = "metrics")]
        gauge!("cache_size", "cache" => self.config.name.clone()).set(0.0);
    }

    /// Removes every expired entry regardless of access order and returns
    /// how many were removed. Idempotent.
    pub fn maintain(&self) -> usize {
        let (removed, _size) = {
            let mut store = self.lock();
            let removed = store.purge_expired(Instant::now());
            (removed, store.len())
        };

        if removed > 0 {
            self.stats.expired(removed);

            #[cfg(feature = "metrics")]
            gauge!("cache_size", "cache" => self.config.name.clone()).set(_size as f64);

            #[cfg(feature = "tracing")]
            debug!(cache = %self.config.name, removed, "removed expired cache entries");

            self.config.event_listeners.emit(&CacheEvent::Expired {
                pattern_name: self.config.name.clone(),
                timestamp: Instant::now(),
                removed,
            });
        }
        removed
    }

    /// Number of entries currently stored, including expired ones not yet swept.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// True if no entries are stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns cumulative counters and the current size.
    pub fn stats(&self) -> CacheStats {
        let (size, max_size) = {
            let store = self.lock();
            (store.len(), store.capacity())
        };
        self.stats.snapshot(size, max_size)
    }

    /// Clears entries and zeroes statistics.
    pub fn reset(&self) {
        self.clear();
        self.stats.reset();
    }

    /// Returns the cache's configuration.
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    fn lock(&self) -> MutexGuard<'_, CacheStore<V>> {
        // The store has no invariants a panicking reader could break.
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<V: Clone + Send + 'static> Default for ResultCache<V> {
    fn default() -> Self {
        Self::new(CacheConfig::builder().build())
    }
}

impl<V> std::fmt::Debug for ResultCache<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResultCache")
            .field("name", &self.config.name)
            .field("max_size", &self.config.max_size)
            .field("ttl", &self.config.ttl)
            .finish()
    }
}
