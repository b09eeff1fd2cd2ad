//! Cache storage: an LRU map whose entries carry their insertion time.

use lru::LruCache;
use std::num::NonZeroUsize;
use std::time::Duration;
use tokio::time::Instant;

/// Entry in the cache with TTL tracking.
#[derive(Clone, Debug)]
pub(crate) struct CacheEntry<V> {
    value: V,
    inserted_at: Instant,
}

impl<V> CacheEntry<V> {
    fn new(value: V, now: Instant) -> Self {
        Self {
            value,
            inserted_at: now,
        }
    }

    fn is_expired(&self, ttl: Duration, now: Instant) -> bool {
        now.saturating_duration_since(self.inserted_at) > ttl
    }
}

/// Result of an insertion.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Inserted {
    /// The key was new and there was room.
    Fresh,
    /// The key already existed; its value and timestamp were replaced.
    Replaced,
    /// The key was new and the least-recently-used entry was evicted for it.
    Evicted(String),
}

/// Result of a lookup.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Lookup<V> {
    Hit(V),
    Miss,
    Expired,
}

pub(crate) struct CacheStore<V> {
    entries: LruCache<String, CacheEntry<V>>,
    ttl: Duration,
}

impl<V: Clone> CacheStore<V> {
    /// Creates a store holding at most `capacity` entries (at least one).
    pub(crate) fn new(capacity: usize, ttl: Duration) -> Self {
        let cap = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: LruCache::new(cap),
            ttl,
        }
    }

    /// Returns the value if present and fresh, refreshing its recency.
    /// Expired entries are removed.
    pub(crate) fn get(&mut self, key: &str, now: Instant) -> Lookup<V> {
        let ttl = self.ttl;
        match self.entries.get(key) {
            None => return Lookup::Miss,
            Some(entry) if !entry.is_expired(ttl, now) => return Lookup::Hit(entry.value.clone()),
            Some(_) => {}
        }

        self.entries.pop(key);
        Lookup::Expired
    }

    /// True if the key is present and fresh. Does not touch recency.
    pub(crate) fn contains(&self, key: &str, now: Instant) -> bool {
        self.entries
            .peek(key)
            .is_some_and(|entry| !entry.is_expired(self.ttl, now))
    }

    pub(crate) fn insert(&mut self, key: String, value: V, now: Instant) -> Inserted {
        let replaced = self.entries.contains(&key);
        match self.entries.push(key, CacheEntry::new(value, now)) {
            Some((evicted, _)) if !replaced => Inserted::Evicted(evicted),
            _ if replaced => Inserted::Replaced,
            _ => Inserted::Fresh,
        }
    }

    pub(crate) fn remove(&mut self, key: &str) -> bool {
        self.entries.pop(key).is_some()
    }

    /// Removes every expired entry regardless of recency; returns how many.
    pub(crate) fn purge_expired(&mut self, now: Instant) -> usize {
        let expired: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired(self.ttl, now))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            self.entries.pop(key.as_str());
        }
        expired.len()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn capacity(&self) -> usize {
        self.entries.cap().get()
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }
}
