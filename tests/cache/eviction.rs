use super::cache;
use mintguard_cache::{CacheConfig, ResultCache};
use std::sync::{Arc, Mutex};
use std::time::Duration;

const TTL: Duration = Duration::from_secs(300);

/// Reading A before inserting C makes B the eviction victim
#[tokio::test(start_paused = true)]
async fn read_refreshes_recency() {
    let cache = cache(2, TTL);
    cache.set("A", true);
    cache.set("B", true);

    assert_eq!(cache.get("A"), Some(true));
    cache.set("C", false);

    assert!(cache.has("A"));
    assert!(!cache.has("B"));
    assert!(cache.has("C"));
    assert_eq!(cache.stats().evictions, 1);
}

/// Without reads, the oldest insertion goes first
#[tokio::test(start_paused = true)]
async fn insertion_order_without_reads() {
    let cache = cache(3, TTL);
    for key in ["a", "b", "c", "d", "e"] {
        cache.set(key, true);
    }

    assert_eq!(cache.len(), 3);
    assert!(!cache.has("a"));
    assert!(!cache.has("b"));
    assert!(cache.has("e"));
}

/// Overwriting an existing key in a full cache evicts nothing
#[tokio::test(start_paused = true)]
async fn overwrite_does_not_evict() {
    let cache = cache(2, TTL);
    cache.set("A", true);
    cache.set("B", true);
    cache.set("A", false);

    assert_eq!(cache.len(), 2);
    assert_eq!(cache.get("A"), Some(false));
    assert_eq!(cache.get("B"), Some(true));
    assert_eq!(cache.stats().evictions, 0);
}

/// Overwriting refreshes recency as well as the value
#[tokio::test(start_paused = true)]
async fn overwrite_refreshes_recency() {
    let cache = cache(2, TTL);
    cache.set("A", true);
    cache.set("B", true);
    cache.set("A", true);
    cache.set("C", true);

    assert!(cache.has("A"));
    assert!(!cache.has("B"));
}

/// `has` is a peek and does not protect an entry from eviction
#[tokio::test(start_paused = true)]
async fn has_does_not_refresh_recency() {
    let cache = cache(2, TTL);
    cache.set("A", true);
    cache.set("B", true);

    assert!(cache.has("A"));
    cache.set("C", true);

    assert!(!cache.has("A"));
    assert!(cache.has("B"));
}

#[tokio::test(start_paused = true)]
async fn eviction_listener_receives_victim() {
    let evicted = Arc::new(Mutex::new(Vec::new()));
    let e = Arc::clone(&evicted);
    let cache: ResultCache<u32> = ResultCache::new(
        CacheConfig::builder()
            .max_size(1)
            .on_eviction(move |key| e.lock().unwrap().push(key.to_string()))
            .build(),
    );

    cache.set("first", 1);
    cache.set("second", 2);
    cache.set("third", 3);

    assert_eq!(*evicted.lock().unwrap(), vec!["first", "second"]);
}

/// A zero capacity is clamped to one entry
#[tokio::test(start_paused = true)]
async fn zero_capacity_holds_one() {
    let cache = cache(0, TTL);
    cache.set("a", true);
    cache.set("b", true);

    assert_eq!(cache.len(), 1);
    assert_eq!(cache.stats().max_size, 1);
    assert!(cache.has("b"));
}
