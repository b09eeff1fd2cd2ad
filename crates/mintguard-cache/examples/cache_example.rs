use mintguard_cache::{CacheConfig, ResultCache};
use std::time::Duration;

#[tokio::main]
async fn main() {
    println!("Validation Result Cache Example");
    println!("===============================\n");

    let cache: ResultCache = ResultCache::new(
        CacheConfig::builder()
            .name("validation")
            .max_size(3)
            .ttl(Duration::from_secs(2))
            .on_hit(|key| println!("  [EVENT] hit {key}"))
            .on_miss(|key| println!("  [EVENT] miss {key}"))
            .on_eviction(|key| println!("  [EVENT] evicted {key}"))
            .on_expired(|n| println!("  [EVENT] swept {n} expired entries"))
            .build(),
    );

    println!("Test 1: Empty cache");
    println!("  entity-1 -> {:?}\n", cache.get("entity-1"));

    println!("Test 2: Store and read back");
    cache.set("entity-1", true);
    println!("  entity-1 -> {:?}\n", cache.get("entity-1"));

    println!("Test 3: Fill past capacity");
    cache.set("entity-2", false);
    cache.set("entity-3", true);
    cache.set("entity-4", true);
    println!("  has entity-1: {}\n", cache.has("entity-1"));

    println!("Test 4: Expiry");
    tokio::time::sleep(Duration::from_millis(2100)).await;
    println!("  removed {} entries\n", cache.maintain());

    let stats = cache.stats();
    println!("Stats:");
    println!("  hits: {}, misses: {}", stats.hits, stats.misses);
    println!("  evictions: {}, expirations: {}", stats.evictions, stats.expirations);
    println!("  hit rate: {:.0}%", stats.hit_rate() * 100.0);
}
