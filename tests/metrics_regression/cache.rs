//! Cache metrics regression tests

use super::helpers::*;
use mintguard_cache::{CacheConfig, ResultCache};
use serial_test::serial;

#[tokio::test]
#[serial]
async fn cache_metrics_exist() {
    init_recorder();

    let cache: ResultCache = ResultCache::new(
        CacheConfig::builder()
            .name("test_cache")
            .max_size(2)
            .build(),
    );

    cache.get("a");
    cache.set("a", true);
    cache.get("a");
    cache.set("b", true);
    cache.set("c", false);

    assert_counter_exists("cache_requests_total");
    assert_metric_has_label("cache_requests_total", "cache", "test_cache");
    assert_metric_has_label("cache_requests_total", "result", "hit");
    assert_metric_has_label("cache_requests_total", "result", "miss");

    assert_counter_exists("cache_evictions_total");
    assert_metric_has_label("cache_evictions_total", "cache", "test_cache");

    assert_gauge_exists("cache_size");
    assert_metric_has_label("cache_size", "cache", "test_cache");
}

#[tokio::test]
#[serial]
async fn cache_counts_and_size() {
    init_recorder();

    let cache: ResultCache = ResultCache::new(
        CacheConfig::builder()
            .name("counted_cache")
            .max_size(3)
            .build(),
    );

    for i in 0..5 {
        cache.set(format!("urn:{i}"), true);
    }
    for i in 0..5 {
        cache.get(&format!("urn:{i}"));
    }
    cache.invalidate("urn:4");

    let requests = |result| {
        counter_value(
            "cache_requests_total",
            &[("cache", "counted_cache"), ("result", result)],
        )
    };
    assert_eq!(requests("hit"), 3);
    assert_eq!(requests("miss"), 2);
    assert_eq!(counter_value("cache_evictions_total", &[("cache", "counted_cache")]), 2);
    assert_eq!(gauge_value("cache_size", &[("cache", "counted_cache")]), Some(2.0));
}
