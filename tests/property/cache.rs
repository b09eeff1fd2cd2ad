//! Property tests for the result cache.
//!
//! Invariants tested:
//! - Size never exceeds max_size
//! - Contents match a reference LRU model for any operation sequence
//! - Every get is counted as exactly one hit or miss

use mintguard_cache::{CacheConfig, ResultCache};
use proptest::prelude::*;
use std::collections::VecDeque;

#[derive(Debug, Clone)]
enum Op {
    Set(u8, u32),
    Get(u8),
    Has(u8),
    Invalidate(u8),
}

fn op() -> impl Strategy<Value = Op> {
    let key = 0u8..8;
    prop_oneof![
        3 => (key.clone(), any::<u32>()).prop_map(|(k, v)| Op::Set(k, v)),
        3 => key.clone().prop_map(Op::Get),
        1 => key.clone().prop_map(Op::Has),
        1 => key.prop_map(Op::Invalidate),
    ]
}

/// Least recently used at the front.
#[derive(Default)]
struct Model {
    entries: VecDeque<(String, u32)>,
    evictions: u64,
}

impl Model {
    fn position(&self, key: &str) -> Option<usize> {
        self.entries.iter().position(|(k, _)| k == key)
    }

    fn set(&mut self, key: String, value: u32, max_size: usize) {
        if let Some(i) = self.position(&key) {
            self.entries.remove(i);
        } else if self.entries.len() == max_size {
            self.entries.pop_front();
            self.evictions += 1;
        }
        self.entries.push_back((key, value));
    }

    fn get(&mut self, key: &str) -> Option<u32> {
        let i = self.position(key)?;
        let entry = self.entries.remove(i)?;
        let value = entry.1;
        self.entries.push_back(entry);
        Some(value)
    }

    fn invalidate(&mut self, key: &str) -> bool {
        match self.position(key) {
            Some(i) => {
                self.entries.remove(i);
                true
            }
            None => false,
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Property: the cache behaves like an LRU map bounded by max_size
    #[test]
    fn matches_lru_model(
        max_size in 1usize..=5,
        ops in prop::collection::vec(op(), 0..60),
    ) {
        let cache: ResultCache<u32> =
            ResultCache::new(CacheConfig::builder().max_size(max_size).build());
        let mut model = Model::default();
        let mut gets = 0u64;

        for op in ops {
            match op {
                Op::Set(k, v) => {
                    cache.set(k.to_string(), v);
                    model.set(k.to_string(), v, max_size);
                }
                Op::Get(k) => {
                    gets += 1;
                    prop_assert_eq!(cache.get(&k.to_string()), model.get(&k.to_string()));
                }
                Op::Has(k) => {
                    prop_assert_eq!(cache.has(&k.to_string()), model.position(&k.to_string()).is_some());
                }
                Op::Invalidate(k) => {
                    prop_assert_eq!(cache.invalidate(&k.to_string()), model.invalidate(&k.to_string()));
                }
            }
            prop_assert!(cache.len() <= max_size);
            prop_assert_eq!(cache.len(), model.entries.len());
        }

        let stats = cache.stats();
        prop_assert_eq!(stats.hits + stats.misses, gets);
        prop_assert_eq!(stats.evictions, model.evictions);
        prop_assert_eq!(stats.size, model.entries.len());
        prop_assert_eq!(stats.max_size, max_size);
    }

    /// Property: hit rate is always a fraction
    #[test]
    fn hit_rate_is_a_fraction(
        hits in 0usize..50,
        misses in 0usize..50,
    ) {
        let cache: ResultCache = ResultCache::default();
        cache.set("present", true);
        for _ in 0..hits {
            cache.get("present");
        }
        for _ in 0..misses {
            cache.get("absent");
        }

        let rate = cache.stats().hit_rate();
        prop_assert!((0.0..=1.0).contains(&rate));
        if hits + misses > 0 {
            let expected = hits as f64 / (hits + misses) as f64;
            prop_assert!((rate - expected).abs() < 1e-9);
        }
    }
}
