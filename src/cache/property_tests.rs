//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check capacity, eviction order and expiry behavior.

use proptest::prelude::*;
use std::collections::HashSet;

use crate::cache::CacheStore;

// == Test Configuration ==
const TEST_MAX_SIZE: usize = 50;
const TEST_DEFAULT_TTL_MS: u64 = 300_000;

// == Strategies ==
/// Generates cache keys shaped like the dispatcher's keys
fn key_strategy() -> impl Strategy<Value = String> {
    ("(search|recommend)", "[a-z ]{1,16}", 1u32..50)
        .prop_map(|(tool, query, limit)| format!("{}:{}:{}", tool, query, limit))
}

fn value_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 ]{1,64}"
}

#[derive(Debug, Clone)]
enum CacheOp {
    Set { key: String, value: String },
    Get { key: String },
    Clear,
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        6 => (key_strategy(), value_strategy())
            .prop_map(|(key, value)| CacheOp::Set { key, value }),
        6 => key_strategy().prop_map(|key| CacheOp::Get { key }),
        1 => Just(CacheOp::Clear),
    ]
}

/// Deduplicates keys while keeping their first-seen order
fn unique_in_order(keys: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    keys.into_iter().filter(|k| seen.insert(k.clone())).collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // Size never exceeds max_size after any operation
    #[test]
    fn prop_capacity_enforcement(
        ops in prop::collection::vec(cache_op_strategy(), 1..200),
        max_size in 1usize..10
    ) {
        let mut store = CacheStore::new(max_size, TEST_DEFAULT_TTL_MS);

        for op in ops {
            match op {
                CacheOp::Set { key, value } => store.set(key, value, None),
                CacheOp::Get { key } => { let _ = store.get(&key); }
                CacheOp::Clear => store.clear(),
            }
            prop_assert!(
                store.len() <= max_size,
                "Cache size {} exceeds max {}",
                store.len(),
                max_size
            );
        }
    }

    // Hit and miss counters match the observed get results
    #[test]
    fn prop_statistics_accuracy(ops in prop::collection::vec(cache_op_strategy(), 1..50)) {
        let mut store = CacheStore::new(TEST_MAX_SIZE, TEST_DEFAULT_TTL_MS);
        let mut expected_hits: u64 = 0;
        let mut expected_misses: u64 = 0;

        for op in ops {
            match op {
                CacheOp::Set { key, value } => store.set(key, value, None),
                CacheOp::Get { key } => match store.get(&key) {
                    Some(_) => expected_hits += 1,
                    None => expected_misses += 1,
                },
                CacheOp::Clear => store.clear(),
            }
        }

        let stats = store.stats();
        prop_assert_eq!(stats.hits, expected_hits, "Hits mismatch");
        prop_assert_eq!(stats.misses, expected_misses, "Misses mismatch");
        prop_assert_eq!(stats.size, store.len(), "Size mismatch");
    }

    // A fresh value is returned verbatim before its TTL elapses
    #[test]
    fn prop_fresh_value_is_returned(
        key in key_strategy(),
        value in value_strategy(),
        ttl in 1u64..1_000_000,
        elapsed_fraction in 0u64..=100
    ) {
        let mut store = CacheStore::new(TEST_MAX_SIZE, TEST_DEFAULT_TTL_MS);
        let stored_at = 1_000_000;
        let now = stored_at + ttl * elapsed_fraction / 100;

        store.set_at(key.clone(), value.clone(), Some(ttl), stored_at);

        prop_assert_eq!(store.get_at(&key, now), Some(value));
    }

    // Once the TTL has elapsed the entry is absent and removed
    #[test]
    fn prop_expired_value_is_removed(
        key in key_strategy(),
        value in value_strategy(),
        ttl in 0u64..1_000_000,
        overshoot in 1u64..1_000_000
    ) {
        let mut store = CacheStore::new(TEST_MAX_SIZE, TEST_DEFAULT_TTL_MS);
        let stored_at = 1_000_000;

        store.set_at(key.clone(), value, Some(ttl), stored_at);

        prop_assert_eq!(store.get_at(&key, stored_at + ttl + overshoot), None);
        prop_assert_eq!(store.stats().size, 0);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // Filling past capacity evicts exactly the oldest inserted keys
    #[test]
    fn prop_insertion_order_eviction(
        keys in prop::collection::vec(key_strategy(), 2..30),
        capacity in 1usize..10
    ) {
        let unique_keys = unique_in_order(keys);
        prop_assume!(unique_keys.len() > capacity);

        let mut store = CacheStore::new(capacity, TEST_DEFAULT_TTL_MS);
        for key in &unique_keys {
            store.set(key.clone(), format!("value_{}", key), None);
        }

        let evicted = unique_keys.len() - capacity;
        for key in &unique_keys[..evicted] {
            prop_assert!(store.get(key).is_none(), "Key '{}' should have been evicted", key);
        }
        for key in &unique_keys[evicted..] {
            prop_assert_eq!(store.get(key), Some(format!("value_{}", key)));
        }
        prop_assert_eq!(store.stats().evictions, evicted as u64);
    }

    // Reads never protect a key from eviction
    #[test]
    fn prop_reads_do_not_affect_eviction(
        keys in prop::collection::vec(key_strategy(), 3..10),
        reads in prop::collection::vec(0usize..10, 0..20),
        new_key in key_strategy()
    ) {
        let unique_keys = unique_in_order(keys);
        prop_assume!(unique_keys.len() >= 2);
        prop_assume!(!unique_keys.contains(&new_key));

        let capacity = unique_keys.len();
        let mut store = CacheStore::new(capacity, TEST_DEFAULT_TTL_MS);
        for key in &unique_keys {
            store.set(key.clone(), key.clone(), None);
        }

        for index in reads {
            let _ = store.get(&unique_keys[index % capacity]);
        }

        store.set(new_key.clone(), new_key.clone(), None);

        prop_assert!(store.get(&unique_keys[0]).is_none());
        prop_assert!(store.get(&new_key).is_some());
        for key in unique_keys.iter().skip(1) {
            prop_assert!(store.get(key).is_some(), "Key '{}' should still exist", key);
        }
    }
}
