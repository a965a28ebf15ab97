//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check store, snapshot and encryption behavior over
//! generated inputs.

use proptest::prelude::*;
use std::collections::HashMap;
use std::sync::Arc;
use std::thread::sleep;
use std::time::Duration;

use crate::cache::{Cache, CacheOptions, Value};

// == Test Configuration ==
const TEST_DEFAULT_TTL: u64 = 300;
const TEST_CIPHER_KEY: &[u8; 32] = b"k3y-k3y-k3y-k3y-k3y-k3y-k3y-k3y!";
const TEST_CIPHER_IV: &[u8; 16] = b"iv-iv-iv-iv-iv-!";

// == Strategies ==
/// Generates valid cache keys
fn valid_key_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_]{1,64}"
}

/// Generates values across the built-in variants
fn value_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::Int),
        (-1.0e9f64..1.0e9).prop_map(Value::Float),
        "[a-zA-Z0-9 ]{0,256}".prop_map(Value::Str),
        prop::collection::vec(any::<u8>(), 0..64).prop_map(Value::Bytes),
    ]
}

/// Generates a sequence of cache operations for testing
#[derive(Debug, Clone)]
enum CacheOp {
    Put { key: String, value: Value },
    Get { key: String },
    Delete { key: String },
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        (valid_key_strategy(), value_strategy())
            .prop_map(|(key, value)| CacheOp::Put { key, value }),
        valid_key_strategy().prop_map(|key| CacheOp::Get { key }),
        valid_key_strategy().prop_map(|key| CacheOp::Delete { key }),
    ]
}

fn encrypted_cache() -> Cache {
    Cache::new(CacheOptions {
        default_ttl: TEST_DEFAULT_TTL,
        cipher_key: Some(TEST_CIPHER_KEY.to_vec()),
        cipher_iv: Some(TEST_CIPHER_IV.to_vec()),
        ..CacheOptions::default()
    })
    .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // Storing a pair and reading it back before expiry returns the stored value.
    #[test]
    fn prop_roundtrip_storage(key in valid_key_strategy(), value in value_strategy()) {
        let cache = Cache::with_ttl(TEST_DEFAULT_TTL);

        cache.put(key.clone(), value.clone());

        prop_assert_eq!(cache.get(&key), Some(value));
    }

    // A second put on the same key wins and leaves exactly one entry.
    #[test]
    fn prop_overwrite_semantics(
        key in valid_key_strategy(),
        value1 in value_strategy(),
        value2 in value_strategy()
    ) {
        let cache = Cache::with_ttl(TEST_DEFAULT_TTL);

        cache.put(key.clone(), value1);
        cache.put(key.clone(), value2.clone());

        prop_assert_eq!(cache.get(&key), Some(value2));
        prop_assert_eq!(cache.count(), 1);
    }

    // The cache agrees with a HashMap model for any operation sequence.
    #[test]
    fn prop_matches_model(ops in prop::collection::vec(cache_op_strategy(), 1..60)) {
        let cache = Cache::with_ttl(TEST_DEFAULT_TTL);
        let mut model: HashMap<String, Value> = HashMap::new();

        for op in ops {
            match op {
                CacheOp::Put { key, value } => {
                    cache.put(key.clone(), value.clone());
                    model.insert(key, value);
                }
                CacheOp::Get { key } => {
                    prop_assert_eq!(cache.get(&key), model.get(&key).cloned());
                }
                CacheOp::Delete { key } => {
                    let existed = model.remove(&key).is_some();
                    prop_assert_eq!(cache.delete_safe(&key), existed);
                }
            }
        }

        prop_assert_eq!(cache.count(), model.len());
    }

    // Clear empties the cache whatever it held.
    #[test]
    fn prop_clear_empties(
        entries in prop::collection::vec((valid_key_strategy(), value_strategy()), 0..50)
    ) {
        let cache = Cache::with_ttl(TEST_DEFAULT_TTL);
        for (key, value) in &entries {
            cache.put(key.clone(), value.clone());
        }

        cache.clear();

        prop_assert_eq!(cache.count(), 0);
        for (key, _) in &entries {
            prop_assert_eq!(cache.get(key), None);
        }
    }

    // Snapshot bytes loaded into a fresh cache reproduce every entry.
    #[test]
    fn prop_snapshot_roundtrip(
        entries in prop::collection::hash_map(valid_key_strategy(), value_strategy(), 0..50)
    ) {
        let source = Cache::with_ttl(TEST_DEFAULT_TTL);
        for (key, value) in &entries {
            source.put(key.clone(), value.clone());
        }

        let target = Cache::with_ttl(TEST_DEFAULT_TTL);
        let loaded = target
            .restore_snapshot_bytes(&source.to_snapshot_bytes().unwrap())
            .unwrap();

        prop_assert_eq!(loaded, entries.len());
        prop_assert_eq!(target.count(), entries.len());
        for (key, value) in &entries {
            prop_assert_eq!(target.get(key), Some(value.clone()));
        }
    }

    // Any printable string survives put_crypt/get_crypt.
    #[test]
    fn prop_crypt_roundtrip(key in valid_key_strategy(), plaintext in "\\PC{0,200}") {
        let cache = encrypted_cache();

        cache.put_crypt(key.clone(), &plaintext).unwrap();

        prop_assert_eq!(cache.get_crypt(&key).unwrap(), plaintext);
    }
}

// Separate proptest block with fewer cases for time-sensitive TTL tests
proptest! {
    #![proptest_config(ProptestConfig::with_cases(5))]

    // After the TTL elapses, get misses and the entry is gone from the count.
    #[test]
    fn prop_ttl_expiration_behavior(
        key in valid_key_strategy(),
        value in value_strategy()
    ) {
        let cache = Cache::with_ttl(TEST_DEFAULT_TTL);

        cache.put_exp(key.clone(), value.clone(), 1);
        prop_assert_eq!(cache.count(), 1);

        sleep(Duration::from_millis(1100));

        prop_assert_eq!(cache.get(&key), None);
        prop_assert_eq!(cache.count(), 0);
    }
}

// == Property Test for Concurrent Operation Correctness ==
proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    // Concurrent writers on disjoint keys lose no updates.
    #[test]
    fn prop_concurrent_disjoint_writers(
        entries in prop::collection::hash_map(valid_key_strategy(), value_strategy(), 1..40)
    ) {
        let cache = Arc::new(Cache::with_ttl(TEST_DEFAULT_TTL));

        let handles: Vec<_> = entries
            .clone()
            .into_iter()
            .map(|(key, value)| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || cache.put(key, value))
            })
            .collect();

        for handle in handles {
            handle.join().expect("writer should not panic");
        }

        prop_assert_eq!(cache.count(), entries.len());
        for (key, value) in &entries {
            prop_assert_eq!(cache.get(key), Some(value.clone()));
        }
    }
}

// == Remote Round Trip ==
proptest! {
    #![proptest_config(ProptestConfig::with_cases(10))]

    // Persisting through a blob store and restoring yields the same entries.
    #[test]
    fn prop_remote_roundtrip(
        entries in prop::collection::hash_map(valid_key_strategy(), value_strategy(), 0..20)
    ) {
        use crate::storage::DirBlobStore;
        use crate::tasks::{persist_once, PersistConfig};

        let dir = tempfile::tempdir().unwrap();
        let store = DirBlobStore::new(dir.path().join("bucket"), dir.path(), "prop");
        let config = PersistConfig {
            interval: Duration::from_secs(60),
            staging_path: dir.path().join("staging"),
            object_key: "prop".to_string(),
        };

        let cache = Arc::new(Cache::with_ttl(TEST_DEFAULT_TTL));
        for (key, value) in &entries {
            cache.put(key.clone(), value.clone());
        }

        let restored = tokio_test::block_on(async {
            persist_once(&cache, &store, &config).await?;
            Cache::from_remote(&store, "prop", CacheOptions::with_ttl(TEST_DEFAULT_TTL)).await
        })
        .unwrap();

        prop_assert_eq!(restored.count(), entries.len());
        for (key, value) in &entries {
            prop_assert_eq!(restored.get(key), Some(value.clone()));
        }
    }
}

// == Additional Unit Tests for Edge Cases ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_verified_reports_match() {
        let cache = Cache::with_ttl(TEST_DEFAULT_TTL);
        assert!(cache.put_verified("k", Value::Float(1.5)));
    }

    #[test]
    fn test_put_verified_nan_never_matches() {
        // NaN is never equal to itself, so verification cannot succeed.
        let cache = Cache::with_ttl(TEST_DEFAULT_TTL);
        assert!(!cache.put_verified("k", Value::Float(f64::NAN)));
        assert!(cache.exists("k"));
    }
}
