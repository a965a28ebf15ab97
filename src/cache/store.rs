//! Cache Store Module
//!
//! Main cache engine: a HashMap of entries behind one lock, with lazy TTL
//! expiration enforced on read.

use std::collections::HashMap;

use parking_lot::{Mutex, RwLock};
use tracing::trace;

use crate::cache::{CacheEntry, Value, UNBOUNDED_TTL_SECS};
use crate::crypto::CryptoCodec;
use crate::error::Result;
use crate::snapshot::{SnapshotCodec, TypeRegistry};

// == Cache Options ==
/// Construction parameters for a [`Cache`].
#[derive(Clone, Default)]
pub struct CacheOptions {
    /// Default TTL in seconds; 0 means effectively unbounded
    pub default_ttl: u64,
    /// 32-byte AES key; encryption is disabled unless both key and IV are set
    pub cipher_key: Option<Vec<u8>>,
    /// 16-byte AES initialization vector
    pub cipher_iv: Option<Vec<u8>>,
    /// Record types the snapshot codec accepts
    pub types: TypeRegistry,
}

impl CacheOptions {
    pub fn with_ttl(default_ttl: u64) -> Self {
        Self {
            default_ttl,
            ..Self::default()
        }
    }
}

/// Outcome of a single locked lookup.
pub(crate) enum Lookup {
    Hit(Value),
    Missing,
    Expired,
}

// == Cache ==
/// Concurrency-safe key/value cache with lazy expiration.
///
/// Every map access goes through one mutex. Entries are never evicted in the
/// background: an expired entry stays in the map until a read touches it or
/// [`Cache::purge_expired`] is called, so [`Cache::count`] and
/// [`Cache::exists`] may include expired entries.
#[derive(Debug)]
pub struct Cache {
    pub(super) entries: Mutex<HashMap<String, CacheEntry>>,
    pub(super) default_ttl: u64,
    pub(super) crypto: Option<CryptoCodec>,
    pub(super) codec: RwLock<SnapshotCodec>,
}

impl Cache {
    // == Constructor ==
    /// Creates an empty cache.
    ///
    /// Fails with `Configuration` if a cipher key and IV are both supplied
    /// but have the wrong lengths.
    pub fn new(options: CacheOptions) -> Result<Self> {
        let crypto = CryptoCodec::from_parts(
            options.cipher_key.as_deref(),
            options.cipher_iv.as_deref(),
        )?;

        Ok(Self {
            entries: Mutex::new(HashMap::new()),
            default_ttl: resolve_default_ttl(options.default_ttl),
            crypto,
            codec: RwLock::new(SnapshotCodec::new(options.types)),
        })
    }

    /// Creates an unencrypted cache with the given default TTL.
    pub fn with_ttl(default_ttl: u64) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            default_ttl: resolve_default_ttl(default_ttl),
            crypto: None,
            codec: RwLock::new(SnapshotCodec::default()),
        }
    }

    /// Effective default TTL in seconds.
    pub fn default_ttl(&self) -> u64 {
        self.default_ttl
    }

    // == Put ==
    /// Stores a value with the default TTL, overwriting any existing entry.
    pub fn put(&self, key: impl Into<String>, value: impl Into<Value>) {
        self.insert(key.into(), value.into(), self.default_ttl);
    }

    /// Stores a value that expires `ttl_seconds` from now.
    pub fn put_exp(&self, key: impl Into<String>, value: impl Into<Value>, ttl_seconds: u64) {
        self.insert(key.into(), value.into(), ttl_seconds);
    }

    pub(super) fn insert(&self, key: String, value: Value, ttl_seconds: u64) {
        let entry = CacheEntry::new(value, ttl_seconds);
        self.entries.lock().insert(key, entry);
    }

    // == Put Verified ==
    /// Stores a value, then reads it back and reports whether it matches.
    ///
    /// The write and the read-back take the lock separately, so a concurrent
    /// writer on the same key can make this return false for a write that
    /// did succeed.
    pub fn put_verified(&self, key: impl Into<String>, value: impl Into<Value>) -> bool {
        self.put_verified_exp(key, value, self.default_ttl)
    }

    /// [`Cache::put_verified`] with an explicit TTL.
    pub fn put_verified_exp(
        &self,
        key: impl Into<String>,
        value: impl Into<Value>,
        ttl_seconds: u64,
    ) -> bool {
        let key = key.into();
        let value = value.into();
        self.insert(key.clone(), value.clone(), ttl_seconds);
        self.get(&key).is_some_and(|stored| stored == value)
    }

    // == Get ==
    /// Retrieves a live value.
    ///
    /// Returns None for a missing key and for an expired one; an expired
    /// entry is removed in the same critical section as the read.
    pub fn get(&self, key: &str) -> Option<Value> {
        match self.lookup(key) {
            Lookup::Hit(value) => Some(value),
            Lookup::Missing | Lookup::Expired => None,
        }
    }

    pub(crate) fn lookup(&self, key: &str) -> Lookup {
        let mut entries = self.entries.lock();
        match entries.get(key) {
            None => return Lookup::Missing,
            Some(entry) if !entry.is_expired() => return Lookup::Hit(entry.value.clone()),
            Some(_) => {}
        }
        entries.remove(key);
        trace!(key, "Removed expired entry on read");
        Lookup::Expired
    }

    // == Delete ==
    /// Removes an entry. Deleting a missing key is a no-op.
    pub fn delete(&self, key: &str) {
        self.entries.lock().remove(key);
    }

    /// Removes an entry and reports whether it was present just before.
    pub fn delete_safe(&self, key: &str) -> bool {
        self.entries.lock().remove(key).is_some()
    }

    // == Count ==
    /// Number of entries in the map, including expired ones not yet purged.
    pub fn count(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    // == Exists ==
    /// Presence check without expiry validation.
    pub fn exists(&self, key: &str) -> bool {
        self.entries.lock().contains_key(key)
    }

    // == Clear ==
    /// Removes every entry.
    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    // == Purge Expired ==
    /// Removes all expired entries in one pass and returns how many were
    /// removed. Runs only when called.
    pub fn purge_expired(&self) -> usize {
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired());
        before - entries.len()
    }
}

/// Maps a zero default TTL to [`UNBOUNDED_TTL_SECS`].
fn resolve_default_ttl(default_ttl: u64) -> u64 {
    if default_ttl == 0 {
        UNBOUNDED_TTL_SECS
    } else {
        default_ttl
    }
}
