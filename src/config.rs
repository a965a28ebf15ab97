//! Configuration Module
//!
//! Handles loading cache and persistence configuration from environment variables.

use std::env;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::cache::CacheOptions;
use crate::tasks::PersistConfig;

/// Cache configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Clone)]
pub struct Config {
    /// Default TTL in seconds for entries without explicit TTL (0 = unbounded)
    pub default_ttl: u64,
    /// AES-256 key, 32 bytes
    pub cipher_key: Option<String>,
    /// AES initialization vector, 16 bytes
    pub cipher_iv: Option<String>,
    /// Persistence interval in seconds
    pub persist_interval: u64,
    /// Local base path snapshots are staged at before upload
    pub staging_path: PathBuf,
    /// Blob store key snapshots are published under
    pub object_key: String,
    /// Identifier of this instance, used in history object names
    pub instance_id: String,
    /// Root directory of the directory-backed blob store
    pub store_dir: PathBuf,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SNAPCACHE_DEFAULT_TTL` - Default TTL in seconds (default: 0, unbounded)
    /// - `SNAPCACHE_AES_CIPHER_KEY` - 32-byte cipher key (default: unset)
    /// - `SNAPCACHE_AES_CIPHER_IV` - 16-byte cipher IV (default: unset)
    /// - `SNAPCACHE_PERSIST_INTERVAL` - Persistence interval in seconds (default: 60)
    /// - `SNAPCACHE_STAGING_PATH` - Staging base path (default: ./snapcache-staging)
    /// - `SNAPCACHE_OBJECT_KEY` - Remote object key (default: snapcache)
    /// - `SNAPCACHE_INSTANCE_ID` - Instance identifier (default: local)
    /// - `SNAPCACHE_STORE_DIR` - Blob store directory (default: ./snapcache-store)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            default_ttl: env::var("SNAPCACHE_DEFAULT_TTL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.default_ttl),
            cipher_key: non_empty_var("SNAPCACHE_AES_CIPHER_KEY"),
            cipher_iv: non_empty_var("SNAPCACHE_AES_CIPHER_IV"),
            persist_interval: env::var("SNAPCACHE_PERSIST_INTERVAL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.persist_interval),
            staging_path: non_empty_var("SNAPCACHE_STAGING_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.staging_path),
            object_key: non_empty_var("SNAPCACHE_OBJECT_KEY").unwrap_or(defaults.object_key),
            instance_id: non_empty_var("SNAPCACHE_INSTANCE_ID").unwrap_or(defaults.instance_id),
            store_dir: non_empty_var("SNAPCACHE_STORE_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.store_dir),
        }
    }

    /// Construction options for the cache.
    pub fn cache_options(&self) -> CacheOptions {
        CacheOptions {
            default_ttl: self.default_ttl,
            cipher_key: self.cipher_key.as_ref().map(|k| k.as_bytes().to_vec()),
            cipher_iv: self.cipher_iv.as_ref().map(|iv| iv.as_bytes().to_vec()),
            ..CacheOptions::default()
        }
    }

    /// Settings for the persistence loop. A zero interval is raised to one second.
    pub fn persist_config(&self) -> PersistConfig {
        PersistConfig {
            interval: Duration::from_secs(self.persist_interval.max(1)),
            staging_path: self.staging_path.clone(),
            object_key: self.object_key.clone(),
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.is_empty())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_ttl: 0,
            cipher_key: None,
            cipher_iv: None,
            persist_interval: 60,
            staging_path: PathBuf::from("./snapcache-staging"),
            object_key: "snapcache".to_string(),
            instance_id: "local".to_string(),
            store_dir: PathBuf::from("./snapcache-store"),
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("default_ttl", &self.default_ttl)
            .field("encryption", &(self.cipher_key.is_some() && self.cipher_iv.is_some()))
            .field("persist_interval", &self.persist_interval)
            .field("staging_path", &self.staging_path)
            .field("object_key", &self.object_key)
            .field("instance_id", &self.instance_id)
            .field("store_dir", &self.store_dir)
            .finish()
    }
}
