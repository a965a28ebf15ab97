//! snapcache - An embedded key/value cache
//!
//! Stores typed values under string keys with lazy TTL expiration, optional
//! AES encryption of string values, binary snapshots and periodic snapshot
//! replication to a blob store.

pub mod cache;
pub mod config;
pub mod crypto;
pub mod error;
pub mod snapshot;
pub mod storage;
pub mod tasks;

pub use cache::{Cache, CacheOptions, Payload, Value};
pub use config::Config;
pub use error::{CacheError, Result};
pub use storage::{BlobStore, DirBlobStore};
pub use tasks::{persist_once, spawn_persist_task, PersistConfig};
