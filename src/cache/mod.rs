//! Cache Module
//!
//! Provides the in-memory entry store with lazy TTL expiration, encrypted
//! string operations and snapshot save/load.

mod crypt;
mod entry;
mod persistence;
mod store;
mod value;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use entry::{CacheEntry, UNBOUNDED_TTL_SECS};
pub use store::{Cache, CacheOptions};
pub use value::{Payload, Value};
