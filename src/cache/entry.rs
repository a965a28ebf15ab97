//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::cache::Value;

/// TTL used when the cache is created with a default TTL of zero (1000 years).
pub const UNBOUNDED_TTL_SECS: u64 = 1000 * 365 * 24 * 60 * 60;

// == Cache Entry ==
/// Represents a single cache entry with value and expiration time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// The stored value
    pub value: Value,
    /// Absolute UTC expiration time
    pub expires_at: DateTime<Utc>,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new cache entry expiring `ttl_seconds` from now.
    ///
    /// TTLs above [`UNBOUNDED_TTL_SECS`] are clamped to it.
    pub fn new(value: Value, ttl_seconds: u64) -> Self {
        Self {
            value,
            expires_at: expiry_from(Utc::now(), ttl_seconds),
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// Boundary condition: an entry is expired once the current time is
    /// greater than or equal to its expiration time, so a TTL of zero expires
    /// immediately.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Checks expiry against an explicit clock reading.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

// == Utility Functions ==
/// Computes the absolute expiration time for a TTL starting at `now`.
pub fn expiry_from(now: DateTime<Utc>, ttl_seconds: u64) -> DateTime<Utc> {
    let secs = ttl_seconds.min(UNBOUNDED_TTL_SECS) as i64;
    now + Duration::seconds(secs)
}
