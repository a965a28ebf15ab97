//! Blob Store Module
//!
//! The remote object store that snapshots are replicated to, seen only
//! through the [`BlobStore`] trait.

mod local;

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::Result;
use crate::snapshot::SNAPSHOT_EXTENSION;

pub use local::DirBlobStore;

// == Blob Store Trait ==
/// Durable object storage for snapshot files.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Downloads the latest object for `key` to a local file and returns its
    /// path. Fails with `NotFound` if no such object exists.
    async fn fetch(&self, key: &str) -> Result<PathBuf>;

    /// Uploads `local_path` under a dated, instance-qualified history name
    /// for `key`, then points the latest object for `key` at it.
    async fn store(&self, local_path: &Path, key: &str) -> Result<()>;
}

// == Object Naming ==
/// Name of the object that always holds the newest snapshot for `key`.
pub fn latest_object_name(key: &str) -> String {
    format!("{}{}", key, SNAPSHOT_EXTENSION)
}

/// Name of the per-instance, per-day history object for `key`.
pub fn history_object_name(key: &str, instance_id: &str, date: NaiveDate) -> String {
    format!(
        "{}_{}_{}{}",
        key,
        instance_id,
        date.format("%m-%d-%Y"),
        SNAPSHOT_EXTENSION
    )
}
