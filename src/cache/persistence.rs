//! Snapshot save/load for the cache.
//!
//! The map is encoded under the entry lock; file I/O happens after the lock
//! is released.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::cache::{Cache, Payload};
use crate::error::Result;
use crate::snapshot::{read_snapshot, snapshot_path, write_snapshot};

impl Cache {
    /// Registers a record type with this cache's snapshot codec.
    ///
    /// Must be called before saving or loading snapshots containing records
    /// of type `T`.
    pub fn register_type<T: Payload>(&self) {
        self.codec.write().registry_mut().register::<T>();
    }

    // == Snapshot Bytes ==
    /// Encodes the whole map, expired-but-unpurged entries included.
    pub fn to_snapshot_bytes(&self) -> Result<Vec<u8>> {
        let entries = self.entries.lock();
        self.codec.read().encode(&entries)
    }

    /// Replaces the whole map with the decoded snapshot and returns the
    /// number of entries loaded. On error the map is left untouched.
    pub fn restore_snapshot_bytes(&self, bytes: &[u8]) -> Result<usize> {
        let loaded = self.codec.read().decode(bytes)?;
        let count = loaded.len();
        *self.entries.lock() = loaded;
        Ok(count)
    }

    // == Save ==
    /// Writes a snapshot to `base` + `.snapcache` and returns the file path.
    pub fn save_snapshot(&self, base: impl AsRef<Path>) -> Result<PathBuf> {
        let path = snapshot_path(base);
        let bytes = self.to_snapshot_bytes()?;
        write_snapshot(&path, &bytes)?;
        info!(path = %path.display(), bytes = bytes.len(), "Saved cache snapshot");
        Ok(path)
    }

    // == Load ==
    /// Loads the snapshot at `base` + `.snapcache`, replacing all entries.
    pub fn load_snapshot(&self, base: impl AsRef<Path>) -> Result<usize> {
        self.load_snapshot_file(&snapshot_path(base))
    }

    /// Loads a snapshot from an exact file path, replacing all entries.
    pub fn load_snapshot_file(&self, path: &Path) -> Result<usize> {
        let bytes = read_snapshot(path)?;
        let count = self.restore_snapshot_bytes(&bytes)?;
        info!(path = %path.display(), entries = count, "Loaded cache snapshot");
        Ok(count)
    }
}
