//! Snapshot file handling.

use std::ffi::OsString;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::error::Result;

/// Extension appended to every snapshot base path and object key.
pub const SNAPSHOT_EXTENSION: &str = ".snapcache";

/// Returns `base` with [`SNAPSHOT_EXTENSION`] appended.
pub fn snapshot_path(base: impl AsRef<Path>) -> PathBuf {
    let mut path = OsString::from(base.as_ref().as_os_str());
    path.push(SNAPSHOT_EXTENSION);
    PathBuf::from(path)
}

/// Writes snapshot bytes to `path`, replacing any existing file.
///
/// Bytes go to a temporary file in the same directory which is then renamed
/// over `path`, so a crash leaves either the old or the new snapshot. On Unix
/// the directory is synced afterwards so the rename itself is durable.
pub fn write_snapshot(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    sync_dir(dir)?;
    Ok(())
}

#[cfg(unix)]
fn sync_dir(dir: &Path) -> Result<()> {
    std::fs::File::open(dir)?.sync_all()?;
    Ok(())
}

// Directories cannot be opened as files here.
#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> Result<()> {
    Ok(())
}

/// Reads a whole snapshot file.
pub fn read_snapshot(path: &Path) -> Result<Vec<u8>> {
    Ok(std::fs::read(path)?)
}
