//! Directory-backed blob store.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use tokio::fs;
use tracing::debug;

use super::{history_object_name, latest_object_name, BlobStore};
use crate::error::{CacheError, Result};
use crate::snapshot::SNAPSHOT_EXTENSION;

// == Dir Blob Store ==
/// A [`BlobStore`] whose objects are files under a root directory.
///
/// Usable against any mounted/shared filesystem, and as the store in tests.
#[derive(Debug, Clone)]
pub struct DirBlobStore {
    /// Directory holding the objects
    root: PathBuf,
    /// Directory that fetched objects are copied into
    download_dir: PathBuf,
    /// Instance identifier used in history object names
    instance_id: String,
}

impl DirBlobStore {
    pub fn new(
        root: impl Into<PathBuf>,
        download_dir: impl Into<PathBuf>,
        instance_id: impl Into<String>,
    ) -> Self {
        Self {
            root: root.into(),
            download_dir: download_dir.into(),
            instance_id: instance_id.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }
}

fn storage_error(action: &str, target: &Path, err: std::io::Error) -> CacheError {
    CacheError::Storage(format!("failed to {} {}: {}", action, target.display(), err))
}

#[async_trait]
impl BlobStore for DirBlobStore {
    async fn fetch(&self, key: &str) -> Result<PathBuf> {
        let source = self.root.join(latest_object_name(key));
        let exists = fs::try_exists(&source)
            .await
            .map_err(|e| storage_error("stat", &source, e))?;
        if !exists {
            return Err(CacheError::NotFound(latest_object_name(key)));
        }

        fs::create_dir_all(&self.download_dir)
            .await
            .map_err(|e| storage_error("create", &self.download_dir, e))?;

        let dest = self.download_dir.join(format!(
            "{}-{}{}",
            key.replace(['/', '\\'], "_"),
            Utc::now().format("%Y%m%dT%H%M%S%.6f"),
            SNAPSHOT_EXTENSION
        ));
        fs::copy(&source, &dest)
            .await
            .map_err(|e| storage_error("download", &source, e))?;

        debug!(key, path = %dest.display(), "Fetched snapshot object");
        Ok(dest)
    }

    async fn store(&self, local_path: &Path, key: &str) -> Result<()> {
        let history = self.root.join(history_object_name(
            key,
            &self.instance_id,
            Utc::now().date_naive(),
        ));
        let latest = self.root.join(latest_object_name(key));

        // Keys may carry a prefix such as "prod/cache".
        if let Some(parent) = history.parent() {
            create_parent(parent).await?;
        }
        if let Some(parent) = latest.parent() {
            create_parent(parent).await?;
        }

        fs::copy(local_path, &history)
            .await
            .map_err(|e| storage_error("upload", &history, e))?;

        // Alias latest through a rename so readers never see a partial copy.
        let partial = latest.with_file_name(format!(
            ".{}.partial",
            latest
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default()
        ));
        let aliased = match fs::copy(&history, &partial).await {
            Ok(_) => fs::rename(&partial, &latest)
                .await
                .map_err(|e| storage_error("alias", &latest, e)),
            Err(e) => Err(storage_error("copy", &partial, e)),
        };
        if aliased.is_err() {
            if let Err(e) = fs::remove_file(&partial).await {
                debug!(path = %partial.display(), error = %e, "No partial alias to remove");
            }
        }
        aliased?;

        debug!(key, history = %history.display(), "Stored snapshot object");
        Ok(())
    }
}

async fn create_parent(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir)
        .await
        .map_err(|e| storage_error("create", dir, e))
}
