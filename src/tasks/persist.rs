//! Remote Persistence Task
//!
//! Periodically snapshots a cache and ships the snapshot to a blob store,
//! and warm-starts a cache from the latest remote snapshot.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::cache::{Cache, CacheOptions};
use crate::error::{CacheError, Result};
use crate::storage::BlobStore;

// == Persist Config ==
/// Settings for the periodic persistence loop.
#[derive(Debug, Clone)]
pub struct PersistConfig {
    /// Time between persistence runs
    pub interval: Duration,
    /// Local base path the snapshot is staged at (extension is appended)
    pub staging_path: PathBuf,
    /// Blob store key the snapshot is published under
    pub object_key: String,
}

// == Cold Start ==
impl Cache {
    /// Builds a cache from the latest snapshot stored under `object_key`.
    ///
    /// The object is fetched to a local file, loaded into a fresh cache and
    /// the local file is removed. Any failure aborts construction.
    pub async fn from_remote(
        store: &dyn BlobStore,
        object_key: &str,
        options: CacheOptions,
    ) -> Result<Cache> {
        let cache = Cache::new(options)?;
        let local = store.fetch(object_key).await?;

        let load_path = local.clone();
        let loaded = tokio::task::spawn_blocking(move || {
            cache.load_snapshot_file(&load_path).map(|count| (cache, count))
        })
        .await
        .map_err(|e| CacheError::Storage(format!("snapshot load task failed: {}", e)));

        let removed = tokio::fs::remove_file(&local).await;
        let (cache, count) = loaded??;
        removed?;

        info!(object_key, entries = count, "Cache restored from remote snapshot");
        Ok(cache)
    }
}

// == Persist Once ==
/// Runs one persistence unit: snapshot to the staging path, upload, then
/// remove the local file.
///
/// The local file is removed even if the upload fails.
pub async fn persist_once(
    cache: &Arc<Cache>,
    store: &dyn BlobStore,
    config: &PersistConfig,
) -> Result<()> {
    let snapshot_cache = Arc::clone(cache);
    let staging_path = config.staging_path.clone();
    let path = tokio::task::spawn_blocking(move || snapshot_cache.save_snapshot(staging_path))
        .await
        .map_err(|e| CacheError::Storage(format!("snapshot task failed: {}", e)))??;

    let uploaded = store.store(&path, &config.object_key).await;

    if let Err(e) = tokio::fs::remove_file(&path).await {
        if uploaded.is_ok() {
            return Err(e.into());
        }
        warn!(path = %path.display(), error = %e, "Failed to remove staged snapshot");
    }

    uploaded
}

// == Spawn Persist Task ==
/// Spawns the periodic persistence loop.
///
/// Each run is spawned as its own task and awaited before the next tick, so
/// runs never overlap on the staging path. Failures inside a run are logged
/// and the loop keeps going. The loop exits once `shutdown` carries `true`
/// or its sender is dropped; a run in progress is allowed to finish.
///
/// # Example
/// ```ignore
/// let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
/// let handle = spawn_persist_task(cache.clone(), store, config, shutdown_rx);
/// // Later, during shutdown:
/// shutdown_tx.send(true)?;
/// handle.await?;
/// ```
pub fn spawn_persist_task(
    cache: Arc<Cache>,
    store: Arc<dyn BlobStore>,
    config: PersistConfig,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    let period = config.interval.max(Duration::from_millis(1));

    tokio::spawn(async move {
        info!(
            "Starting persistence task with interval of {:?}, object key {}",
            period, config.object_key
        );

        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            if *shutdown.borrow() {
                break;
            }

            tokio::select! {
                _ = ticker.tick() => {}
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    continue;
                }
            }

            let unit = tokio::spawn({
                let cache = Arc::clone(&cache);
                let store = Arc::clone(&store);
                let config = config.clone();
                async move { persist_once(&cache, store.as_ref(), &config).await }
            });

            match unit.await {
                Ok(Ok(())) => debug!("Persistence run completed"),
                Ok(Err(e)) => error!(error = %e, "Persistence run failed"),
                Err(e) => error!(error = %e, "Persistence run panicked"),
            }
        }

        info!("Persistence task stopped");
    })
}
