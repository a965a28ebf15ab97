//! snapcache - An embedded key/value cache
//!
//! Runs a cache warm-started from the latest remote snapshot and keeps
//! persisting it until shutdown.

use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tokio::sync::watch;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use snapcache::{
    persist_once, spawn_persist_task, BlobStore, Cache, CacheError, Config, DirBlobStore,
};

/// Main entry point.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Restore the cache from the blob store, or start empty if there is no snapshot
/// 4. Start the persistence task
/// 5. On Ctrl+C/SIGTERM, stop the task and persist one final time
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "snapcache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting snapcache");

    let config = Config::from_env();
    info!(
        "Configuration loaded: default_ttl={}s, persist_interval={}s, object_key={}, instance_id={}",
        config.default_ttl, config.persist_interval, config.object_key, config.instance_id
    );

    let store: Arc<dyn BlobStore> = Arc::new(DirBlobStore::new(
        &config.store_dir,
        std::env::temp_dir(),
        config.instance_id.clone(),
    ));

    let cache = match Cache::from_remote(store.as_ref(), &config.object_key, config.cache_options())
        .await
    {
        Ok(cache) => cache,
        Err(CacheError::NotFound(object)) => {
            info!("No remote snapshot {} found, starting empty", object);
            Cache::new(config.cache_options()).context("invalid cache configuration")?
        }
        Err(e) => return Err(e).context("failed to restore cache from remote snapshot"),
    };
    let cache = Arc::new(cache);
    info!(
        "Cache ready with {} entries, encryption {}",
        cache.count(),
        if cache.encryption_enabled() { "enabled" } else { "disabled" }
    );

    let persist_config = config.persist_config();
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let handle = spawn_persist_task(
        Arc::clone(&cache),
        Arc::clone(&store),
        persist_config.clone(),
        shutdown_rx,
    );

    shutdown_signal().await;

    if shutdown_tx.send(true).is_err() {
        warn!("Persistence task already stopped");
    }
    handle.await.context("persistence task panicked")?;

    if let Err(e) = persist_once(&cache, store.as_ref(), &persist_config).await {
        error!("Final persistence run failed: {}", e);
    }

    info!("Shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }
}
