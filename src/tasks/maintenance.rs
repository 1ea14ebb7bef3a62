//! Maintenance Task
//!
//! Background task that periodically sweeps expired cache entries and
//! autosaves the size table.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::engine::SizingEngine;
use crate::error::{Result, SizingError};
use crate::persistence;

/// Runs a single maintenance pass.
///
/// Expired entries are removed from every transient cache, then the durable
/// size table is written to `save_path` when one is configured. Returns the
/// number of cache entries removed.
pub async fn run_maintenance_once(
    engine: &Arc<RwLock<SizingEngine>>,
    save_path: Option<&PathBuf>,
) -> Result<usize> {
    let (removed, snapshot) = {
        let mut guard = engine.write().await;
        let removed = guard.policy.purge_expired();
        (removed, guard.policy.snapshot())
    };

    if removed > 0 {
        info!("Maintenance: removed {} expired cache entries", removed);
    } else {
        debug!("Maintenance: no expired cache entries found");
    }

    if let Some(path) = save_path {
        let path = path.clone();
        let count = snapshot.len();
        tokio::task::spawn_blocking(move || persistence::save_to_path(&snapshot, &path))
            .await
            .map_err(|err| SizingError::Internal(format!("autosave task failed: {}", err)))??;
        debug!("Maintenance: saved {} size assignments", count);
    }

    Ok(removed)
}

/// Spawns a background task that runs [`run_maintenance_once`] every
/// `interval_secs` seconds.
///
/// Failures are logged and the loop keeps going. The returned handle is
/// aborted during graceful shutdown.
pub fn spawn_maintenance_task(
    engine: Arc<RwLock<SizingEngine>>,
    interval_secs: u64,
    save_path: Option<PathBuf>,
) -> JoinHandle<()> {
    let interval = maintenance_period(interval_secs);

    tokio::spawn(async move {
        info!(
            "Starting maintenance task with interval of {} seconds",
            interval.as_secs()
        );

        loop {
            tokio::time::sleep(interval).await;

            if let Err(err) = run_maintenance_once(&engine, save_path.as_ref()).await {
                warn!("Maintenance pass failed: {}", err);
            }
        }
    })
}

/// Sleep between passes. Never shorter than one second.
fn maintenance_period(interval_secs: u64) -> Duration {
    Duration::from_secs(interval_secs.max(1))
}
