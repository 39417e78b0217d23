//! Expiry Sweep Tasks
//!
//! Two background loops that periodically evict expired entries: a frequent
//! cache sweep and a slower full scan of the durable store. Both observe
//! the same shutdown signal and stop promptly when it fires.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{watch, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::registry::Registry;

/// Which tier a sweep loop scans.
#[derive(Debug, Clone, Copy)]
enum SweepTier {
    Cache,
    Store,
}

impl SweepTier {
    fn name(self) -> &'static str {
        match self {
            SweepTier::Cache => "cache",
            SweepTier::Store => "store",
        }
    }
}

/// Spawns the cache and store sweep loops.
///
/// The cache sweep runs every `cache_interval_secs`; the store sweep runs
/// every `store_interval_secs` (a full store scan, so the interval should be
/// much longer). Both loops exit when a value is sent on the `shutdown`
/// channel. The returned handles let the owner await loop termination.
pub fn spawn_sweep_tasks(
    registry: Arc<RwLock<Registry>>,
    cache_interval_secs: u64,
    store_interval_secs: u64,
    shutdown: watch::Receiver<bool>,
) -> (JoinHandle<()>, JoinHandle<()>) {
    let cache_loop = spawn_sweep_loop(
        SweepTier::Cache,
        Arc::clone(&registry),
        cache_interval_secs,
        shutdown.clone(),
    );
    let store_loop = spawn_sweep_loop(SweepTier::Store, registry, store_interval_secs, shutdown);

    (cache_loop, store_loop)
}

fn spawn_sweep_loop(
    tier: SweepTier,
    registry: Arc<RwLock<Registry>>,
    interval_secs: u64,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(
            "starting {} sweep loop with interval of {} seconds",
            tier.name(),
            interval_secs
        );

        let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs));
        // The first tick completes immediately; consuming it here means the
        // first real sweep happens one full interval after startup.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    // The write lock is held only for the duration of one
                    // sweep pass, never across the sleep.
                    let removed = {
                        let mut registry = registry.write().await;
                        match tier {
                            SweepTier::Cache => registry.sweep_cache(Utc::now()),
                            SweepTier::Store => registry.sweep_store(Utc::now()),
                        }
                    };

                    if removed > 0 {
                        info!("{} sweep: removed {} expired entries", tier.name(), removed);
                    } else {
                        debug!("{} sweep: no expired entries found", tier.name());
                    }
                }
                _ = shutdown.changed() => {
                    info!("{} sweep loop stopping", tier.name());
                    break;
                }
            }
        }
    })
}
