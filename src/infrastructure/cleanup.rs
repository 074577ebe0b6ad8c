//! Temporal Block Sweeper
//!
//! Periodic driver for the store's expiry sweep. Carries no logic of its
//! own beyond scheduling; block-check reads stay correct between sweeps
//! because the store computes liveness against the current time.

use crate::domain::ports::BlockedStore;
use crate::infrastructure::shutdown::ShutdownController;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Periodic expiry sweeper for temporal blocks.
pub struct TemporalBlockSweeper {
    store: Arc<dyn BlockedStore>,
    interval: Duration,
}

impl TemporalBlockSweeper {
    pub fn new(store: Arc<dyn BlockedStore>, interval: Duration) -> Self {
        Self { store, interval }
    }

    /// Spawn the sweep loop.
    ///
    /// Runs until the shutdown controller fires; cancellation between
    /// sweeps leaves no partial state since each sweep is a single store
    /// call.
    pub fn spawn(self, shutdown: &ShutdownController) -> JoinHandle<()> {
        let mut rx = shutdown.subscribe();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let removed = self.store.remove_expired_temporal();
                        if removed > 0 {
                            tracing::debug!("sweep removed {} expired temporal blocks", removed);
                        }
                    }
                    _ = rx.recv() => {
                        tracing::debug!("temporal block sweeper stopping");
                        break;
                    }
                }
            }
        })
    }
}
