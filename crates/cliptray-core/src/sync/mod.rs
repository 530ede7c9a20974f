//! Polling synchronizer.
//!
//! Pulls the full entry set from the backend on a fixed interval and swaps it
//! into the snapshot cache. Polling and server-side capture are paused and
//! resumed together through [`Synchronizer::set_monitoring`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::client::RemoteStore;
use crate::error::Result;
use crate::notice::NoticeBoard;
use crate::snapshot::SnapshotCache;

const FETCH_FAILED_NOTICE: &str = "Failed to fetch clipboard";

/// Owns the store handle, the snapshot cache and the monitoring gate.
pub struct Synchronizer<S> {
    store: Arc<S>,
    cache: SnapshotCache,
    notices: NoticeBoard,
    monitoring: Arc<AtomicBool>,
}

impl<S> Clone for Synchronizer<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            cache: self.cache.clone(),
            notices: self.notices.clone(),
            monitoring: Arc::clone(&self.monitoring),
        }
    }
}

impl<S: RemoteStore + 'static> Synchronizer<S> {
    /// Monitoring starts enabled.
    pub fn new(store: Arc<S>, cache: SnapshotCache, notices: NoticeBoard) -> Self {
        Self {
            store,
            cache,
            notices,
            monitoring: Arc::new(AtomicBool::new(true)),
        }
    }

    pub const fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub const fn cache(&self) -> &SnapshotCache {
        &self.cache
    }

    pub const fn notices(&self) -> &NoticeBoard {
        &self.notices
    }

    pub fn is_monitoring(&self) -> bool {
        self.monitoring.load(Ordering::SeqCst)
    }

    /// Fetch everything and replace the snapshot.
    ///
    /// On failure the snapshot is left as it was and a notice is posted.
    /// Returns the new snapshot generation.
    pub async fn resync(&self) -> Result<u64> {
        match self.store.list_entries().await {
            Ok(entries) => {
                let count = entries.len();
                let generation = self.cache.replace(entries);
                tracing::debug!(count, generation, "snapshot replaced");
                Ok(generation)
            }
            Err(error) => {
                tracing::warn!(%error, "clipboard fetch failed; keeping previous snapshot");
                self.notices.error(FETCH_FAILED_NOTICE);
                Err(error)
            }
        }
    }

    /// One poll tick: resync unless monitoring is paused.
    ///
    /// Returns `None` when the tick was skipped.
    pub async fn poll_once(&self) -> Option<Result<u64>> {
        if !self.is_monitoring() {
            tracing::trace!("monitoring paused; skipping poll");
            return None;
        }
        Some(self.resync().await)
    }

    /// Flip the client poll gate, then tell the backend to match.
    ///
    /// The two are not linked: if the backend call fails the client keeps
    /// the requested state and the server keeps its old one.
    pub async fn set_monitoring(&self, enabled: bool) -> Result<()> {
        self.monitoring.store(enabled, Ordering::SeqCst);
        tracing::info!(enabled, "monitoring toggled");

        match self.store.set_monitoring(enabled).await {
            Ok(()) => {
                self.notices.info(if enabled {
                    "Monitoring resumed"
                } else {
                    "Monitoring paused"
                });
                Ok(())
            }
            Err(error) => {
                tracing::warn!(%error, enabled, "backend did not acknowledge monitoring change");
                self.notices.error(if enabled {
                    "Failed to resume capture on backend"
                } else {
                    "Failed to pause capture on backend"
                });
                Err(error)
            }
        }
    }

    /// Spawn the periodic poll task. The first tick fires immediately.
    pub fn start(&self, interval: Duration) -> PollHandle {
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();
        let sync = self.clone();

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            tracing::info!(interval_ms = interval.as_millis(), "polling started");

            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => break,
                    _ = ticker.tick() => {
                        // Failures are already logged and noticed.
                        let _ = sync.poll_once().await;
                    }
                }
            }

            tracing::info!("polling stopped");
        });

        PollHandle {
            shutdown: Some(shutdown_tx),
            task: Some(task),
        }
    }
}

/// Running poll task. Dropping the handle aborts the task.
#[derive(Debug)]
pub struct PollHandle {
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl PollHandle {
    /// Ask the task to stop and wait for it. A fetch already in flight is
    /// allowed to finish and apply.
    pub async fn stop(mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(task) = self.task.take() {
            if let Err(error) = task.await {
                tracing::warn!(%error, "poll task ended abnormally");
            }
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.as_ref().map_or(true, JoinHandle::is_finished)
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
