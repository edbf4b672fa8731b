//! Background refreshes: one-shot and periodic.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::SchoolData;
use crate::error::LocalStoreError;
use crate::models::EntityKind;
use crate::remote::RemoteBackend;
use crate::sync::SyncReport;
use crate::Result;

/// Handle to a refresh running on its own task.
///
/// Dropping the handle does not cancel the refresh.
#[derive(Debug)]
pub struct RefreshHandle {
    kind: EntityKind,
    handle: JoinHandle<Result<SyncReport>>,
}

impl RefreshHandle {
    pub const fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the refresh and return its outcome
    pub async fn join(self) -> Result<SyncReport> {
        self.handle
            .await
            .map_err(|error| LocalStoreError::Interrupted(error.to_string()))?
    }
}

/// Start refreshing `kind` without waiting for it.
///
/// Failures are logged as warnings and also returned from
/// [`RefreshHandle::join`].
pub fn spawn_refresh<B: RemoteBackend>(
    data: Arc<SchoolData<B>>,
    kind: EntityKind,
) -> RefreshHandle {
    let handle = tokio::spawn(async move { data.refresh(kind).await });
    RefreshHandle { kind, handle }
}

/// Shortest period `AutoSync` will run at; `tokio::time::interval` rejects zero.
pub const MIN_AUTO_SYNC_INTERVAL: Duration = Duration::from_millis(10);

/// Periodic refresh of every collection until stopped
#[derive(Debug)]
pub struct AutoSync {
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl AutoSync {
    /// Refresh immediately, then every `interval` (at least
    /// [`MIN_AUTO_SYNC_INTERVAL`]).
    pub fn start<B: RemoteBackend>(data: Arc<SchoolData<B>>, interval: Duration) -> Self {
        let interval = interval.max(MIN_AUTO_SYNC_INTERVAL);
        let (shutdown, mut stop) = watch::channel(false);

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            tracing::info!("Auto-sync started, every {interval:?}");

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let results = data.refresh_all().await;
                        let failed = results.iter().filter(|(_, result)| result.is_err()).count();
                        let merged: usize = results
                            .iter()
                            .filter_map(|(_, result)| result.as_ref().ok())
                            .map(|report| report.merged)
                            .sum();
                        tracing::debug!(
                            "Auto-sync pass complete: {merged} records merged, {failed} collections failed"
                        );
                    }
                    changed = stop.changed() => {
                        if changed.is_err() || *stop.borrow() {
                            break;
                        }
                    }
                }
            }

            tracing::info!("Auto-sync stopped");
        });

        Self { shutdown, handle }
    }

    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }

    /// Stop the loop and wait for an in-flight pass to finish
    pub async fn stop(self) {
        let _ = self.shutdown.send(true);
        if let Err(error) = self.handle.await {
            tracing::warn!("Auto-sync task ended abnormally: {error}");
        }
    }
}
