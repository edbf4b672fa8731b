//! Incremental pull-merge synchronization.
//!
//! A sync pass fetches the remote delta after a cursor and upserts it into the
//! local store as one batch. There is no conflict resolution: an incoming
//! record replaces the local one with the same id regardless of `updated_at`.

use std::marker::PhantomData;

use crate::error::{LocalStoreError, SyncError};
use crate::models::Syncable;
use crate::remote::RemoteSource;
use crate::store::LocalStore;

/// Outcome of a successful pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncReport {
    pub collection: &'static str,
    /// Records upserted into the local store
    pub merged: usize,
    /// Cursor for the next pass: the newest `updated_at` seen, never lower
    /// than the cursor the pass started from
    pub cursor: i64,
}

/// Binds a local store and remote source for one entity type
#[derive(Debug)]
pub struct SyncCoordinator<T, L, R> {
    local: L,
    remote: R,
    _record: PhantomData<fn() -> T>,
}

impl<T, L, R> SyncCoordinator<T, L, R>
where
    T: Syncable,
    L: LocalStore<T>,
    R: RemoteSource<T>,
{
    pub const fn new(local: L, remote: R) -> Self {
        Self {
            local,
            remote,
            _record: PhantomData,
        }
    }

    pub const fn local(&self) -> &L {
        &self.local
    }

    pub const fn remote(&self) -> &R {
        &self.remote
    }

    /// Pull records updated after `last_sync` and merge them locally.
    ///
    /// Safe to retry with the same cursor. A failed fetch leaves the store
    /// untouched.
    pub async fn sync(&self, last_sync: i64) -> Result<(), SyncError> {
        self.pull(last_sync).await.map(|_| ())
    }

    /// Same as [`Self::sync`], reporting what was merged.
    pub async fn pull(&self, last_sync: i64) -> Result<SyncReport, SyncError> {
        let mut items = self.remote.fetch_remote_updated(last_sync).await?;

        let cursor = items
            .iter()
            .map(Syncable::updated_at)
            .fold(last_sync, i64::max);
        let merged = items.len();

        if !items.is_empty() {
            for item in &mut items {
                item.set_synced(true);
            }

            // Run the write on its own task: once the delta has been fetched it
            // is applied even if the caller drops this future.
            let store = self.local.clone();
            tokio::spawn(async move { store.insert_local_batch(items).await })
                .await
                .map_err(|error| LocalStoreError::Interrupted(error.to_string()))??;
        }

        tracing::debug!(
            "Synced {}: merged {merged} records after {last_sync}, cursor now {cursor}",
            T::COLLECTION
        );

        Ok(SyncReport {
            collection: T::COLLECTION,
            merged,
            cursor,
        })
    }
}
