//! Entity repositories
//!
//! One repository per entity type binds a local store and remote source to
//! the sync coordinator and adds read-side projections over the latest
//! snapshot.

mod cursor;
mod queries;

use tokio::sync::Mutex;

use crate::error::{Result, SyncError};
use crate::models::{
    Announcement, Attendance, Fee, Homework, Leave, Salary, Syncable, User,
};
use crate::remote::RemoteSource;
use crate::store::{LocalStore, Snapshot, Snapshots};
use crate::sync::{SyncCoordinator, SyncReport};
use crate::util::unix_millis_now;

pub use cursor::SyncCursor;

/// Repository for one entity collection
pub struct EntityRepository<T, L, R> {
    coordinator: SyncCoordinator<T, L, R>,
    cursor: SyncCursor,
    refresh_gate: Mutex<()>,
}

pub type UserRepository<L, R> = EntityRepository<User, L, R>;
pub type HomeworkRepository<L, R> = EntityRepository<Homework, L, R>;
pub type AnnouncementRepository<L, R> = EntityRepository<Announcement, L, R>;
pub type FeeRepository<L, R> = EntityRepository<Fee, L, R>;
pub type AttendanceRepository<L, R> = EntityRepository<Attendance, L, R>;
pub type SalaryRepository<L, R> = EntityRepository<Salary, L, R>;
pub type LeaveRepository<L, R> = EntityRepository<Leave, L, R>;

impl<T, L, R> EntityRepository<T, L, R>
where
    T: Syncable,
    L: LocalStore<T>,
    R: RemoteSource<T>,
{
    pub fn new(local: L, remote: R, cursor: SyncCursor) -> Self {
        Self {
            coordinator: SyncCoordinator::new(local, remote),
            cursor,
            refresh_gate: Mutex::new(()),
        }
    }

    /// Collection this repository serves
    pub const fn collection(&self) -> &'static str {
        T::COLLECTION
    }

    pub const fn local(&self) -> &L {
        self.coordinator.local()
    }

    /// Pull the delta after `last_sync`. Not serialized against other passes.
    pub async fn sync(&self, last_sync: i64) -> std::result::Result<(), SyncError> {
        self.coordinator.sync(last_sync).await
    }

    pub async fn pull(&self, last_sync: i64) -> std::result::Result<SyncReport, SyncError> {
        self.coordinator.pull(last_sync).await
    }

    /// Pull from the stored cursor and advance it.
    ///
    /// Refreshes of the same repository run one at a time so the cursor never
    /// skips a delta.
    pub async fn refresh(&self) -> Result<SyncReport> {
        let _gate = self.refresh_gate.lock().await;
        let last_sync = self.cursor.load().await?;
        let report = self.coordinator.pull(last_sync).await?;
        self.cursor.advance(report.cursor).await?;
        Ok(report)
    }

    /// Drop the stored cursor so the next refresh pulls everything again
    pub async fn reset_cursor(&self) -> Result<()> {
        let _gate = self.refresh_gate.lock().await;
        self.cursor.reset().await
    }

    pub async fn last_sync(&self) -> Result<i64> {
        self.cursor.load().await
    }

    pub fn observe_local(&self) -> Snapshots<T> {
        self.local().observe_local()
    }

    /// Latest snapshot of the collection
    pub fn snapshot(&self) -> Snapshot<T> {
        self.observe_local().current()
    }

    /// Look up one record in the latest snapshot
    pub fn find(&self, id: &str) -> Option<T> {
        self.snapshot().iter().find(|record| record.id() == id).cloned()
    }

    /// Records written locally and not yet confirmed by the remote
    pub fn unsynced(&self) -> Vec<T> {
        self.snapshot()
            .iter()
            .filter(|record| !record.is_synced())
            .cloned()
            .collect()
    }

    /// Store a locally authored record, stamping it as a fresh unsynced write
    pub async fn save_local(&self, mut record: T) -> Result<T> {
        record.touch(unix_millis_now());
        record.set_synced(false);
        self.local().insert_local(record.clone()).await?;
        Ok(record)
    }

    /// Remove a record locally. Remote deletion is not attempted.
    pub async fn delete_locally(&self, id: &str) -> Result<()> {
        self.local().delete_locally(id).await?;
        Ok(())
    }
}
