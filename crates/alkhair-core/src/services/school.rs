//! Service object owning the database and every entity repository.

use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Mutex;

use crate::config::AppConfig;
use crate::db::Database;
use crate::error::RemoteError;
use crate::models::{
    Announcement, Attendance, EntityKind, Fee, Homework, Leave, Salary, Syncable, User,
};
use crate::remote::{PostgrestBackend, RemoteBackend};
use crate::repository::{EntityRepository, SyncCursor};
use crate::store::LibSqlStore;
use crate::sync::SyncReport;
use crate::Result;

/// Repository over the durable store and `B`'s source for `T`
pub type Repo<T, B> = EntityRepository<T, LibSqlStore<T>, <B as RemoteBackend>::Source<T>>;

/// One record of a snapshot, with its control fields pulled out
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordView {
    pub id: String,
    pub updated_at: i64,
    pub is_synced: bool,
    pub record: serde_json::Value,
}

/// Run `$body` against the repository for `$kind`
macro_rules! with_repo {
    ($self:ident, $kind:expr, |$repo:ident| $body:expr) => {
        match $kind {
            EntityKind::Users => {
                let $repo = &$self.users;
                $body
            }
            EntityKind::Homework => {
                let $repo = &$self.homework;
                $body
            }
            EntityKind::Announcements => {
                let $repo = &$self.announcements;
                $body
            }
            EntityKind::Fees => {
                let $repo = &$self.fees;
                $body
            }
            EntityKind::Attendance => {
                let $repo = &$self.attendance;
                $body
            }
            EntityKind::Salaries => {
                let $repo = &$self.salaries;
                $body
            }
            EntityKind::Leaves => {
                let $repo = &$self.leaves;
                $body
            }
        }
    };
}

/// Local database plus one repository per entity collection.
///
/// Pull cursors are persisted next to the records, so a refresh resumes where
/// the previous process stopped.
pub struct SchoolData<B: RemoteBackend> {
    db: Arc<Mutex<Database>>,
    backend: B,
    users: Repo<User, B>,
    homework: Repo<Homework, B>,
    announcements: Repo<Announcement, B>,
    fees: Repo<Fee, B>,
    attendance: Repo<Attendance, B>,
    salaries: Repo<Salary, B>,
    leaves: Repo<Leave, B>,
}

impl SchoolData<PostgrestBackend> {
    /// Open the database at `config.db_path` and talk to the configured
    /// Supabase project. Without remote settings every refresh fails but
    /// local reads still work.
    pub async fn open(config: &AppConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()
            .map_err(RemoteError::from)?;

        let backend = match &config.remote {
            Some(remote) => PostgrestBackend::from_config(client, remote)?,
            None => {
                tracing::info!("No remote backend configured; running offline");
                PostgrestBackend::unconfigured(client)
            }
        };

        Self::open_path(&config.db_path, backend).await
    }
}

impl<B: RemoteBackend> SchoolData<B> {
    /// Open a database file at `db_path`, creating parent directories.
    pub async fn open_path(db_path: &Path, backend: B) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let db = Database::open(db_path).await?;
        tracing::info!("Opened school database at {}", db_path.display());
        Self::with_database(db, backend).await
    }

    /// Open an in-memory database (primarily for tests).
    pub async fn open_in_memory(backend: B) -> Result<Self> {
        let db = Database::open_in_memory().await?;
        Self::with_database(db, backend).await
    }

    async fn with_database(db: Database, backend: B) -> Result<Self> {
        let db = Arc::new(Mutex::new(db));
        Ok(Self {
            users: build_repo(&db, &backend).await?,
            homework: build_repo(&db, &backend).await?,
            announcements: build_repo(&db, &backend).await?,
            fees: build_repo(&db, &backend).await?,
            attendance: build_repo(&db, &backend).await?,
            salaries: build_repo(&db, &backend).await?,
            leaves: build_repo(&db, &backend).await?,
            db,
            backend,
        })
    }

    /// Flush the write-ahead log and release the database.
    pub async fn close(self) {
        let db = self.db.lock().await;
        if let Err(error) = db.checkpoint().await {
            tracing::warn!("Checkpoint of {} on close failed: {error}", db.location());
        }
        tracing::info!("Closed school database at {}", db.location());
    }

    pub const fn backend(&self) -> &B {
        &self.backend
    }

    pub fn database(&self) -> Arc<Mutex<Database>> {
        Arc::clone(&self.db)
    }

    pub const fn users(&self) -> &Repo<User, B> {
        &self.users
    }

    pub const fn homework(&self) -> &Repo<Homework, B> {
        &self.homework
    }

    pub const fn announcements(&self) -> &Repo<Announcement, B> {
        &self.announcements
    }

    pub const fn fees(&self) -> &Repo<Fee, B> {
        &self.fees
    }

    pub const fn attendance(&self) -> &Repo<Attendance, B> {
        &self.attendance
    }

    pub const fn salaries(&self) -> &Repo<Salary, B> {
        &self.salaries
    }

    pub const fn leaves(&self) -> &Repo<Leave, B> {
        &self.leaves
    }

    /// Pull `kind` from its stored cursor and advance the cursor.
    pub async fn refresh(&self, kind: EntityKind) -> Result<SyncReport> {
        let result = with_repo!(self, kind, |repo| repo.refresh().await);
        match &result {
            Ok(report) => tracing::info!(
                "Refreshed {}: {} records merged, cursor {}",
                report.collection,
                report.merged,
                report.cursor
            ),
            Err(error) => tracing::warn!("Refresh of {kind} failed: {error}"),
        }
        result
    }

    /// Refresh every collection concurrently. One failure does not stop the
    /// others.
    pub async fn refresh_all(&self) -> Vec<(EntityKind, Result<SyncReport>)> {
        let (users, homework, announcements, fees, attendance, salaries, leaves) = tokio::join!(
            self.refresh(EntityKind::Users),
            self.refresh(EntityKind::Homework),
            self.refresh(EntityKind::Announcements),
            self.refresh(EntityKind::Fees),
            self.refresh(EntityKind::Attendance),
            self.refresh(EntityKind::Salaries),
            self.refresh(EntityKind::Leaves),
        );

        vec![
            (EntityKind::Users, users),
            (EntityKind::Homework, homework),
            (EntityKind::Announcements, announcements),
            (EntityKind::Fees, fees),
            (EntityKind::Attendance, attendance),
            (EntityKind::Salaries, salaries),
            (EntityKind::Leaves, leaves),
        ]
    }

    /// Pull everything after `since` without reading or moving the cursor.
    pub async fn pull_since(&self, kind: EntityKind, since: i64) -> Result<SyncReport> {
        let report = with_repo!(self, kind, |repo| repo.pull(since).await)?;
        Ok(report)
    }

    pub async fn reset_cursor(&self, kind: EntityKind) -> Result<()> {
        with_repo!(self, kind, |repo| repo.reset_cursor().await)
    }

    pub async fn last_sync(&self, kind: EntityKind) -> Result<i64> {
        with_repo!(self, kind, |repo| repo.last_sync().await)
    }

    pub async fn delete_locally(&self, kind: EntityKind, id: &str) -> Result<()> {
        with_repo!(self, kind, |repo| repo.delete_locally(id).await)
    }

    /// Current local snapshot of `kind`, newest first
    pub fn records(&self, kind: EntityKind) -> Result<Vec<RecordView>> {
        with_repo!(self, kind, |repo| record_views(&repo.snapshot()))
    }

    pub fn unsynced_count(&self, kind: EntityKind) -> usize {
        with_repo!(self, kind, |repo| repo.unsynced().len())
    }
}

async fn build_repo<T: Syncable, B: RemoteBackend>(
    db: &Arc<Mutex<Database>>,
    backend: &B,
) -> Result<Repo<T, B>> {
    let store = LibSqlStore::open(Arc::clone(db)).await?;
    let cursor = SyncCursor::database(Arc::clone(db), T::COLLECTION);
    Ok(EntityRepository::new(store, backend.source(), cursor))
}

fn record_views<T: Syncable>(records: &[T]) -> Result<Vec<RecordView>> {
    records
        .iter()
        .map(|record| {
            Ok(RecordView {
                id: record.id().to_string(),
                updated_at: record.updated_at(),
                is_synced: record.is_synced(),
                record: serde_json::to_value(record)?,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AttendanceStatus, FeeStatus, Role};
    use crate::remote::MemoryBackend;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 10, day).unwrap()
    }

    fn stamped<T: Syncable>(mut record: T, updated_at: i64) -> T {
        record.touch(updated_at);
        record
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn refresh_all_pulls_every_collection() {
        let backend = MemoryBackend::new();
        backend
            .put(&stamped(User::new("Amina", "amina@alkhair.test", Role::Student), 10))
            .unwrap();
        backend.put(&stamped(Fee::new("s1", "2024-10", 3000), 20)).unwrap();
        backend
            .put(&stamped(
                Attendance::new("s1", "7A", date(1), AttendanceStatus::Present),
                30,
            ))
            .unwrap();

        let data = SchoolData::open_in_memory(backend).await.unwrap();
        let results = data.refresh_all().await;

        assert_eq!(results.len(), EntityKind::ALL.len());
        assert!(results.iter().all(|(_, result)| result.is_ok()));
        assert_eq!(data.users().snapshot().len(), 1);
        assert_eq!(data.fees().outstanding_for("s1"), 3000);
        assert_eq!(data.last_sync(EntityKind::Attendance).await.unwrap(), 30);
        assert_eq!(data.last_sync(EntityKind::Leaves).await.unwrap(), 0);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn one_failing_collection_does_not_block_others() {
        let backend = MemoryBackend::new();
        backend.put(&stamped(Fee::new("s1", "2024-10", 3000), 20)).unwrap();
        backend
            .put(&stamped(Salary::new("t1", "2024-10", 50_000), 25))
            .unwrap();
        backend.fail_next::<Fee>(1);

        let data = SchoolData::open_in_memory(backend).await.unwrap();
        let results = data.refresh_all().await;

        let fees = results
            .iter()
            .find(|(kind, _)| *kind == EntityKind::Fees)
            .unwrap();
        assert!(fees.1.is_err());
        assert!(data.fees().snapshot().is_empty());
        assert_eq!(data.salaries().pending_total(), 50_000);
        assert_eq!(data.last_sync(EntityKind::Fees).await.unwrap(), 0);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn pull_since_leaves_cursor_alone() {
        let backend = MemoryBackend::new();
        backend
            .put(&stamped(Homework::new("7A", "Math", "Fractions", date(8), "t1"), 40))
            .unwrap();

        let data = SchoolData::open_in_memory(backend).await.unwrap();
        let report = data.pull_since(EntityKind::Homework, 0).await.unwrap();

        assert_eq!(report.merged, 1);
        assert_eq!(report.cursor, 40);
        assert_eq!(data.last_sync(EntityKind::Homework).await.unwrap(), 0);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn records_expose_control_fields() {
        let backend = MemoryBackend::new();
        let mut fee = stamped(Fee::new("s1", "2024-10", 3000), 20);
        fee.status = FeeStatus::Partial;
        fee.amount_paid = 1000;
        backend.put(&fee).unwrap();

        let data = SchoolData::open_in_memory(backend).await.unwrap();
        data.refresh(EntityKind::Fees).await.unwrap();
        data.fees()
            .save_local(Fee::new("s2", "2024-10", 3000))
            .await
            .unwrap();

        let views = data.records(EntityKind::Fees).unwrap();
        assert_eq!(views.len(), 2);
        assert_eq!(data.unsynced_count(EntityKind::Fees), 1);
        let pulled = views.iter().find(|view| view.id == fee.id).unwrap();
        assert!(pulled.is_synced);
        assert_eq!(pulled.updated_at, 20);
        assert_eq!(pulled.record["amount_paid"], 1000);
        assert!(pulled.record.get("is_synced").is_none());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn delete_and_reset_cursor() {
        let backend = MemoryBackend::new();
        let leave = stamped(Leave::new("t1", date(2), date(3), "family"), 50);
        backend.put(&leave).unwrap();

        let data = SchoolData::open_in_memory(backend).await.unwrap();
        data.refresh(EntityKind::Leaves).await.unwrap();
        data.delete_locally(EntityKind::Leaves, &leave.id).await.unwrap();
        assert!(data.leaves().snapshot().is_empty());

        let report = data.refresh(EntityKind::Leaves).await.unwrap();
        assert_eq!(report.merged, 0);

        data.reset_cursor(EntityKind::Leaves).await.unwrap();
        let report = data.refresh(EntityKind::Leaves).await.unwrap();
        assert_eq!(report.merged, 1);
        assert_eq!(data.leaves().pending().len(), 1);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn cursors_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("school").join("alkhair.db");
        let backend = MemoryBackend::new();
        backend
            .put(&stamped(Salary::new("t1", "2024-10", 50_000), 70))
            .unwrap();

        let data = SchoolData::open_path(&path, backend.clone()).await.unwrap();
        data.refresh(EntityKind::Salaries).await.unwrap();
        data.close().await;

        let data = SchoolData::open_path(&path, backend).await.unwrap();
        assert_eq!(data.last_sync(EntityKind::Salaries).await.unwrap(), 70);
        assert_eq!(data.salaries().snapshot().len(), 1);
    }
}
