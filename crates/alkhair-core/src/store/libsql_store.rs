//! Durable store over the shared libSQL database

use std::marker::PhantomData;
use std::sync::Arc;

use libsql::Connection;
use tokio::sync::Mutex;

use super::{LocalStore, SnapshotPublisher, Snapshots};
use crate::db::Database;
use crate::error::LocalStoreError;
use crate::models::Syncable;

/// libSQL-backed store for one collection.
///
/// All collections share the `sync_records` table, partitioned by
/// `T::COLLECTION`. Writes and the snapshot reload that follows them happen
/// under the database lock, so published snapshots follow write order.
/// Open one store per collection per process; separate instances do not see
/// each other's notifications.
pub struct LibSqlStore<T> {
    db: Arc<Mutex<Database>>,
    snapshots: SnapshotPublisher<T>,
    _record: PhantomData<fn() -> T>,
}

impl<T> Clone for LibSqlStore<T> {
    fn clone(&self) -> Self {
        Self {
            db: Arc::clone(&self.db),
            snapshots: self.snapshots.clone(),
            _record: PhantomData,
        }
    }
}

impl<T: Syncable> LibSqlStore<T> {
    /// Open the collection and load its current contents
    pub async fn open(db: Arc<Mutex<Database>>) -> Result<Self, LocalStoreError> {
        let initial = {
            let guard = db.lock().await;
            Self::load_all(guard.connection()).await?
        };
        tracing::debug!(
            "Loaded {} cached {} records",
            initial.len(),
            T::COLLECTION
        );

        Ok(Self {
            db,
            snapshots: SnapshotPublisher::new(initial),
            _record: PhantomData,
        })
    }

    async fn load_all(conn: &Connection) -> Result<Vec<T>, LocalStoreError> {
        let mut rows = conn
            .query(
                "SELECT payload, is_synced FROM sync_records WHERE collection = ?",
                [T::COLLECTION],
            )
            .await?;

        let mut records = Vec::new();
        while let Some(row) = rows.next().await? {
            let payload: String = row.get(0)?;
            let is_synced = row.get::<i64>(1)? != 0;
            let mut record: T = serde_json::from_str(&payload)?;
            record.set_synced(is_synced);
            records.push(record);
        }
        Ok(records)
    }

    async fn write_batch(conn: &Connection, items: &[T]) -> Result<(), LocalStoreError> {
        conn.execute("BEGIN TRANSACTION", ()).await?;

        for item in items {
            if let Err(e) = Self::upsert(conn, item).await {
                conn.execute("ROLLBACK", ()).await.ok();
                return Err(e);
            }
        }

        if let Err(e) = conn.execute("COMMIT", ()).await {
            conn.execute("ROLLBACK", ()).await.ok();
            return Err(e.into());
        }
        Ok(())
    }

    async fn upsert(conn: &Connection, item: &T) -> Result<(), LocalStoreError> {
        let payload = serde_json::to_string(item)?;
        conn.execute(
            "INSERT OR REPLACE INTO sync_records (collection, id, updated_at, is_synced, payload)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            libsql::params![
                T::COLLECTION,
                item.id(),
                item.updated_at(),
                i64::from(item.is_synced()),
                payload
            ],
        )
        .await?;
        Ok(())
    }
}

impl<T: Syncable> LocalStore<T> for LibSqlStore<T> {
    fn observe_local(&self) -> Snapshots<T> {
        self.snapshots.subscribe()
    }

    async fn insert_local_batch(&self, items: Vec<T>) -> Result<(), LocalStoreError> {
        if items.is_empty() {
            return Ok(());
        }

        let db = self.db.lock().await;
        Self::write_batch(db.connection(), &items).await?;
        let records = Self::load_all(db.connection()).await?;
        self.snapshots.publish(records);
        tracing::debug!("Upserted {} {} records", items.len(), T::COLLECTION);
        Ok(())
    }

    async fn delete_locally(&self, id: &str) -> Result<(), LocalStoreError> {
        let db = self.db.lock().await;
        let removed = db
            .connection()
            .execute(
                "DELETE FROM sync_records WHERE collection = ?1 AND id = ?2",
                libsql::params![T::COLLECTION, id],
            )
            .await?;

        if removed > 0 {
            let records = Self::load_all(db.connection()).await?;
            self.snapshots.publish(records);
            tracing::debug!("Deleted {} record {id}", T::COLLECTION);
        }
        Ok(())
    }
}
