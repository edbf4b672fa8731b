//! Where an entity repository keeps its pull cursor

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::db::{CursorRepository, Database, LibSqlCursorRepository};
use crate::error::Result;

/// Pull cursor storage for one collection
#[derive(Clone)]
pub enum SyncCursor {
    /// Lives only as long as the process
    Memory(Arc<AtomicI64>),
    /// Persisted in the `sync_cursors` table
    Database {
        db: Arc<Mutex<Database>>,
        collection: &'static str,
    },
}

impl SyncCursor {
    pub fn memory() -> Self {
        Self::Memory(Arc::new(AtomicI64::new(0)))
    }

    pub const fn database(db: Arc<Mutex<Database>>, collection: &'static str) -> Self {
        Self::Database { db, collection }
    }

    pub async fn load(&self) -> Result<i64> {
        match self {
            Self::Memory(value) => Ok(value.load(Ordering::Acquire)),
            Self::Database { db, collection } => {
                let db = db.lock().await;
                LibSqlCursorRepository::new(db.connection())
                    .load(collection)
                    .await
            }
        }
    }

    /// Move the cursor forward; older values are ignored
    pub async fn advance(&self, last_sync: i64) -> Result<()> {
        match self {
            Self::Memory(value) => {
                value.fetch_max(last_sync, Ordering::AcqRel);
                Ok(())
            }
            Self::Database { db, collection } => {
                let db = db.lock().await;
                LibSqlCursorRepository::new(db.connection())
                    .advance(collection, last_sync)
                    .await
            }
        }
    }

    pub async fn reset(&self) -> Result<()> {
        match self {
            Self::Memory(value) => {
                value.store(0, Ordering::Release);
                Ok(())
            }
            Self::Database { db, collection } => {
                let db = db.lock().await;
                LibSqlCursorRepository::new(db.connection())
                    .reset(collection)
                    .await
            }
        }
    }
}
