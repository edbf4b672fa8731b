//! Local libSQL database handle

use crate::error::Result;
use libsql::{Builder, Connection, Database as LibSqlDatabase};
use std::path::Path;

use super::migrations;

/// Settings for a single-writer cache. `journal_mode` is refused for
/// in-memory databases, so pragma failures are ignored.
const PRAGMAS: &[&str] = &[
    "PRAGMA journal_mode = WAL",
    "PRAGMA synchronous = NORMAL",
    "PRAGMA cache_size = 10000",
];

/// Migrated libSQL database holding every synced collection
pub struct Database {
    _db: LibSqlDatabase,
    conn: Connection,
    location: String,
}

impl Database {
    /// Open (or create) the database file at `path` and migrate it.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::build(path.as_ref().to_string_lossy().into_owned()).await
    }

    pub async fn open_in_memory() -> Result<Self> {
        Self::build(":memory:".to_string()).await
    }

    async fn build(location: String) -> Result<Self> {
        let db = Builder::new_local(&location).build().await?;
        let conn = db.connect()?;

        for pragma in PRAGMAS {
            if let Err(error) = conn.query(pragma, ()).await {
                tracing::debug!("Ignoring `{pragma}` on {location}: {error}");
            }
        }
        migrations::run(&conn).await?;

        tracing::debug!("Opened local database at {location}");
        Ok(Self {
            _db: db,
            conn,
            location,
        })
    }

    /// Fold the write-ahead log back into the main file.
    pub async fn checkpoint(&self) -> Result<()> {
        self.conn
            .query("PRAGMA wal_checkpoint(TRUNCATE)", ())
            .await?;
        Ok(())
    }

    /// Where the database lives (`:memory:` for in-memory databases)
    pub fn location(&self) -> &str {
        &self.location
    }

    pub const fn connection(&self) -> &Connection {
        &self.conn
    }
}
