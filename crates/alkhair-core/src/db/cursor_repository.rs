//! Pull cursor ledger

use crate::error::Result;
use libsql::Connection;

/// Trait for per-collection `last_sync` cursor storage (async)
#[allow(async_fn_in_trait)]
pub trait CursorRepository {
    /// Load the cursor for a collection, `0` when it has never been synced
    async fn load(&self, collection: &str) -> Result<i64>;

    /// Advance the cursor. A value older than the stored one is ignored.
    async fn advance(&self, collection: &str, last_sync: i64) -> Result<()>;

    /// Forget the cursor so the next refresh pulls the full collection
    async fn reset(&self, collection: &str) -> Result<()>;
}

/// libSQL implementation of `CursorRepository`
pub struct LibSqlCursorRepository<'a> {
    conn: &'a Connection,
}

impl<'a> LibSqlCursorRepository<'a> {
    /// Create a new repository with the given connection
    pub const fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }
}

impl CursorRepository for LibSqlCursorRepository<'_> {
    async fn load(&self, collection: &str) -> Result<i64> {
        let mut rows = self
            .conn
            .query(
                "SELECT last_sync FROM sync_cursors WHERE collection = ?",
                [collection],
            )
            .await?;

        if let Some(row) = rows.next().await? {
            Ok(row.get::<i64>(0)?)
        } else {
            Ok(0)
        }
    }

    async fn advance(&self, collection: &str, last_sync: i64) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO sync_cursors (collection, last_sync) VALUES (?1, ?2)
                 ON CONFLICT(collection) DO UPDATE
                 SET last_sync = MAX(last_sync, excluded.last_sync)",
                libsql::params![collection, last_sync],
            )
            .await?;
        Ok(())
    }

    async fn reset(&self, collection: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM sync_cursors WHERE collection = ?", [collection])
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;

    async fn setup() -> Database {
        Database::open_in_memory().await.unwrap()
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_unknown_collection_starts_at_zero() {
        let db = setup().await;
        let repo = LibSqlCursorRepository::new(db.connection());

        assert_eq!(repo.load("homework").await.unwrap(), 0);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_advance_never_moves_backwards() {
        let db = setup().await;
        let repo = LibSqlCursorRepository::new(db.connection());

        repo.advance("homework", 200).await.unwrap();
        repo.advance("homework", 150).await.unwrap();
        assert_eq!(repo.load("homework").await.unwrap(), 200);

        repo.advance("homework", 300).await.unwrap();
        assert_eq!(repo.load("homework").await.unwrap(), 300);
        assert_eq!(repo.load("fees").await.unwrap(), 0);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_reset_clears_cursor() {
        let db = setup().await;
        let repo = LibSqlCursorRepository::new(db.connection());

        repo.advance("fees", 42).await.unwrap();
        repo.reset("fees").await.unwrap();
        assert_eq!(repo.load("fees").await.unwrap(), 0);
    }
}
