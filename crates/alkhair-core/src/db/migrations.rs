//! Schema migrations, applied in order on every open

use crate::error::Result;
use libsql::Connection;

struct Migration {
    version: i32,
    name: &'static str,
    statements: &'static [&'static str],
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "record collections",
        statements: &[
            // One logical collection per entity type. `payload` holds the
            // remote JSON representation of the record.
            "CREATE TABLE IF NOT EXISTS sync_records (
                collection TEXT NOT NULL,
                id TEXT NOT NULL,
                updated_at INTEGER NOT NULL,
                is_synced INTEGER NOT NULL DEFAULT 0,
                payload TEXT NOT NULL,
                PRIMARY KEY (collection, id)
            )",
            "CREATE INDEX IF NOT EXISTS idx_sync_records_updated
                ON sync_records(collection, updated_at DESC)",
        ],
    },
    Migration {
        version: 2,
        name: "pull cursors",
        statements: &["CREATE TABLE IF NOT EXISTS sync_cursors (
                collection TEXT PRIMARY KEY,
                last_sync INTEGER NOT NULL
            )"],
    },
];

/// Bring the schema up to the newest version
pub async fn run(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_version (version INTEGER PRIMARY KEY)",
        (),
    )
    .await?;

    let current = schema_version(conn).await?;
    for migration in MIGRATIONS.iter().filter(|m| m.version > current) {
        apply(conn, migration).await?;
        tracing::info!(
            "Migrated database to version {} ({})",
            migration.version,
            migration.name
        );
    }

    Ok(())
}

async fn schema_version(conn: &Connection) -> Result<i32> {
    let mut rows = conn
        .query("SELECT COALESCE(MAX(version), 0) FROM schema_version", ())
        .await?;

    match rows.next().await? {
        Some(row) => Ok(row.get(0)?),
        None => Ok(0),
    }
}

async fn apply(conn: &Connection, migration: &Migration) -> Result<()> {
    let tx = conn.transaction().await?;
    for statement in migration.statements {
        tx.execute(statement, ()).await?;
    }
    tx.execute(
        "INSERT INTO schema_version (version) VALUES (?1)",
        [migration.version],
    )
    .await?;
    tx.commit().await?;
    Ok(())
}
