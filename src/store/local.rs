//! Durable local tier — a key/value table in SQLite.
//!
//! Every collection (items, practice log) is stored as one serialized JSON
//! value under a well-known key. Writes are synchronous and committed before
//! any remote attempt is made, so the local copy is always a complete,
//! current snapshot regardless of sync health.

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Mutex;

/// The schema version that the current binary expects.
pub const CURRENT_SCHEMA_VERSION: u32 = 2;

/// All DDL for the local tier. Idempotent (uses IF NOT EXISTS).
const SCHEMA_SQL: &str = r#"
-- One row per stored collection, value is serialized JSON
CREATE TABLE IF NOT EXISTS records (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL DEFAULT ''
);

-- Schema metadata
CREATE TABLE IF NOT EXISTS schema_meta (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
"#;

/// The always-available storage tier backing every read and write.
///
/// The connection sits behind a mutex; all operations are short,
/// non-reentrant critical sections with no await points inside the lock.
#[derive(Debug)]
pub struct LocalTier {
    conn: Mutex<Connection>,
}

impl LocalTier {
    /// Open (or create) the local database at the given path, with schema
    /// initialized and migrations applied.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {}", parent.display()))?;
        }

        let conn = Connection::open(path)
            .with_context(|| format!("failed to open database at {}", path.display()))?;

        // WAL mode for better concurrent read performance
        conn.pragma_update(None, "journal_mode", "WAL")?;

        init_schema(&conn).context("failed to initialize schema")?;
        run_migrations(&conn).context("failed to run migrations")?;

        tracing::info!(path = %path.display(), "local tier initialized");
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory local tier for testing.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("failed to open in-memory database")?;
        init_schema(&conn)?;
        run_migrations(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Read the serialized value stored under `key`, if any.
    pub fn read(&self, key: &str) -> Result<Option<String>> {
        let conn = self.conn.lock().expect("local tier lock poisoned");
        let value = conn
            .query_row(
                "SELECT value FROM records WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    /// Write `value` under `key`, replacing any previous value.
    pub fn write(&self, key: &str, value: &str) -> Result<()> {
        let now = chrono::Utc::now().to_rfc3339();
        let conn = self.conn.lock().expect("local tier lock poisoned");
        conn.execute(
            "INSERT OR REPLACE INTO records (key, value, updated_at) VALUES (?1, ?2, ?3)",
            params![key, value, now],
        )?;
        Ok(())
    }

    /// Remove the value stored under `key`. Missing keys are a no-op.
    pub fn remove(&self, key: &str) -> Result<()> {
        let conn = self.conn.lock().expect("local tier lock poisoned");
        conn.execute("DELETE FROM records WHERE key = ?1", params![key])?;
        Ok(())
    }

}

/// Initialize all tables. Idempotent.
fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)?;

    // Set initial schema version if not already present
    conn.execute(
        "INSERT OR IGNORE INTO schema_meta (key, value) VALUES ('schema_version', '1')",
        [],
    )?;

    Ok(())
}

/// Get the current schema version from the database.
pub fn get_schema_version(conn: &Connection) -> rusqlite::Result<u32> {
    conn.query_row(
        "SELECT value FROM schema_meta WHERE key = 'schema_version'",
        [],
        |row| {
            let val: String = row.get(0)?;
            Ok(val.parse::<u32>().unwrap_or(0))
        },
    )
}

fn update_schema_version(conn: &Connection, version: u32) -> rusqlite::Result<()> {
    conn.execute(
        "UPDATE schema_meta SET value = ?1 WHERE key = 'schema_version'",
        [version.to_string()],
    )?;
    Ok(())
}

/// Run any pending forward-only migrations.
fn run_migrations(conn: &Connection) -> rusqlite::Result<()> {
    let mut version = get_schema_version(conn)?;
    tracing::debug!(schema_version = version, target = CURRENT_SCHEMA_VERSION, "checking migrations");

    while version < CURRENT_SCHEMA_VERSION {
        let next = version + 1;
        tracing::info!(from = version, to = next, "running migration");

        match next {
            2 => migrate_v1_to_v2(conn)?,
            _ => {
                tracing::error!(version = next, "unknown migration target");
                break;
            }
        }

        update_schema_version(conn, next)?;
        version = next;
    }

    Ok(())
}

/// Migration v1 → v2: v1 tables predate the `updated_at` column.
fn migrate_v1_to_v2(conn: &Connection) -> rusqlite::Result<()> {
    let has_column: bool = conn.query_row(
        "SELECT COUNT(*) > 0 FROM pragma_table_info('records') WHERE name = 'updated_at'",
        [],
        |row| row.get(0),
    )?;
    if !has_column {
        conn.execute(
            "ALTER TABLE records ADD COLUMN updated_at TEXT NOT NULL DEFAULT ''",
            [],
        )?;
    }
    Ok(())
}
