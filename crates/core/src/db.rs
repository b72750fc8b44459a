// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! SQLite-backed durable store.
//!
//! Records live in a single `pending_records` table. The `seq` column gives
//! insertion order; `id` is the public key handed to callers.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;

use crate::clock::{ClockSource, SystemClock};
use crate::error::{Error, Result};
use crate::id::generate_unique_id;
use crate::record::{PendingRecord, RecordType};
use crate::store::DurableStore;

/// Schema version stored in `PRAGMA user_version`.
pub const SCHEMA_VERSION: i64 = 1;

/// SQL schema for the pending record store.
pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS pending_records (
    seq INTEGER PRIMARY KEY AUTOINCREMENT,
    id TEXT NOT NULL UNIQUE,
    record_type TEXT NOT NULL,
    payload TEXT NOT NULL,
    created_at_ms INTEGER NOT NULL,
    synced INTEGER NOT NULL DEFAULT 0 CHECK (synced IN (0, 1))
);

CREATE INDEX IF NOT EXISTS idx_pending_record_type ON pending_records(record_type);
CREATE INDEX IF NOT EXISTS idx_pending_synced ON pending_records(synced);
"#;

const SELECT_COLUMNS: &str = "SELECT id, record_type, payload, created_at_ms, synced FROM pending_records";

/// Parse a string value from the database, returning a rusqlite error on parse failure.
fn parse_db<T: std::str::FromStr>(
    value: &str,
    column: &str,
) -> std::result::Result<T, rusqlite::Error> {
    value.parse().map_err(|_| {
        rusqlite::Error::FromSqlConversionFailure(
            0,
            rusqlite::types::Type::Text,
            Box::new(Error::CorruptedData(format!(
                "invalid value '{value}' in column '{column}'"
            ))),
        )
    })
}

fn row_to_record(row: &rusqlite::Row<'_>) -> std::result::Result<PendingRecord, rusqlite::Error> {
    let record_type: String = row.get("record_type")?;
    let payload: String = row.get("payload")?;
    let payload: Value = serde_json::from_str(&payload).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(
            0,
            rusqlite::types::Type::Text,
            Box::new(Error::CorruptedData(format!("invalid payload JSON: {e}"))),
        )
    })?;
    Ok(PendingRecord {
        id: row.get("id")?,
        record_type: parse_db(&record_type, "record_type")?,
        payload,
        created_at_ms: row.get("created_at_ms")?,
        synced: row.get("synced")?,
    })
}

/// Apply the schema and record the schema version.
///
/// Safe to run against an already-migrated database.
pub fn run_migrations(conn: &Connection) -> Result<()> {
    let version: i64 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;
    if version > SCHEMA_VERSION {
        return Err(Error::CorruptedData(format!(
            "database schema v{version} is newer than supported v{SCHEMA_VERSION}"
        )));
    }
    conn.execute_batch(SCHEMA)?;
    if version < SCHEMA_VERSION {
        conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;
    }
    Ok(())
}

#[derive(Debug, Clone)]
enum Location {
    File(PathBuf),
    Memory,
}

/// Pending record store backed by a SQLite database file.
pub struct SqliteStore {
    location: Location,
    conn: Mutex<Option<Connection>>,
    clock: Arc<dyn ClockSource>,
}

impl SqliteStore {
    /// Creates a store for the database at `path`. Nothing is opened until
    /// [`DurableStore::initialize`].
    pub fn new(path: impl AsRef<Path>) -> Self {
        SqliteStore {
            location: Location::File(path.as_ref().to_path_buf()),
            conn: Mutex::new(None),
            clock: Arc::new(SystemClock),
        }
    }

    /// Creates a store over a private in-memory database (for testing).
    pub fn in_memory() -> Self {
        SqliteStore {
            location: Location::Memory,
            conn: Mutex::new(None),
            clock: Arc::new(SystemClock),
        }
    }

    /// Replaces the clock used for `created_at_ms`.
    pub fn with_clock(mut self, clock: Arc<dyn ClockSource>) -> Self {
        self.clock = clock;
        self
    }

    /// Returns the database path, or `None` for in-memory stores.
    pub fn path(&self) -> Option<&Path> {
        match &self.location {
            Location::File(path) => Some(path),
            Location::Memory => None,
        }
    }

    fn open_connection(&self) -> Result<Connection> {
        match &self.location {
            Location::Memory => Connection::open_in_memory()
                .map_err(|e| Error::StorageUnavailable(e.to_string())),
            Location::File(path) => {
                if let Some(parent) = path.parent() {
                    if !parent.as_os_str().is_empty() {
                        fs::create_dir_all(parent).map_err(|e| {
                            Error::StorageUnavailable(format!(
                                "cannot create {}: {}",
                                parent.display(),
                                e
                            ))
                        })?;
                    }
                }
                let conn = Connection::open(path).map_err(|e| {
                    Error::StorageUnavailable(format!("cannot open {}: {}", path.display(), e))
                })?;
                conn.busy_timeout(Duration::from_secs(5))?;
                Ok(conn)
            }
        }
    }

    fn with_conn<T>(&self, f: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        let guard = self.conn.lock().unwrap_or_else(|e| e.into_inner());
        let conn = guard.as_ref().ok_or(Error::NotInitialized)?;
        f(conn)
    }

    fn query_records(
        conn: &Connection,
        filter: &str,
        params: impl rusqlite::Params,
    ) -> Result<Vec<PendingRecord>> {
        let sql = format!("{SELECT_COLUMNS} {filter} ORDER BY seq");
        let mut stmt = conn.prepare(&sql)?;
        let records = stmt
            .query_map(params, row_to_record)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(records)
    }
}

/// Whether `id` is already taken. A failed lookup counts as unused; the
/// primary key still rejects a real duplicate on insert.
fn id_in_use(conn: &Connection, id: &str) -> bool {
    conn.query_row(
        "SELECT 1 FROM pending_records WHERE id = ?1",
        params![id],
        |_| Ok(()),
    )
    .optional()
    .map(|found| found.is_some())
    .unwrap_or_else(|e| {
        tracing::warn!(id = %id, error = %e, "id lookup failed, assuming unused");
        false
    })
}

impl DurableStore for SqliteStore {
    fn initialize(&self) -> Result<()> {
        let mut guard = self.conn.lock().unwrap_or_else(|e| e.into_inner());
        if guard.is_some() {
            return Ok(());
        }

        let conn = self.open_connection()?;
        // A file that opens but cannot take the schema is as good as absent.
        run_migrations(&conn).map_err(|e| match e {
            Error::Storage(err) => Error::StorageUnavailable(err.to_string()),
            other => other,
        })?;

        tracing::debug!(location = ?self.location, "pending record store initialized");
        *guard = Some(conn);
        Ok(())
    }

    fn save(&self, record_type: RecordType, payload: Value) -> Result<String> {
        let created_at_ms = self.clock.now_ms();
        let payload_json = serde_json::to_string(&payload)?;

        self.with_conn(|conn| {
            let id = generate_unique_id(record_type, created_at_ms, |candidate| {
                id_in_use(conn, candidate)
            });

            conn.execute(
                "INSERT INTO pending_records (id, record_type, payload, created_at_ms, synced)
                 VALUES (?1, ?2, ?3, ?4, 0)",
                params![id, record_type.as_str(), payload_json, created_at_ms],
            )?;
            Ok(id)
        })
    }

    fn get_unsynced(&self) -> Result<Vec<PendingRecord>> {
        self.with_conn(|conn| Self::query_records(conn, "WHERE synced = 0", []))
    }

    fn mark_synced(&self, id: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "UPDATE pending_records SET synced = 1 WHERE id = ?1 AND synced = 0",
                params![id],
            )?;
            Ok(())
        })
    }

    fn clear_synced(&self) -> Result<usize> {
        self.with_conn(|conn| {
            let removed = conn.execute("DELETE FROM pending_records WHERE synced = 1", [])?;
            Ok(removed)
        })
    }

    fn get_by_type(&self, record_type: RecordType) -> Result<Vec<PendingRecord>> {
        self.with_conn(|conn| {
            Self::query_records(conn, "WHERE record_type = ?1", params![record_type.as_str()])
        })
    }

    fn delete(&self, id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let removed = conn.execute("DELETE FROM pending_records WHERE id = ?1", params![id])?;
            Ok(removed > 0)
        })
    }

    fn count_unsynced(&self) -> Result<usize> {
        self.with_conn(|conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM pending_records WHERE synced = 0",
                [],
                |row| row.get(0),
            )?;
            Ok(count.max(0) as usize)
        })
    }

    fn is_durable(&self) -> bool {
        matches!(self.location, Location::File(_))
    }
}

#[cfg(test)]
#[path = "db_tests.rs"]
mod tests;
