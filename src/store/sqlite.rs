//! SQLite-backed record store.
//!
//! Records are stored as JSON payloads keyed by their storage key. The
//! schema is private to this module.

use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use super::{now_unix, RecordStore, UpdateFn};
use crate::error::{IndexError, Result};
use crate::record::{Record, RecordKey, RecordKind};

/// Persistent store over a single SQLite connection.
///
/// The connection sits behind a mutex and every `update` runs in its own
/// transaction, so concurrent writers are serialized per call.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) a database file.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        ensure_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| IndexError::Poisoned("sqlite connection"))
    }
}

fn ensure_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS records (
            key TEXT PRIMARY KEY NOT NULL,
            kind TEXT NOT NULL,
            data TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_records_kind ON records(kind);
        CREATE TABLE IF NOT EXISTS index_meta (
            id INTEGER PRIMARY KEY CHECK (id = 1),
            last_update INTEGER
        );",
    )?;
    Ok(())
}

fn read_record(conn: &Connection, storage_key: &str) -> Result<Option<Record>> {
    let mut stmt = conn.prepare_cached("SELECT data FROM records WHERE key = ?1")?;
    let data: Option<String> = stmt
        .query_row(params![storage_key], |row| row.get(0))
        .optional()?;

    match data {
        Some(json) => Ok(Some(serde_json::from_str(&json)?)),
        None => Ok(None),
    }
}

fn write_record(conn: &Connection, storage_key: &str, record: &Record) -> Result<()> {
    let data = serde_json::to_string(record)?;
    let mut stmt = conn.prepare_cached(
        "INSERT OR REPLACE INTO records (key, kind, data) VALUES (?1, ?2, ?3)",
    )?;
    stmt.execute(params![storage_key, record.kind().as_str(), data])?;
    Ok(())
}

impl RecordStore for SqliteStore {
    fn get(&self, key: &RecordKey) -> Result<Option<Record>> {
        let conn = self.lock()?;
        read_record(&conn, &key.storage_key())
    }

    fn entry(&self, key: &RecordKey) -> Result<Record> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let storage_key = key.storage_key();

        let record = match read_record(&tx, &storage_key)? {
            Some(record) => record,
            None => {
                let record = Record::default_for(key);
                write_record(&tx, &storage_key, &record)?;
                record
            }
        };

        tx.commit()?;
        Ok(record)
    }

    fn update(&self, key: &RecordKey, f: &mut UpdateFn<'_>) -> Result<bool> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let storage_key = key.storage_key();

        let mut record = read_record(&tx, &storage_key)?.unwrap_or_else(|| Record::default_for(key));

        // Dropping the transaction without commit rolls it back.
        if !f(&mut record)? {
            return Ok(false);
        }

        write_record(&tx, &storage_key, &record)?;
        tx.commit()?;
        Ok(true)
    }

    fn write(&self, record: &Record) -> Result<()> {
        let conn = self.lock()?;
        write_record(&conn, &record.key().storage_key(), record)
    }

    fn remove(&self, key: &RecordKey) -> Result<bool> {
        let conn = self.lock()?;
        let removed = conn.execute(
            "DELETE FROM records WHERE key = ?1",
            params![key.storage_key()],
        )?;
        Ok(removed > 0)
    }

    fn reset(&self) -> Result<()> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM records", [])?;
        tx.execute("DELETE FROM index_meta", [])?;
        tx.commit()?;
        Ok(())
    }

    fn update_timestamp(&self) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT OR REPLACE INTO index_meta (id, last_update) VALUES (1, ?1)",
            params![now_unix()],
        )?;
        Ok(())
    }

    fn last_update(&self) -> Result<Option<i64>> {
        let conn = self.lock()?;
        let ts: Option<Option<i64>> = conn
            .query_row("SELECT last_update FROM index_meta WHERE id = 1", [], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(ts.flatten())
    }

    fn count(&self, kind: RecordKind) -> Result<usize> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM records WHERE kind = ?1",
            params![kind.as_str()],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}
