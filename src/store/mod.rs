//! Record store abstraction.
//!
//! The store is the only shared state in the index. Extractors and the
//! builder receive it by reference; nothing else holds index data.
//!
//! Two lookup flavours:
//! - [`RecordStore::get`] is fetch-or-absent and backs the query surface.
//! - [`RecordStore::entry`] and [`RecordStore::update`] are fetch-or-default
//!   and back the extractors, so a forward reference always has a record to
//!   attach its reverse edge to.

pub mod memory;
pub mod sqlite;

pub use memory::InMemoryStore;
pub use sqlite::SqliteStore;

use crate::error::{IndexError, Result};
use crate::provider::FileInfo;
use crate::record::{
    ClassRecord, FileRecord, FunctionRecord, MemberIdentifier, MemberRecord, Record, RecordKey,
    RecordKind,
};

/// Closure type accepted by [`RecordStore::update`].
///
/// Receives the current (or default) record and returns `Ok(true)` if it
/// changed and must be persisted.
pub type UpdateFn<'a> = dyn FnMut(&mut Record) -> Result<bool> + 'a;

/// Keyed record storage with per-key atomic read-modify-write.
pub trait RecordStore: Send + Sync {
    /// Fetch a record, or `None` if nothing is stored under `key`.
    fn get(&self, key: &RecordKey) -> Result<Option<Record>>;

    /// Fetch a record, creating and storing a default one if absent.
    fn entry(&self, key: &RecordKey) -> Result<Record>;

    /// Atomically read, mutate and conditionally persist the record at `key`.
    ///
    /// The closure sees the stored record or a default one. Nothing is
    /// written unless it returns `Ok(true)`; an error leaves the stored
    /// record untouched. Returns whether a write happened.
    fn update(&self, key: &RecordKey, f: &mut UpdateFn<'_>) -> Result<bool>;

    /// Upsert a record under its own key.
    fn write(&self, record: &Record) -> Result<()>;

    /// Delete a record. Returns false if it did not exist.
    fn remove(&self, key: &RecordKey) -> Result<bool>;

    /// Discard every record and the freshness stamp.
    fn reset(&self) -> Result<()>;

    /// Stamp the index as refreshed now.
    fn update_timestamp(&self) -> Result<()>;

    /// Unix seconds of the last completed index pass.
    fn last_update(&self) -> Result<Option<i64>>;

    /// Number of stored records of `kind`.
    fn count(&self, kind: RecordKind) -> Result<usize>;

    /// True if the file was indexed and has not changed since the last
    /// completed pass, nor since its own record was written.
    fn is_fresh(&self, file: &FileInfo) -> Result<bool> {
        let last_update = match self.last_update()? {
            Some(ts) => ts,
            None => return Ok(false),
        };
        let key = RecordKey::file(file.path.to_string_lossy());
        let recorded = match self.get(&key)? {
            Some(Record::File(record)) => record.last_modified(),
            _ => return Ok(false),
        };
        Ok(file.last_modified < last_update
            && recorded.is_some_and(|mtime| file.last_modified <= mtime))
    }
}

fn mismatch(key: &RecordKey, found: &Record) -> IndexError {
    IndexError::KindMismatch {
        key: key.storage_key(),
        expected: key.kind(),
        found: found.kind(),
    }
}

/// Typed accessors over any [`RecordStore`].
///
/// Every accessor checks that the stored variant agrees with the key kind
/// and raises [`IndexError::KindMismatch`] otherwise.
pub trait StoreExt: RecordStore {
    fn class(&self, fqn: &str) -> Result<Option<ClassRecord>> {
        let key = RecordKey::class(fqn);
        match self.get(&key)? {
            None => Ok(None),
            Some(Record::Class(record)) => Ok(Some(record)),
            Some(other) => Err(mismatch(&key, &other)),
        }
    }

    fn class_entry(&self, fqn: &str) -> Result<ClassRecord> {
        let key = RecordKey::class(fqn);
        match self.entry(&key)? {
            Record::Class(record) => Ok(record),
            other => Err(mismatch(&key, &other)),
        }
    }

    fn function(&self, fqn: &str) -> Result<Option<FunctionRecord>> {
        let key = RecordKey::function(fqn);
        match self.get(&key)? {
            None => Ok(None),
            Some(Record::Function(record)) => Ok(Some(record)),
            Some(other) => Err(mismatch(&key, &other)),
        }
    }

    fn member(&self, identifier: &MemberIdentifier) -> Result<Option<MemberRecord>> {
        let key = RecordKey::member(identifier.clone());
        match self.get(&key)? {
            None => Ok(None),
            Some(Record::Member(record)) => Ok(Some(record)),
            Some(other) => Err(mismatch(&key, &other)),
        }
    }

    fn file_record(&self, path: &str) -> Result<Option<FileRecord>> {
        let key = RecordKey::file(path);
        match self.get(&key)? {
            None => Ok(None),
            Some(Record::File(record)) => Ok(Some(record)),
            Some(other) => Err(mismatch(&key, &other)),
        }
    }

    fn update_class<F>(&self, fqn: &str, mut f: F) -> Result<bool>
    where
        F: FnMut(&mut ClassRecord) -> bool,
    {
        let key = RecordKey::class(fqn);
        self.update(&key, &mut |record| match record {
            Record::Class(class) => Ok(f(class)),
            other => Err(mismatch(&key, other)),
        })
    }

    fn update_function<F>(&self, fqn: &str, mut f: F) -> Result<bool>
    where
        F: FnMut(&mut FunctionRecord) -> bool,
    {
        let key = RecordKey::function(fqn);
        self.update(&key, &mut |record| match record {
            Record::Function(function) => Ok(f(function)),
            other => Err(mismatch(&key, other)),
        })
    }

    fn update_member<F>(&self, identifier: &MemberIdentifier, mut f: F) -> Result<bool>
    where
        F: FnMut(&mut MemberRecord) -> bool,
    {
        let key = RecordKey::member(identifier.clone());
        self.update(&key, &mut |record| match record {
            Record::Member(member) => Ok(f(member)),
            other => Err(mismatch(&key, other)),
        })
    }
}

impl<S: RecordStore + ?Sized> StoreExt for S {}

/// Current time in unix seconds.
pub(crate) fn now_unix() -> i64 {
    chrono::Utc::now().timestamp()
}
