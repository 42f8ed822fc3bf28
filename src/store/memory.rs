use std::collections::HashMap;
use std::sync::RwLock;

use super::{now_unix, RecordStore, UpdateFn};
use crate::error::{IndexError, Result};
use crate::record::{Record, RecordKey, RecordKind};

/// Process-local store. Update closures run under the write lock, which
/// serializes every read-modify-write.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    records: RwLock<HashMap<String, Record>>,
    last_update: RwLock<Option<i64>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records of every kind.
    pub fn len(&self) -> Result<usize> {
        let records = self
            .records
            .read()
            .map_err(|_| IndexError::Poisoned("records"))?;
        Ok(records.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

impl RecordStore for InMemoryStore {
    fn get(&self, key: &RecordKey) -> Result<Option<Record>> {
        let records = self
            .records
            .read()
            .map_err(|_| IndexError::Poisoned("records"))?;
        Ok(records.get(&key.storage_key()).cloned())
    }

    fn entry(&self, key: &RecordKey) -> Result<Record> {
        let mut records = self
            .records
            .write()
            .map_err(|_| IndexError::Poisoned("records"))?;
        let record = records
            .entry(key.storage_key())
            .or_insert_with(|| Record::default_for(key));
        Ok(record.clone())
    }

    fn update(&self, key: &RecordKey, f: &mut UpdateFn<'_>) -> Result<bool> {
        let mut records = self
            .records
            .write()
            .map_err(|_| IndexError::Poisoned("records"))?;
        let storage_key = key.storage_key();
        let mut record = records
            .get(&storage_key)
            .cloned()
            .unwrap_or_else(|| Record::default_for(key));

        if !f(&mut record)? {
            return Ok(false);
        }
        records.insert(storage_key, record);
        Ok(true)
    }

    fn write(&self, record: &Record) -> Result<()> {
        let mut records = self
            .records
            .write()
            .map_err(|_| IndexError::Poisoned("records"))?;
        records.insert(record.key().storage_key(), record.clone());
        Ok(())
    }

    fn remove(&self, key: &RecordKey) -> Result<bool> {
        let mut records = self
            .records
            .write()
            .map_err(|_| IndexError::Poisoned("records"))?;
        Ok(records.remove(&key.storage_key()).is_some())
    }

    fn reset(&self) -> Result<()> {
        let mut records = self
            .records
            .write()
            .map_err(|_| IndexError::Poisoned("records"))?;
        let mut last_update = self
            .last_update
            .write()
            .map_err(|_| IndexError::Poisoned("last_update"))?;
        records.clear();
        *last_update = None;
        Ok(())
    }

    fn update_timestamp(&self) -> Result<()> {
        let mut last_update = self
            .last_update
            .write()
            .map_err(|_| IndexError::Poisoned("last_update"))?;
        *last_update = Some(now_unix());
        Ok(())
    }

    fn last_update(&self) -> Result<Option<i64>> {
        let last_update = self
            .last_update
            .read()
            .map_err(|_| IndexError::Poisoned("last_update"))?;
        Ok(*last_update)
    }

    fn count(&self, kind: RecordKind) -> Result<usize> {
        let records = self
            .records
            .read()
            .map_err(|_| IndexError::Poisoned("records"))?;
        Ok(records.values().filter(|r| r.kind() == kind).count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::FileInfo;
    use crate::record::{ClassRecord, FileRecord};
    use crate::store::StoreExt;
    use std::path::PathBuf;

    #[test]
    fn test_get_absent_does_not_create() {
        let store = InMemoryStore::new();
        assert!(store.get(&RecordKey::class("A")).unwrap().is_none());
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn test_entry_creates_default() {
        let store = InMemoryStore::new();
        let record = store.entry(&RecordKey::class("I")).unwrap();
        assert_eq!(record, Record::Class(ClassRecord::new("I".to_string())));
        assert_eq!(store.count(RecordKind::Class).unwrap(), 1);
    }

    #[test]
    fn test_update_persists_only_on_change() {
        let store = InMemoryStore::new();

        let wrote = store.update_class("I", |c| c.remove_implementation("A")).unwrap();
        assert!(!wrote);
        assert!(store.class("I").unwrap().is_none());

        let wrote = store.update_class("I", |c| c.add_implementation("A")).unwrap();
        assert!(wrote);
        assert!(store.class("I").unwrap().unwrap().implementations().contains("A"));
    }

    #[test]
    fn test_update_error_leaves_record_untouched() {
        let store = InMemoryStore::new();
        store.update_class("I", |c| c.add_implementation("A")).unwrap();

        let result = store.update(&RecordKey::class("I"), &mut |record| {
            if let Record::Class(c) = record {
                c.clear_implemented();
                c.remove_implementation("A");
            }
            Err(IndexError::Poisoned("test"))
        });
        assert!(result.is_err());
        assert!(store.class("I").unwrap().unwrap().implementations().contains("A"));
    }

    #[test]
    fn test_reset_clears_records_and_timestamp() {
        let store = InMemoryStore::new();
        store.entry(&RecordKey::function("f")).unwrap();
        store.update_timestamp().unwrap();
        assert!(store.last_update().unwrap().is_some());

        store.reset().unwrap();
        assert!(store.is_empty().unwrap());
        assert!(store.last_update().unwrap().is_none());
    }

    #[test]
    fn test_file_changed_after_its_record_is_not_fresh() {
        let store = InMemoryStore::new();
        let mut record = FileRecord::new("/ws/a.ts".to_string());
        record.stamp("abc".to_string(), 100, 100);
        store.write(&Record::File(record)).unwrap();
        store.update_timestamp().unwrap();

        assert!(store.is_fresh(&FileInfo::new(PathBuf::from("/ws/a.ts"), 100)).unwrap());
        assert!(!store.is_fresh(&FileInfo::new(PathBuf::from("/ws/a.ts"), 200)).unwrap());
        assert!(!store.is_fresh(&FileInfo::new(PathBuf::from("/ws/b.ts"), 100)).unwrap());
    }
}
