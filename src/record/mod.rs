//! Declaration records held in the record store.
//!
//! A record is the persisted metadata for one declaration: location,
//! timestamp, kind and relationship edges. Every record is addressed by a
//! [`RecordKey`] whose variant fixes the record kind.

pub mod class;
pub mod file;
pub mod function;
pub mod keys;
pub mod member;

pub use class::{ClassKind, ClassRecord};
pub use file::{Contribution, FileRecord};
pub use function::FunctionRecord;
pub use member::{MemberIdentifier, MemberKind, MemberRecord};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of record, implied by its key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    /// Class or interface
    Class,
    Function,
    Member,
    File,
}

impl RecordKind {
    /// Stable lowercase name used in storage and output.
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Class => "class",
            RecordKind::Function => "function",
            RecordKind::Member => "member",
            RecordKind::File => "file",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind-qualified record identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RecordKey {
    /// Class or interface by fully-qualified name
    Class(String),
    /// Function by fully-qualified name
    Function(String),
    /// Member by validated identifier
    Member(MemberIdentifier),
    /// File by normalized absolute path
    File(String),
}

impl RecordKey {
    pub fn class(fqn: impl Into<String>) -> Self {
        RecordKey::Class(fqn.into())
    }

    pub fn function(fqn: impl Into<String>) -> Self {
        RecordKey::Function(fqn.into())
    }

    pub fn member(identifier: MemberIdentifier) -> Self {
        RecordKey::Member(identifier)
    }

    pub fn file(path: impl Into<String>) -> Self {
        RecordKey::File(path.into())
    }

    /// Record kind this key addresses.
    pub fn kind(&self) -> RecordKind {
        match self {
            RecordKey::Class(_) => RecordKind::Class,
            RecordKey::Function(_) => RecordKind::Function,
            RecordKey::Member(_) => RecordKind::Member,
            RecordKey::File(_) => RecordKind::File,
        }
    }

    /// Storage string form, e.g. `class:Shapes.Circle`.
    pub fn storage_key(&self) -> String {
        match self {
            RecordKey::Class(fqn) => keys::class_key(fqn),
            RecordKey::Function(fqn) => keys::function_key(fqn),
            RecordKey::Member(identifier) => keys::member_key(identifier.as_str()),
            RecordKey::File(path) => keys::file_key(path),
        }
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.storage_key())
    }
}

/// A stored record of any kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Record {
    Class(ClassRecord),
    Function(FunctionRecord),
    Member(MemberRecord),
    File(FileRecord),
}

impl Record {
    /// Default-valued record for a key that has never been written.
    ///
    /// This is what makes forward references work: a class that implements
    /// an interface nobody has indexed yet still gets a record to attach the
    /// reverse edge to.
    pub fn default_for(key: &RecordKey) -> Self {
        match key {
            RecordKey::Class(fqn) => Record::Class(ClassRecord::new(fqn.clone())),
            RecordKey::Function(fqn) => Record::Function(FunctionRecord::new(fqn.clone())),
            RecordKey::Member(identifier) => Record::Member(MemberRecord::new(identifier.clone())),
            RecordKey::File(path) => Record::File(FileRecord::new(path.clone())),
        }
    }

    /// Key this record is stored under.
    pub fn key(&self) -> RecordKey {
        match self {
            Record::Class(r) => RecordKey::Class(r.fqn().to_string()),
            Record::Function(r) => RecordKey::Function(r.fqn().to_string()),
            Record::Member(r) => RecordKey::Member(r.identifier().clone()),
            Record::File(r) => RecordKey::File(r.path().to_string()),
        }
    }

    pub fn kind(&self) -> RecordKind {
        match self {
            Record::Class(_) => RecordKind::Class,
            Record::Function(_) => RecordKind::Function,
            Record::Member(_) => RecordKind::Member,
            Record::File(_) => RecordKind::File,
        }
    }
}

impl From<ClassRecord> for Record {
    fn from(record: ClassRecord) -> Self {
        Record::Class(record)
    }
}

impl From<FunctionRecord> for Record {
    fn from(record: FunctionRecord) -> Self {
        Record::Function(record)
    }
}

impl From<MemberRecord> for Record {
    fn from(record: MemberRecord) -> Self {
        Record::Member(record)
    }
}

impl From<FileRecord> for Record {
    fn from(record: FileRecord) -> Self {
        Record::File(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_for_matches_key_kind() {
        let keys = [
            RecordKey::class("A"),
            RecordKey::function("foo"),
            RecordKey::member(MemberIdentifier::parse("method#run").unwrap()),
            RecordKey::file("/src/a.ts"),
        ];

        for key in &keys {
            let record = Record::default_for(key);
            assert_eq!(record.kind(), key.kind());
            assert_eq!(&record.key(), key);
        }
    }

    #[test]
    fn test_storage_key_display() {
        assert_eq!(RecordKey::class("A.B").to_string(), "class:A.B");
        assert_eq!(
            RecordKey::member(MemberIdentifier::parse("property#x").unwrap()).to_string(),
            "member:property#x"
        );
    }

    #[test]
    fn test_record_json_is_tagged() {
        let record = Record::from(FunctionRecord::new("foo".to_string()));
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"type\":\"function\""));

        let back: Record = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }
}
