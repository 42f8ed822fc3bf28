use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::{MemberIdentifier, RecordKey};

/// One record a file contributed on its last index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Contribution {
    Class { fqn: String },
    Function { fqn: String },
    Member {
        identifier: MemberIdentifier,
        container: String,
    },
}

impl Contribution {
    pub fn class(fqn: impl Into<String>) -> Self {
        Contribution::Class { fqn: fqn.into() }
    }

    pub fn function(fqn: impl Into<String>) -> Self {
        Contribution::Function { fqn: fqn.into() }
    }

    pub fn member(identifier: MemberIdentifier, container: impl Into<String>) -> Self {
        Contribution::Member {
            identifier,
            container: container.into(),
        }
    }

    /// Key of the record this contribution lives in.
    pub fn record_key(&self) -> RecordKey {
        match self {
            Contribution::Class { fqn } => RecordKey::Class(fqn.clone()),
            Contribution::Function { fqn } => RecordKey::Function(fqn.clone()),
            Contribution::Member { identifier, .. } => RecordKey::Member(identifier.clone()),
        }
    }
}

/// Record for an indexed source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    path: String,
    /// SHA-256 of the content at last index, hex encoded
    hash: Option<String>,
    last_modified: Option<i64>,
    last_indexed_at: Option<i64>,
    #[serde(default)]
    contributions: BTreeSet<Contribution>,
}

impl FileRecord {
    pub fn new(path: String) -> Self {
        Self {
            path,
            hash: None,
            last_modified: None,
            last_indexed_at: None,
            contributions: BTreeSet::new(),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn hash(&self) -> Option<&str> {
        self.hash.as_deref()
    }

    pub fn last_modified(&self) -> Option<i64> {
        self.last_modified
    }

    pub fn last_indexed_at(&self) -> Option<i64> {
        self.last_indexed_at
    }

    pub fn contributions(&self) -> &BTreeSet<Contribution> {
        &self.contributions
    }

    /// Stamp the version marker for a completed index of this file.
    pub fn stamp(&mut self, hash: String, last_modified: i64, indexed_at: i64) {
        self.hash = Some(hash);
        self.last_modified = Some(last_modified);
        self.last_indexed_at = Some(indexed_at);
    }

    pub fn set_contributions(&mut self, contributions: BTreeSet<Contribution>) {
        self.contributions = contributions;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contribution_record_keys() {
        assert_eq!(Contribution::class("A").record_key(), RecordKey::class("A"));
        assert_eq!(Contribution::function("f").record_key(), RecordKey::function("f"));

        let id = MemberIdentifier::parse("method#run").unwrap();
        assert_eq!(
            Contribution::member(id.clone(), "A").record_key(),
            RecordKey::member(id)
        );
    }

    #[test]
    fn test_contributions_are_deduplicated() {
        let mut set = BTreeSet::new();
        set.insert(Contribution::class("A"));
        set.insert(Contribution::class("A"));
        set.insert(Contribution::function("A"));

        let mut record = FileRecord::new("/src/a.ts".to_string());
        record.set_contributions(set);
        assert_eq!(record.contributions().len(), 2);
    }
}
