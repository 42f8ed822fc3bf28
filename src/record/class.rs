use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Declaration kind tag carried by a [`ClassRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassKind {
    Class,
    Interface,
}

impl fmt::Display for ClassKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassKind::Class => f.write_str("class"),
            ClassKind::Interface => f.write_str("interface"),
        }
    }
}

/// Record for a class or interface declaration.
///
/// `implements` holds the names this declaration extends or implements, in
/// declaration order. `implementations` is the reverse edge: every
/// declaration whose `implements` names this record.
///
/// A record with `kind == None` is a placeholder. It exists because some
/// other declaration referenced it, but no declaration of its own has been
/// indexed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassRecord {
    fqn: String,
    kind: Option<ClassKind>,
    start: Option<usize>,
    file_path: Option<String>,
    last_modified: Option<i64>,
    #[serde(default)]
    implements: Vec<String>,
    #[serde(default)]
    implementations: BTreeSet<String>,
}

impl ClassRecord {
    pub fn new(fqn: String) -> Self {
        Self {
            fqn,
            kind: None,
            start: None,
            file_path: None,
            last_modified: None,
            implements: Vec::new(),
            implementations: BTreeSet::new(),
        }
    }

    pub fn fqn(&self) -> &str {
        &self.fqn
    }

    pub fn kind(&self) -> Option<ClassKind> {
        self.kind
    }

    /// Byte offset of the declaration in its file.
    pub fn start(&self) -> Option<usize> {
        self.start
    }

    pub fn file_path(&self) -> Option<&str> {
        self.file_path.as_deref()
    }

    pub fn last_modified(&self) -> Option<i64> {
        self.last_modified
    }

    pub fn implements(&self) -> &[String] {
        &self.implements
    }

    pub fn implementations(&self) -> &BTreeSet<String> {
        &self.implementations
    }

    pub fn is_placeholder(&self) -> bool {
        self.kind.is_none()
    }

    /// Stamp declaration metadata from the file currently being indexed.
    pub fn stamp(&mut self, kind: ClassKind, start: usize, file_path: &str, last_modified: i64) {
        self.kind = Some(kind);
        self.start = Some(start);
        self.file_path = Some(file_path.to_string());
        self.last_modified = Some(last_modified);
    }

    /// Returns false if `name` is already present.
    pub fn add_implements(&mut self, name: &str) -> bool {
        if self.implements.iter().any(|n| n == name) {
            return false;
        }
        self.implements.push(name.to_string());
        true
    }

    pub fn clear_implemented(&mut self) {
        self.implements.clear();
    }

    /// Returns false if `name` was already present.
    pub fn add_implementation(&mut self, name: &str) -> bool {
        self.implementations.insert(name.to_string())
    }

    /// Returns false if `name` was not present.
    pub fn remove_implementation(&mut self, name: &str) -> bool {
        self.implementations.remove(name)
    }

    /// Overwrite declaration-owned fields with those of `declared`.
    ///
    /// `implementations` is left alone: it is written by other declarations
    /// and may have changed since `declared` was read.
    pub fn apply_declaration(&mut self, declared: &ClassRecord) -> bool {
        let before = self.clone();
        self.kind = declared.kind;
        self.start = declared.start;
        self.file_path = declared.file_path.clone();
        self.last_modified = declared.last_modified;
        self.implements = declared.implements.clone();
        *self != before
    }

    /// Drop the declaration and its outgoing edges, keeping reverse edges.
    pub fn reset_to_placeholder(&mut self) {
        self.kind = None;
        self.start = None;
        self.file_path = None;
        self.last_modified = None;
        self.implements.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_record_is_placeholder() {
        let record = ClassRecord::new("I".to_string());
        assert!(record.is_placeholder());
        assert!(record.implements().is_empty());
        assert!(record.implementations().is_empty());
        assert_eq!(record.file_path(), None);
    }

    #[test]
    fn test_add_implements_keeps_order_and_uniqueness() {
        let mut record = ClassRecord::new("A".to_string());
        assert!(record.add_implements("B"));
        assert!(record.add_implements("I"));
        assert!(!record.add_implements("B"));
        assert_eq!(record.implements(), &["B".to_string(), "I".to_string()]);
    }

    #[test]
    fn test_remove_missing_implementation_is_noop() {
        let mut record = ClassRecord::new("I".to_string());
        assert!(!record.remove_implementation("A"));
        assert!(record.add_implementation("A"));
        assert!(!record.add_implementation("A"));
        assert!(record.remove_implementation("A"));
    }

    #[test]
    fn test_apply_declaration_preserves_implementations() {
        let mut stored = ClassRecord::new("I".to_string());
        stored.add_implementation("A");

        let mut declared = ClassRecord::new("I".to_string());
        declared.stamp(ClassKind::Interface, 10, "/src/i.ts", 100);
        declared.add_implements("Base");

        assert!(stored.apply_declaration(&declared));
        assert_eq!(stored.kind(), Some(ClassKind::Interface));
        assert_eq!(stored.start(), Some(10));
        assert_eq!(stored.implements(), &["Base".to_string()]);
        assert!(stored.implementations().contains("A"));

        assert!(!stored.apply_declaration(&declared));
    }

    #[test]
    fn test_reset_to_placeholder() {
        let mut record = ClassRecord::new("A".to_string());
        record.stamp(ClassKind::Class, 0, "/src/a.ts", 1);
        record.add_implements("I");
        record.add_implementation("B");

        record.reset_to_placeholder();
        assert!(record.is_placeholder());
        assert!(record.implements().is_empty());
        assert_eq!(record.implementations().len(), 1);
    }
}
