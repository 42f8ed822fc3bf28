//! Member records and the identifier grammar guarding member lookups.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::OnceLock;

/// Identifier grammar: `<kind>#<name>`.
const IDENTIFIER_PATTERN: &str = r"^(method|property)#[A-Za-z_$][A-Za-z0-9_$]*$";

fn identifier_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(IDENTIFIER_PATTERN).expect("identifier pattern is valid"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberKind {
    Method,
    Property,
}

impl MemberKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemberKind::Method => "method",
            MemberKind::Property => "property",
        }
    }
}

impl fmt::Display for MemberKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validated member identifier such as `method#render`.
///
/// The only way to obtain one is through [`MemberIdentifier::parse`] or
/// [`MemberIdentifier::new`], so an invalid string never becomes a key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MemberIdentifier(String);

impl MemberIdentifier {
    /// Parse and validate a raw identifier. Returns `None` on any grammar
    /// violation.
    pub fn parse(raw: &str) -> Option<Self> {
        if identifier_regex().is_match(raw) {
            Some(Self(raw.to_string()))
        } else {
            None
        }
    }

    /// Build an identifier from a member kind and a source name.
    pub fn new(kind: MemberKind, name: &str) -> Option<Self> {
        Self::parse(&format!("{}#{}", kind.as_str(), name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn kind(&self) -> MemberKind {
        if self.0.starts_with("method#") {
            MemberKind::Method
        } else {
            MemberKind::Property
        }
    }

    pub fn name(&self) -> &str {
        self.0.split_once('#').map(|(_, name)| name).unwrap_or_default()
    }
}

impl fmt::Display for MemberIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for MemberIdentifier {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).ok_or_else(|| format!("invalid member identifier: {}", value))
    }
}

impl From<MemberIdentifier> for String {
    fn from(identifier: MemberIdentifier) -> Self {
        identifier.0
    }
}

/// Record for a member identifier, listing every class or interface that
/// declares a member with that identifier.
///
/// Interfaces merge across files, so each container also remembers which
/// files declare the member on it. A container is dropped only once none
/// of them do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberRecord {
    identifier: MemberIdentifier,
    #[serde(default)]
    containers: BTreeSet<String>,
    /// (container, file path) pairs
    #[serde(default)]
    declared_in: BTreeSet<(String, String)>,
}

impl MemberRecord {
    pub fn new(identifier: MemberIdentifier) -> Self {
        Self {
            identifier,
            containers: BTreeSet::new(),
            declared_in: BTreeSet::new(),
        }
    }

    pub fn identifier(&self) -> &MemberIdentifier {
        &self.identifier
    }

    pub fn containers(&self) -> &BTreeSet<String> {
        &self.containers
    }

    /// Files declaring this member on `container`.
    pub fn declaring_files<'a>(&'a self, container: &'a str) -> impl Iterator<Item = &'a str> {
        self.declared_in
            .iter()
            .filter(move |(c, _)| c == container)
            .map(|(_, path)| path.as_str())
    }

    /// Record that `path` declares this member on `container`.
    pub fn add_declaration(&mut self, container: &str, path: &str) -> bool {
        let added_container = self.containers.insert(container.to_string());
        let added_source = self
            .declared_in
            .insert((container.to_string(), path.to_string()));
        added_container || added_source
    }

    /// Forget that `path` declares this member on `container`. The
    /// container goes once no file declares the member on it.
    pub fn remove_declaration(&mut self, container: &str, path: &str) -> bool {
        let removed = self
            .declared_in
            .remove(&(container.to_string(), path.to_string()));
        if self.declaring_files(container).next().is_none() {
            return self.containers.remove(container) || removed;
        }
        removed
    }

    pub fn is_empty(&self) -> bool {
        self.containers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_identifiers() {
        assert!(MemberIdentifier::parse("method#render").is_some());
        assert!(MemberIdentifier::parse("property#_private").is_some());
        assert!(MemberIdentifier::parse("property#$el").is_some());
        assert!(MemberIdentifier::parse("method#a1").is_some());
    }

    #[test]
    fn test_parse_rejects_invalid_identifiers() {
        assert!(MemberIdentifier::parse("1invalid").is_none());
        assert!(MemberIdentifier::parse("method#1abc").is_none());
        assert!(MemberIdentifier::parse("constant#X").is_none());
        assert!(MemberIdentifier::parse("method#").is_none());
        assert!(MemberIdentifier::parse("method#a b").is_none());
        assert!(MemberIdentifier::parse("").is_none());
    }

    #[test]
    fn test_identifier_parts() {
        let id = MemberIdentifier::new(MemberKind::Property, "color").unwrap();
        assert_eq!(id.as_str(), "property#color");
        assert_eq!(id.kind(), MemberKind::Property);
        assert_eq!(id.name(), "color");
    }

    #[test]
    fn test_invalid_identifier_fails_deserialization() {
        let result: Result<MemberIdentifier, _> = serde_json::from_str("\"9bad\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_declarations() {
        let mut record = MemberRecord::new(MemberIdentifier::parse("method#run").unwrap());
        assert!(record.add_declaration("A", "a.ts"));
        assert!(!record.add_declaration("A", "a.ts"));
        assert!(record.remove_declaration("A", "a.ts"));
        assert!(record.is_empty());
        assert!(!record.remove_declaration("A", "a.ts"));
    }

    #[test]
    fn test_container_kept_while_another_file_declares_it() {
        let mut record = MemberRecord::new(MemberIdentifier::parse("method#a").unwrap());
        record.add_declaration("I", "one.ts");
        record.add_declaration("I", "two.ts");

        assert!(record.remove_declaration("I", "one.ts"));
        assert!(record.containers().contains("I"));
        assert_eq!(record.declaring_files("I").collect::<Vec<_>>(), vec!["two.ts"]);

        assert!(record.remove_declaration("I", "two.ts"));
        assert!(record.is_empty());
    }
}
