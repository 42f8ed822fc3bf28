//! Error types for the index core.
//!
//! Parse and read failures never reach this type: they are contained at the
//! builder boundary and reported as skips. What remains are storage failures
//! and invariant violations, both of which terminate an index pass.

use crate::record::RecordKind;

/// Errors raised by stores, extractors and the builder.
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    /// A record fetched by key does not have the kind its key implies.
    ///
    /// Signals a key collision or an extractor bug. Continuing would corrupt
    /// the relationship graph, so this is never swallowed.
    #[error("record kind mismatch for {key}: expected {expected}, found {found}")]
    KindMismatch {
        key: String,
        expected: RecordKind,
        found: RecordKind,
    },

    /// SQLite backend failure
    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    /// Record payload could not be encoded or decoded
    #[error("record serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// tree-sitter grammar could not be loaded
    #[error("failed to load grammar: {0}")]
    Grammar(#[from] tree_sitter::LanguageError),

    /// A lock guarding store state was poisoned by a panicking writer
    #[error("store lock poisoned: {0}")]
    Poisoned(&'static str),
}

/// Result alias used throughout the index core.
pub type Result<T> = std::result::Result<T, IndexError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mismatch_message() {
        let err = IndexError::KindMismatch {
            key: "function:foo".to_string(),
            expected: RecordKind::Function,
            found: RecordKind::Class,
        };
        let msg = err.to_string();
        assert!(msg.contains("function:foo"));
        assert!(msg.contains("expected function"));
        assert!(msg.contains("found class"));
    }

    #[test]
    fn test_poisoned_message() {
        let err = IndexError::Poisoned("records");
        assert_eq!(err.to_string(), "store lock poisoned: records");
    }
}
