//! Per-file index building.
//!
//! Work for one file is split in two:
//! - [`prepare_file`] reads and parses. It touches no store and can run on
//!   any thread.
//! - [`IndexBuilder::commit`] dispatches declarations to extractors, retires
//!   what the file no longer declares, and writes the file record. All
//!   store mutation happens here, on the caller's thread.
//!
//! Read and parse failures become [`FileOutcome::Skipped`]. Store errors
//! propagate and end the pass.

use sha2::{Digest, Sha256};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, info, trace};

use crate::diagnostics::{DiagnosticStage, IndexDiagnostic, SkipReason};
use crate::error::Result;
use crate::extract::ExtractorTable;
use crate::ingest::{detect_language, parse_source, SourceTree};
use crate::provider::FileInfo;
use crate::record::{Contribution, FileRecord, Record, RecordKey};
use crate::store::{now_unix, RecordStore, StoreExt};

enum PreparedState {
    Parsed { tree: SourceTree, hash: String },
    Skipped(IndexDiagnostic),
}

/// A file read and parsed, ready to commit.
pub struct PreparedFile {
    file: FileInfo,
    state: PreparedState,
}

impl PreparedFile {
    pub fn file(&self) -> &FileInfo {
        &self.file
    }
}

/// Result of indexing one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    Indexed { declarations: usize },
    Skipped(IndexDiagnostic),
}

/// Read and parse `file` without touching any store.
///
/// Only a grammar that fails to load is an error.
pub fn prepare_file(file: FileInfo) -> Result<PreparedFile> {
    let path = file.key_path();

    let Some(language) = detect_language(&file.path) else {
        let diagnostic = IndexDiagnostic::skipped(path, SkipReason::UnsupportedLanguage);
        return Ok(PreparedFile {
            file,
            state: PreparedState::Skipped(diagnostic),
        });
    };

    let source = match std::fs::read(&file.path) {
        Ok(source) => source,
        Err(err) => {
            let diagnostic = IndexDiagnostic::error(path, DiagnosticStage::Read, err.to_string());
            return Ok(PreparedFile {
                file,
                state: PreparedState::Skipped(diagnostic),
            });
        }
    };

    let hash = hex::encode(Sha256::digest(&source));

    let state = match parse_source(language, &source)? {
        Some(tree) => {
            if tree.has_errors {
                debug!(path = %path, "recovered from syntax errors");
            }
            PreparedState::Parsed { tree, hash }
        }
        None => PreparedState::Skipped(IndexDiagnostic::error(
            path,
            DiagnosticStage::Parse,
            "parser produced no tree".to_string(),
        )),
    };

    Ok(PreparedFile { file, state })
}

/// Applies parsed files to a record store.
pub struct IndexBuilder {
    store: Arc<dyn RecordStore>,
    extractors: ExtractorTable,
}

impl IndexBuilder {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self::with_extractors(store, ExtractorTable::with_defaults())
    }

    pub fn with_extractors(store: Arc<dyn RecordStore>, extractors: ExtractorTable) -> Self {
        Self { store, extractors }
    }

    pub fn store(&self) -> &Arc<dyn RecordStore> {
        &self.store
    }

    /// Read, parse and commit one file.
    pub fn index(&self, file: &FileInfo) -> Result<FileOutcome> {
        self.commit(prepare_file(file.clone())?)
    }

    /// Apply a prepared file to the store.
    pub fn commit(&self, prepared: PreparedFile) -> Result<FileOutcome> {
        let PreparedFile { file, state } = prepared;
        let (tree, hash) = match state {
            PreparedState::Parsed { tree, hash } => (tree, hash),
            PreparedState::Skipped(diagnostic) => {
                debug!(%diagnostic, "skipped");
                return Ok(FileOutcome::Skipped(diagnostic));
            }
        };

        let store = self.store.as_ref();
        let path = file.key_path();

        let mut contributions = BTreeSet::new();
        for declaration in &tree.declarations {
            match self.extractors.for_declaration(declaration) {
                Some(extractor) => {
                    contributions.extend(extractor.index(store, &file, declaration)?);
                }
                None => trace!(fqn = declaration.fqn(), "no extractor registered"),
            }
        }

        let previous = store.file_record(&path)?;
        if let Some(previous) = &previous {
            let stale: Vec<&Contribution> =
                previous.contributions().difference(&contributions).collect();
            self.retire(&path, &stale)?;
        }

        let mut record = previous.unwrap_or_else(|| FileRecord::new(path.clone()));
        record.stamp(hash, file.last_modified, now_unix());
        record.set_contributions(contributions);
        store.write(&Record::File(record))?;

        let declarations = tree.declarations.len();
        debug!(path = %path, declarations, "indexed");
        Ok(FileOutcome::Indexed { declarations })
    }

    /// Undo contributions the file made last time but no longer makes.
    ///
    /// Outgoing edges of every retired class are invalidated before any of
    /// them is removed or reset, so the result does not depend on the order
    /// of `stale`.
    fn retire(&self, path: &str, stale: &[&Contribution]) -> Result<()> {
        let store = self.store.as_ref();

        let mut retired_classes = Vec::new();
        for contribution in stale {
            let Contribution::Class { fqn } = contribution else {
                continue;
            };
            let Some(record) = store.class(fqn)? else {
                continue;
            };
            // Another file declares it now.
            if record.file_path() != Some(path) {
                continue;
            }
            for target in record.implements() {
                store.update_class(target, |t| t.remove_implementation(fqn))?;
            }
            retired_classes.push(fqn);
        }

        for fqn in retired_classes {
            let still_referenced = store
                .class(fqn)?
                .is_some_and(|r| !r.implementations().is_empty());
            if still_referenced {
                store.update_class(fqn, |r| {
                    r.reset_to_placeholder();
                    true
                })?;
                debug!(class = %fqn, "declaration removed, kept as placeholder");
            } else {
                store.remove(&RecordKey::class(fqn.as_str()))?;
                debug!(class = %fqn, "declaration removed");
            }
        }

        for contribution in stale {
            match contribution {
                Contribution::Class { .. } => {}
                Contribution::Function { fqn } => {
                    let owned = store
                        .function(fqn)?
                        .is_some_and(|r| r.file_path() == Some(path));
                    if owned {
                        store.remove(&RecordKey::function(fqn.as_str()))?;
                        debug!(function = %fqn, "declaration removed");
                    }
                }
                Contribution::Member {
                    identifier,
                    container,
                } => {
                    store.update_member(identifier, |m| m.remove_declaration(container, path))?;
                    if store.member(identifier)?.is_some_and(|m| m.is_empty()) {
                        store.remove(&RecordKey::member(identifier.clone()))?;
                    }
                }
            }
        }

        Ok(())
    }

    /// Stamp the store after a completed pass.
    pub fn done(&self) -> Result<()> {
        self.store.update_timestamp()?;
        info!("index timestamp updated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryStore;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn builder() -> (IndexBuilder, Arc<dyn RecordStore>) {
        let store: Arc<dyn RecordStore> = Arc::new(InMemoryStore::new());
        (IndexBuilder::new(Arc::clone(&store)), store)
    }

    #[test]
    fn test_unreadable_file_is_skipped_without_writes() {
        let (builder, store) = builder();
        let file = FileInfo::new(PathBuf::from("/definitely/missing/a.ts"), 0);

        let outcome = builder.index(&file).unwrap();
        assert!(matches!(
            outcome,
            FileOutcome::Skipped(IndexDiagnostic::Error {
                stage: DiagnosticStage::Read,
                ..
            })
        ));
        assert!(store.file_record("/definitely/missing/a.ts").unwrap().is_none());
    }

    #[test]
    fn test_unsupported_language_is_skipped() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("a.py");
        fs::write(&path, "class A: pass").unwrap();

        let (builder, _) = builder();
        let outcome = builder.index(&FileInfo::from_path(&path).unwrap()).unwrap();
        assert!(matches!(
            outcome,
            FileOutcome::Skipped(IndexDiagnostic::Skipped {
                reason: SkipReason::UnsupportedLanguage,
                ..
            })
        ));
    }

    #[test]
    fn test_file_record_tracks_contributions() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("a.ts");
        fs::write(&path, "class A { run() {} }\nfunction f() {}\n").unwrap();

        let (builder, store) = builder();
        let file = FileInfo::from_path(&path).unwrap();
        let outcome = builder.index(&file).unwrap();
        assert_eq!(outcome, FileOutcome::Indexed { declarations: 2 });

        let record = store.file_record(&file.key_path()).unwrap().unwrap();
        assert_eq!(record.contributions().len(), 3);
        assert_eq!(record.hash().map(str::len), Some(64));
        assert_eq!(record.last_modified(), Some(file.last_modified));
        assert!(record.last_indexed_at().is_some());
    }

    #[test]
    fn test_done_stamps_store() {
        let (builder, store) = builder();
        assert!(store.last_update().unwrap().is_none());
        builder.done().unwrap();
        assert!(store.last_update().unwrap().is_some());
    }
}
