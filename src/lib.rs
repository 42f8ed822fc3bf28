//! symdex: an incremental symbol index for TypeScript workspaces
//!
//! symdex parses TypeScript and TSX sources, extracts class, interface and
//! function declarations, and keeps a keyed record store in sync with them,
//! including the bidirectional `implements` / `implementations` edges.
//!
//! # Offsets
//!
//! Declaration start offsets are 0-indexed byte offsets from the start of
//! the file, as reported by tree-sitter.
//!
//! # Names
//!
//! Fully-qualified names join enclosing namespace names and the declaration
//! name with `.`. All keys are case-sensitive.

pub mod builder;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod extract;
pub mod filter;
pub mod freshness;
pub mod indexer;
pub mod ingest;
pub mod provider;
pub mod query;
pub mod record;
pub mod store;
pub mod validation;
pub mod version;

pub use builder::{prepare_file, FileOutcome, IndexBuilder, PreparedFile};
pub use config::IndexerConfig;
pub use diagnostics::{DiagnosticStage, IndexDiagnostic, SkipReason};
pub use error::{IndexError, Result};
pub use extract::{ClassExtractor, Extractor, ExtractorTable, FunctionExtractor, InterfaceExtractor};
pub use filter::FileFilter;
pub use freshness::{check_freshness, FreshnessStatus, STALE_THRESHOLD_SECS};
pub use indexer::{IndexJob, Indexer, JobReport};
pub use ingest::{detect_language, parse_source, Declaration, DeclarationKind, Language, SourceTree};
pub use provider::{FileInfo, FileIter, FileListProvider, FilesystemFileListProvider};
pub use query::{ClassQuery, IndexQueryAgent};
pub use record::{
    ClassKind, ClassRecord, Contribution, FileRecord, FunctionRecord, MemberIdentifier,
    MemberKind, MemberRecord, Record, RecordKey, RecordKind,
};
pub use store::{InMemoryStore, RecordStore, SqliteStore, StoreExt};
pub use validation::{normalize_path, validate_path_within_root, PathValidationError};
pub use version::version;
