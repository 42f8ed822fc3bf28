//! Skip reasons and per-file errors reported by an index pass.
//!
//! Diagnostics sort deterministically (path, then variant, then reason or
//! stage) so reports are stable across runs.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Why a file was not indexed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum SkipReason {
    /// Not a regular file
    NotAFile,
    /// Extension not recognised as TypeScript
    UnsupportedLanguage,
    /// Hard-coded ignore (node_modules, .git, database files)
    IgnoredInternal,
    /// Matched by .gitignore or .ignore
    IgnoredByGitignore,
    /// Rejected by an include or exclude glob
    ExcludedByGlob,
    /// Unchanged since the last completed pass
    Fresh,
}

impl SkipReason {
    /// Lower values report first.
    pub fn sort_key(&self) -> u8 {
        match self {
            SkipReason::IgnoredInternal => 0,
            SkipReason::IgnoredByGitignore => 1,
            SkipReason::ExcludedByGlob => 2,
            SkipReason::UnsupportedLanguage => 3,
            SkipReason::NotAFile => 4,
            SkipReason::Fresh => 5,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            SkipReason::NotAFile => "not a regular file",
            SkipReason::UnsupportedLanguage => "language not supported",
            SkipReason::IgnoredInternal => "internal ignore rule",
            SkipReason::IgnoredByGitignore => "matched by gitignore",
            SkipReason::ExcludedByGlob => "excluded by pattern",
            SkipReason::Fresh => "unchanged since last index",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

impl PartialOrd for SkipReason {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SkipReason {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

/// Where in per-file processing a failure happened.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum DiagnosticStage {
    Read,
    Parse,
}

impl DiagnosticStage {
    pub fn sort_key(&self) -> u8 {
        match self {
            DiagnosticStage::Read => 0,
            DiagnosticStage::Parse => 1,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            DiagnosticStage::Read => "reading file",
            DiagnosticStage::Parse => "parsing source",
        }
    }
}

impl fmt::Display for DiagnosticStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

impl PartialOrd for DiagnosticStage {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for DiagnosticStage {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

/// A file that was skipped, or failed, during an index pass.
///
/// Neither variant aborts the pass.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum IndexDiagnostic {
    Skipped {
        path: String,
        reason: SkipReason,
    },
    Error {
        path: String,
        stage: DiagnosticStage,
        message: String,
    },
}

impl IndexDiagnostic {
    pub fn skipped(path: String, reason: SkipReason) -> Self {
        IndexDiagnostic::Skipped { path, reason }
    }

    pub fn error(path: String, stage: DiagnosticStage, message: String) -> Self {
        IndexDiagnostic::Error {
            path,
            stage,
            message,
        }
    }

    pub fn path(&self) -> &str {
        match self {
            IndexDiagnostic::Skipped { path, .. } => path,
            IndexDiagnostic::Error { path, .. } => path,
        }
    }

    /// Path first, errors before skips, then stage or reason.
    pub fn sort_key(&self) -> (&str, u8, u8) {
        match self {
            IndexDiagnostic::Error { path, stage, .. } => (path, 0, stage.sort_key()),
            IndexDiagnostic::Skipped { path, reason } => (path, 1, reason.sort_key()),
        }
    }

    /// One line for stderr, e.g. `SKIP src/a.js: language not supported`.
    pub fn format_stderr(&self) -> String {
        match self {
            IndexDiagnostic::Skipped { path, reason } => format!("SKIP {}: {}", path, reason),
            IndexDiagnostic::Error {
                path,
                stage,
                message,
            } => format!("ERROR {}: {}: {}", path, stage, message),
        }
    }
}

impl fmt::Display for IndexDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format_stderr())
    }
}

impl PartialOrd for IndexDiagnostic {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for IndexDiagnostic {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}
