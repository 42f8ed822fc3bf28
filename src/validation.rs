//! Path normalization and root containment checks.
//!
//! File records are keyed by absolute path, so every path that reaches the
//! store goes through [`normalize_path`]. Sub-path restrictions given to a
//! job must resolve inside the workspace root.

use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum PathValidationError {
    /// Path does not exist or cannot be accessed
    #[error("cannot canonicalize path: {0}")]
    CannotCanonicalize(String),

    /// Resolved path escapes the workspace root
    #[error("path escapes workspace root: {0} (root: {1})")]
    OutsideRoot(String, String),
}

/// Resolve symlinks, `.` and `..` into an absolute path.
pub fn canonicalize_path(path: &Path) -> Result<PathBuf, PathValidationError> {
    std::fs::canonicalize(path)
        .map_err(|_| PathValidationError::CannotCanonicalize(path.to_string_lossy().to_string()))
}

/// Absolute form of `path` used for record keys.
///
/// Canonical when the path exists. Otherwise it is made absolute against
/// the current directory without touching the filesystem.
pub fn normalize_path(path: &Path) -> PathBuf {
    if let Ok(canonical) = std::fs::canonicalize(path) {
        return canonical;
    }
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Canonicalize `path` and check it lies within `root`.
///
/// A relative `path` is taken relative to `root`.
pub fn validate_path_within_root(path: &Path, root: &Path) -> Result<PathBuf, PathValidationError> {
    let joined = if path.is_relative() {
        root.join(path)
    } else {
        path.to_path_buf()
    };

    let canonical_path = canonicalize_path(&joined)?;
    let canonical_root = canonicalize_path(root)?;

    if !canonical_path.starts_with(&canonical_root) {
        return Err(PathValidationError::OutsideRoot(
            canonical_path.to_string_lossy().to_string(),
            canonical_root.to_string_lossy().to_string(),
        ));
    }

    Ok(canonical_path)
}
