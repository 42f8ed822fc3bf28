//! File discovery for index jobs.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{trace, warn};
use walkdir::WalkDir;

use crate::config::IndexerConfig;
use crate::diagnostics::SkipReason;
use crate::filter::FileFilter;
use crate::store::RecordStore;
use crate::validation::{normalize_path, validate_path_within_root};

/// A file to index: normalized absolute path and mtime in unix seconds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    pub path: PathBuf,
    pub last_modified: i64,
}

impl FileInfo {
    pub fn new(path: PathBuf, last_modified: i64) -> Self {
        Self {
            path,
            last_modified,
        }
    }

    /// Stat `path` and normalize it.
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let modified = std::fs::metadata(path)?.modified()?;
        Ok(Self {
            path: normalize_path(path),
            last_modified: DateTime::<Utc>::from(modified).timestamp(),
        })
    }

    /// String form used in record keys and record file paths.
    pub fn key_path(&self) -> String {
        self.path.to_string_lossy().into_owned()
    }
}

/// Lazy sequence of files to index.
pub type FileIter = Box<dyn Iterator<Item = FileInfo>>;

/// Source of the files an index job visits.
pub trait FileListProvider {
    /// Files to index, optionally restricted to `sub_path`.
    ///
    /// The store is passed so a provider can leave out files that are
    /// already up to date.
    fn provide_file_list(
        &self,
        store: Arc<dyn RecordStore>,
        sub_path: Option<&Path>,
    ) -> Result<FileIter>;
}

/// Walks a workspace root on disk.
///
/// Entries are visited sorted by file name, so the sequence is the same on
/// every run.
#[derive(Debug, Clone)]
pub struct FilesystemFileListProvider {
    root: PathBuf,
    include: Vec<String>,
    exclude: Vec<String>,
    respect_gitignore: bool,
    skip_fresh: bool,
}

impl FilesystemFileListProvider {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            include: Vec::new(),
            exclude: Vec::new(),
            respect_gitignore: true,
            skip_fresh: true,
        }
    }

    pub fn from_config(config: &IndexerConfig) -> Self {
        Self {
            root: config.root.clone(),
            include: config.include.clone(),
            exclude: config.exclude.clone(),
            respect_gitignore: config.respect_gitignore,
            skip_fresh: !config.force,
        }
    }

    /// Also yield files the store reports as fresh.
    pub fn ignore_freshness(mut self) -> Self {
        self.skip_fresh = false;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl FileListProvider for FilesystemFileListProvider {
    fn provide_file_list(
        &self,
        store: Arc<dyn RecordStore>,
        sub_path: Option<&Path>,
    ) -> Result<FileIter> {
        let filter = Arc::new(FileFilter::new(
            &self.root,
            &self.include,
            &self.exclude,
            self.respect_gitignore,
        )?);

        let start = match sub_path {
            Some(sub) => validate_path_within_root(sub, filter.root())
                .with_context(|| format!("invalid sub-path {}", sub.display()))?,
            None => filter.root().to_path_buf(),
        };

        let dir_filter = Arc::clone(&filter);
        let skip_fresh = self.skip_fresh;

        let files = WalkDir::new(start)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(move |entry| {
                entry.depth() == 0
                    || !entry.file_type().is_dir()
                    || !dir_filter.is_ignored_dir(entry.path())
            })
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(err) => {
                    warn!(error = %err, "skipping unreadable directory entry");
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file())
            .filter_map(move |entry| {
                let path = entry.into_path();
                if let Some(reason) = filter.should_skip(&path) {
                    trace!(path = %path.display(), %reason, "filtered");
                    return None;
                }

                let info = match FileInfo::from_path(&path) {
                    Ok(info) => info,
                    Err(err) => {
                        warn!(path = %path.display(), error = %err, "cannot stat file");
                        return None;
                    }
                };

                if skip_fresh {
                    match store.is_fresh(&info) {
                        Ok(true) => {
                            trace!(path = %info.path.display(), reason = %SkipReason::Fresh, "filtered");
                            return None;
                        }
                        Ok(false) => {}
                        Err(err) => {
                            warn!(path = %info.path.display(), error = %err, "freshness check failed");
                        }
                    }
                }

                Some(info)
            });

        Ok(Box::new(files))
    }
}
