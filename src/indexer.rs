//! Index jobs: walk a file list, build each file, stamp the store once.
//!
//! # Single writer
//!
//! Every store mutation happens on the thread that calls
//! [`IndexJob::run`]. In parallel mode only reading and parsing move to the
//! rayon pool; prepared files are committed back on the calling thread in
//! file-list order. Two files that reference the same interface therefore
//! never race on its implementations set.
//!
//! # Cancellation
//!
//! The cancel flag is checked between files. Files committed before the
//! flag was seen stay committed; the store timestamp is not updated.

use anyhow::{Context, Result};
use rayon::prelude::*;
use serde::Serialize;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

use crate::builder::{prepare_file, FileOutcome, IndexBuilder};
use crate::config::{IndexerConfig, DEFAULT_BATCH_SIZE};
use crate::diagnostics::IndexDiagnostic;
use crate::provider::{FileInfo, FileIter, FileListProvider, FilesystemFileListProvider};
use crate::store::RecordStore;

/// Summary of one job run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct JobReport {
    /// Files committed to the store
    pub indexed: usize,
    /// Files skipped by the builder (unreadable, unparsable, unsupported)
    pub skipped: usize,
    /// Declarations found across indexed files
    pub declarations: usize,
    /// Sorted diagnostics for skipped files
    pub diagnostics: Vec<IndexDiagnostic>,
    /// False if the job was cancelled before the end of the file list
    pub completed: bool,
}

impl JobReport {
    fn record(&mut self, outcome: FileOutcome) {
        match outcome {
            FileOutcome::Indexed { declarations } => {
                self.indexed += 1;
                self.declarations += declarations;
            }
            FileOutcome::Skipped(diagnostic) => {
                self.skipped += 1;
                self.diagnostics.push(diagnostic);
            }
        }
    }
}

/// Entry point for building and resetting an index.
pub struct Indexer {
    builder: IndexBuilder,
    provider: Box<dyn FileListProvider>,
    parallel: bool,
    batch_size: usize,
}

impl Indexer {
    pub fn new(store: Arc<dyn RecordStore>, provider: Box<dyn FileListProvider>) -> Self {
        Self {
            builder: IndexBuilder::new(store),
            provider,
            parallel: false,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    /// Indexer over the filesystem workspace described by `config`.
    pub fn from_config(store: Arc<dyn RecordStore>, config: &IndexerConfig) -> Self {
        Self {
            builder: IndexBuilder::new(store),
            provider: Box::new(FilesystemFileListProvider::from_config(config)),
            parallel: config.parallel,
            batch_size: config.batch_size.max(1),
        }
    }

    pub fn store(&self) -> &Arc<dyn RecordStore> {
        self.builder.store()
    }

    /// A job over the provider's files, optionally restricted to `sub_path`.
    pub fn get_job(&self, sub_path: Option<&Path>) -> Result<IndexJob<'_>> {
        let files = self
            .provider
            .provide_file_list(Arc::clone(self.builder.store()), sub_path)
            .context("failed to list files")?;

        Ok(IndexJob {
            builder: &self.builder,
            files,
            cancel: None,
            progress: None,
            parallel: self.parallel,
            batch_size: self.batch_size,
        })
    }

    /// Index a single file outside of any job. The store timestamp is left
    /// alone.
    pub fn index(&self, file: &FileInfo) -> crate::error::Result<FileOutcome> {
        self.builder.index(file)
    }

    /// Discard the whole index.
    ///
    /// Takes `&mut self` so it cannot run while a job borrowed from this
    /// indexer is alive.
    pub fn reset(&mut self) -> crate::error::Result<()> {
        self.builder.store().reset()?;
        info!("index reset");
        Ok(())
    }
}

/// One pass over a file list.
pub struct IndexJob<'a> {
    builder: &'a IndexBuilder,
    files: FileIter,
    cancel: Option<Arc<AtomicBool>>,
    progress: Option<Box<dyn FnMut(&Path) + 'a>>,
    parallel: bool,
    batch_size: usize,
}

impl<'a> IndexJob<'a> {
    /// Stop between files once `flag` is set.
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Called with each file's path just before it is committed.
    pub fn with_progress(mut self, progress: impl FnMut(&Path) + 'a) -> Self {
        self.progress = Some(Box::new(progress));
        self
    }

    pub fn parallel(mut self, enabled: bool) -> Self {
        self.parallel = enabled;
        self
    }

    pub fn batch_size(mut self, size: usize) -> Self {
        self.batch_size = size.max(1);
        self
    }

    fn cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::SeqCst))
    }

    fn report_progress(&mut self, path: &Path) {
        if let Some(progress) = self.progress.as_mut() {
            progress(path);
        }
    }

    /// Index every file, then stamp the store.
    pub fn run(mut self) -> Result<JobReport> {
        let mut report = JobReport::default();

        let finished = if self.parallel {
            self.run_parallel(&mut report)?
        } else {
            self.run_sequential(&mut report)?
        };

        report.diagnostics.sort();

        if !finished {
            warn!(indexed = report.indexed, "index job cancelled");
            return Ok(report);
        }

        self.builder.done().context("failed to update index timestamp")?;
        report.completed = true;
        info!(
            indexed = report.indexed,
            skipped = report.skipped,
            declarations = report.declarations,
            "index job complete"
        );
        Ok(report)
    }

    /// Returns false if cancelled.
    fn run_sequential(&mut self, report: &mut JobReport) -> Result<bool> {
        while let Some(file) = self.files.next() {
            if self.cancelled() {
                return Ok(false);
            }
            self.report_progress(&file.path);
            let outcome = self
                .builder
                .index(&file)
                .with_context(|| format!("failed to index {}", file.path.display()))?;
            report.record(outcome);
        }
        Ok(true)
    }

    /// Returns false if cancelled.
    fn run_parallel(&mut self, report: &mut JobReport) -> Result<bool> {
        loop {
            if self.cancelled() {
                return Ok(false);
            }

            let batch: Vec<FileInfo> = self.files.by_ref().take(self.batch_size).collect();
            if batch.is_empty() {
                return Ok(true);
            }

            // Order is preserved by the indexed collect.
            let prepared: Vec<_> = batch.into_par_iter().map(prepare_file).collect();

            for prepared in prepared {
                if self.cancelled() {
                    return Ok(false);
                }
                let prepared = prepared?;
                let path = prepared.file().path.clone();
                self.report_progress(&path);
                let outcome = self
                    .builder
                    .commit(prepared)
                    .with_context(|| format!("failed to index {}", path.display()))?;
                report.record(outcome);
            }
        }
    }
}
