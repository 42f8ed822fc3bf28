use std::path::PathBuf;

/// Default number of files parsed per parallel batch.
pub const DEFAULT_BATCH_SIZE: usize = 64;

/// Settings for an indexing session.
#[derive(Debug, Clone)]
pub struct IndexerConfig {
    /// Workspace root to walk
    pub root: PathBuf,
    /// Include globs, relative to root. Empty means everything.
    pub include: Vec<String>,
    /// Exclude globs, relative to root
    pub exclude: Vec<String>,
    /// Honour .gitignore and .ignore
    pub respect_gitignore: bool,
    /// Parse on the rayon pool
    pub parallel: bool,
    /// Files parsed per parallel batch
    pub batch_size: usize,
    /// Re-index files even if the store reports them fresh
    pub force: bool,
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            include: Vec::new(),
            exclude: Vec::new(),
            respect_gitignore: true,
            parallel: false,
            batch_size: DEFAULT_BATCH_SIZE,
            force: false,
        }
    }
}

impl IndexerConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }
}
