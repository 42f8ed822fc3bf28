//! File filtering for discovery.
//!
//! Rules apply in this order and the first match decides:
//! 1. Hard internal ignores (.git/, node_modules/, database files)
//! 2. Gitignore-style rules (.gitignore, .ignore), when enabled
//! 3. Language detection
//! 4. Include globs (if any)
//! 5. Exclude globs

use anyhow::{Context, Result};
use ignore::gitignore::{Gitignore, GitignoreBuilder};
use std::path::{Component, Path, PathBuf};
use tracing::warn;

use crate::diagnostics::SkipReason;
use crate::ingest::detect_language;

const INTERNAL_IGNORE_DIRS: &[&str] = &[
    ".git",
    ".hg",
    ".svn",
    "node_modules",
    "bower_components",
    "target",
];

const INTERNAL_IGNORE_EXTS: &[&str] = &[
    ".db",
    ".db-journal",
    ".db-wal",
    ".db-shm",
    ".sqlite",
    ".sqlite3",
];

/// Deterministic path filter for one workspace root.
pub struct FileFilter {
    root: PathBuf,
    gitignore: Option<Gitignore>,
    include_patterns: Vec<globset::GlobMatcher>,
    exclude_patterns: Vec<globset::GlobMatcher>,
}

impl FileFilter {
    /// Build a filter. Globs are matched against root-relative paths with
    /// forward slashes.
    pub fn new(
        root: &Path,
        include_patterns: &[String],
        exclude_patterns: &[String],
        respect_gitignore: bool,
    ) -> Result<Self> {
        let root = std::fs::canonicalize(root).unwrap_or_else(|_| root.to_path_buf());

        let gitignore = if respect_gitignore {
            Some(Self::load_gitignore(&root)?)
        } else {
            None
        };

        Ok(Self {
            gitignore,
            include_patterns: Self::compile_globs(include_patterns)?,
            exclude_patterns: Self::compile_globs(exclude_patterns)?,
            root,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn load_gitignore(root: &Path) -> Result<Gitignore> {
        let mut builder = GitignoreBuilder::new(root);

        for name in [".gitignore", ".ignore"] {
            let path = root.join(name);
            if path.exists() {
                // A malformed ignore file should not stop indexing.
                if let Some(err) = builder.add(&path) {
                    warn!(file = %path.display(), error = %err, "failed to load ignore file");
                }
            }
        }

        builder.build().context("failed to build ignore matcher")
    }

    fn compile_globs(patterns: &[String]) -> Result<Vec<globset::GlobMatcher>> {
        patterns
            .iter()
            .map(|pattern| {
                globset::Glob::new(pattern)
                    .map(|g| g.compile_matcher())
                    .with_context(|| format!("invalid glob pattern '{}'", pattern))
            })
            .collect()
    }

    /// Reason to skip `path`, or `None` if it should be indexed.
    pub fn should_skip(&self, path: &Path) -> Option<SkipReason> {
        if !path.is_file() {
            return Some(SkipReason::NotAFile);
        }

        if self.is_internal_ignore(path) {
            return Some(SkipReason::IgnoredInternal);
        }

        if let (Some(gitignore), Ok(rel)) = (&self.gitignore, path.strip_prefix(&self.root)) {
            if gitignore.matched_path_or_any_parents(rel, false).is_ignore() {
                return Some(SkipReason::IgnoredByGitignore);
            }
        }

        if detect_language(path).is_none() {
            return Some(SkipReason::UnsupportedLanguage);
        }

        let rel_path = self.relative_path(path);

        if !self.include_patterns.is_empty()
            && !self.include_patterns.iter().any(|m| m.is_match(&rel_path))
        {
            return Some(SkipReason::ExcludedByGlob);
        }

        if self.exclude_patterns.iter().any(|m| m.is_match(&rel_path)) {
            return Some(SkipReason::ExcludedByGlob);
        }

        None
    }

    /// True if a directory should not be descended into at all.
    pub fn is_ignored_dir(&self, dir: &Path) -> bool {
        dir.file_name()
            .map(|name| INTERNAL_IGNORE_DIRS.contains(&name.to_string_lossy().as_ref()))
            .unwrap_or(false)
    }

    fn is_internal_ignore(&self, path: &Path) -> bool {
        if let Some(file_name) = path.file_name() {
            let file_name = file_name.to_string_lossy();
            if INTERNAL_IGNORE_EXTS.iter().any(|ext| file_name.ends_with(ext)) {
                return true;
            }
        }

        if let Ok(rel_path) = path.strip_prefix(&self.root) {
            for component in rel_path.components() {
                if let Component::Normal(dir) = component {
                    if INTERNAL_IGNORE_DIRS.contains(&dir.to_string_lossy().as_ref()) {
                        return true;
                    }
                }
            }
        }

        false
    }

    fn relative_path(&self, path: &Path) -> String {
        path.strip_prefix(&self.root)
            .map(|p| p.to_string_lossy().replace('\\', "/"))
            .unwrap_or_else(|_| path.to_string_lossy().into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_internal_ignores() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("node_modules/pkg")).unwrap();
        fs::write(root.join("node_modules/pkg/index.ts"), "class A {}").unwrap();
        fs::write(root.join("index.db"), "data").unwrap();

        let filter = FileFilter::new(root, &[], &[], true).unwrap();
        assert_eq!(
            filter.should_skip(&filter.root().join("node_modules/pkg/index.ts")),
            Some(SkipReason::IgnoredInternal)
        );
        assert_eq!(
            filter.should_skip(&filter.root().join("index.db")),
            Some(SkipReason::IgnoredInternal)
        );
    }

    #[test]
    fn test_unsupported_and_supported() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::write(root.join("a.js"), "").unwrap();
        fs::write(root.join("a.ts"), "").unwrap();
        fs::write(root.join("b.tsx"), "").unwrap();

        let filter = FileFilter::new(root, &[], &[], true).unwrap();
        assert_eq!(
            filter.should_skip(&filter.root().join("a.js")),
            Some(SkipReason::UnsupportedLanguage)
        );
        assert_eq!(filter.should_skip(&filter.root().join("a.ts")), None);
        assert_eq!(filter.should_skip(&filter.root().join("b.tsx")), None);
    }

    #[test]
    fn test_gitignore_rules() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::write(root.join(".gitignore"), "ignored.ts\ngen/\n").unwrap();
        fs::write(root.join("ignored.ts"), "").unwrap();
        fs::write(root.join("kept.ts"), "").unwrap();
        fs::create_dir_all(root.join("gen")).unwrap();
        fs::write(root.join("gen/out.ts"), "").unwrap();

        let filter = FileFilter::new(root, &[], &[], true).unwrap();
        let root = filter.root().to_path_buf();
        assert_eq!(
            filter.should_skip(&root.join("ignored.ts")),
            Some(SkipReason::IgnoredByGitignore)
        );
        assert_eq!(
            filter.should_skip(&root.join("gen/out.ts")),
            Some(SkipReason::IgnoredByGitignore)
        );
        assert_eq!(filter.should_skip(&root.join("kept.ts")), None);

        let unfiltered = FileFilter::new(&root, &[], &[], false).unwrap();
        assert_eq!(unfiltered.should_skip(&root.join("ignored.ts")), None);
    }

    #[test]
    fn test_include_and_exclude_globs() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("src")).unwrap();
        fs::create_dir_all(root.join("test")).unwrap();
        fs::write(root.join("src/a.ts"), "").unwrap();
        fs::write(root.join("src/a.spec.ts"), "").unwrap();
        fs::write(root.join("test/b.ts"), "").unwrap();

        let filter = FileFilter::new(
            root,
            &["src/**".to_string()],
            &["**/*.spec.ts".to_string()],
            true,
        )
        .unwrap();
        let root = filter.root().to_path_buf();

        assert_eq!(filter.should_skip(&root.join("src/a.ts")), None);
        assert_eq!(
            filter.should_skip(&root.join("src/a.spec.ts")),
            Some(SkipReason::ExcludedByGlob)
        );
        assert_eq!(
            filter.should_skip(&root.join("test/b.ts")),
            Some(SkipReason::ExcludedByGlob)
        );
    }

    #[test]
    fn test_invalid_glob_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let result = FileFilter::new(temp_dir.path(), &["src/[".to_string()], &[], true);
        assert!(result.is_err());
    }
}
