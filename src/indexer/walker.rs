use ignore::WalkBuilder;
use std::collections::HashSet;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use crate::config::IndexerConfig;

/// Walks the project tree respecting .gitignore and custom ignore patterns
#[derive(Debug, Clone)]
pub struct Walker {
    root: PathBuf,
    filter: SourceFilter,
}

impl Walker {
    pub fn new(root: PathBuf, config: &IndexerConfig) -> Self {
        Self {
            filter: SourceFilter::new(config).with_root(root.clone()),
            root,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Walk the directory tree and yield indexable source files
    pub fn walk(&self) -> impl Iterator<Item = PathBuf> {
        let mut builder = WalkBuilder::new(&self.root);
        builder
            .git_ignore(true)
            .git_global(true)
            .git_exclude(true)
            // `.Rprofile` is hidden but indexable; hidden dirs are caught by ignore patterns
            .hidden(false);

        let pruner = self.filter.clone();
        builder.filter_entry(move |entry| {
            entry.depth() == 0 || !pruner.is_ignored_name(entry.file_name())
        });

        let filter = self.filter.clone();

        builder
            .build()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().map(|ft| ft.is_file()).unwrap_or(false))
            .filter(move |entry| filter.accepts(entry.path()))
            .map(|entry| entry.into_path())
    }

    /// Collect all walkable files, sorted for stable processing order
    pub fn collect_files(&self) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = self.walk().collect();
        files.sort();
        files
    }
}

/// Decides whether a path is an indexable source file.
///
/// Shared by the walker and the file watcher so both agree on the file set.
#[derive(Debug, Clone)]
pub struct SourceFilter {
    extensions: HashSet<String>,
    ignore_patterns: Vec<String>,
    /// Ignore patterns only apply below this directory
    root: Option<PathBuf>,
}

impl SourceFilter {
    pub fn new(config: &IndexerConfig) -> Self {
        Self {
            extensions: config.extensions.iter().cloned().collect(),
            ignore_patterns: config.ignore_patterns.clone(),
            root: None,
        }
    }

    /// Match ignore patterns against paths relative to `root`
    pub fn with_root(mut self, root: PathBuf) -> Self {
        self.root = Some(root);
        self
    }

    pub fn accepts(&self, path: &Path) -> bool {
        self.has_source_extension(path) && !self.is_ignored(path)
    }

    fn has_source_extension(&self, path: &Path) -> bool {
        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            if self.extensions.contains(ext) {
                return true;
            }
        }

        // Dotfiles such as `.Rprofile` have no extension
        path.file_name()
            .and_then(|name| name.to_str())
            .and_then(|name| name.strip_prefix('.'))
            .map(|bare| self.extensions.contains(bare))
            .unwrap_or(false)
    }

    fn is_ignored(&self, path: &Path) -> bool {
        let relative = self
            .root
            .as_deref()
            .and_then(|root| path.strip_prefix(root).ok())
            .unwrap_or(path);
        relative
            .components()
            .any(|component| self.is_ignored_name(component.as_os_str()))
    }

    fn is_ignored_name(&self, name: &OsStr) -> bool {
        let name = name.to_string_lossy();
        self.ignore_patterns
            .iter()
            .any(|pattern| name == pattern.as_str())
    }
}
