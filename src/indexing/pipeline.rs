//! Data passed between the watcher, the indexer and its callers

use std::path::PathBuf;

use super::errors::FileError;

/// A file content change delivered by a project watcher.
///
/// `content: None` means the file is gone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEvent {
    pub path: PathBuf,
    pub content: Option<String>,
}

impl FileEvent {
    pub fn changed(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: Some(content.into()),
        }
    }

    pub fn removed(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            content: None,
        }
    }
}

/// What applying a [`FileEvent`] did to the index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOutcome {
    /// The file's entry was replaced with this many definitions
    Indexed { definitions: usize },
    /// The file was dropped from the index
    Removed,
    /// A newer event for the same file won; this result was discarded
    Superseded,
}

/// Result of a full project scan
#[derive(Debug, Default)]
pub struct ProcessingResult {
    pub files_processed: usize,
    pub definitions_indexed: usize,
    /// Files that vanished between walking and reading
    pub files_removed: usize,
    /// Scans discarded because a newer update of the same file committed first
    pub superseded: usize,
    pub errors: Vec<FileError>,
    pub duration_secs: f64,
}

impl ProcessingResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold a single file outcome into the totals
    pub fn record(&mut self, outcome: EventOutcome) {
        self.files_processed += 1;
        match outcome {
            EventOutcome::Indexed { definitions } => self.definitions_indexed += definitions,
            EventOutcome::Removed => self.files_removed += 1,
            EventOutcome::Superseded => self.superseded += 1,
        }
    }

    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn summary(&self) -> String {
        if self.errors.is_empty() {
            format!(
                "Indexed {} files, {} definitions in {:.2}s",
                self.files_processed, self.definitions_indexed, self.duration_secs
            )
        } else {
            format!(
                "Indexed {} files with {} errors, {} definitions in {:.2}s",
                self.files_processed,
                self.errors.len(),
                self.definitions_indexed,
                self.duration_secs
            )
        }
    }
}
