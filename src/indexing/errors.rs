//! Per-file failure collection for project scans
//!
//! A failing file never aborts indexing; failures are recorded here and
//! summarized once the scan completes.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

/// Stage where a file failed
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq)]
pub enum ProcessingStage {
    FileRead,
    Scanning,
}

impl std::fmt::Display for ProcessingStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProcessingStage::FileRead => write!(f, "File Read"),
            ProcessingStage::Scanning => write!(f, "Scanning"),
        }
    }
}

/// Error that occurred while processing a file
#[derive(Debug, Clone)]
pub struct FileError {
    pub path: PathBuf,
    pub error: String,
    pub stage: ProcessingStage,
}

/// Thread-safe collector shared by scan workers
#[derive(Clone, Default)]
pub struct ErrorCollector {
    errors: Arc<Mutex<Vec<FileError>>>,
}

impl ErrorCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failure for `path`
    pub fn record(&self, path: PathBuf, error: impl std::fmt::Display, stage: ProcessingStage) {
        self.lock().push(FileError {
            path,
            error: error.to_string(),
            stage,
        });
    }

    pub fn error_count(&self) -> usize {
        self.lock().len()
    }

    /// Take all collected errors, leaving the collector empty
    pub fn drain(&self) -> Vec<FileError> {
        std::mem::take(&mut *self.lock())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<FileError>> {
        self.errors.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Errors grouped by stage
pub struct ErrorReport {
    pub total_errors: usize,
    pub by_stage: HashMap<ProcessingStage, Vec<FileError>>,
}

impl ErrorReport {
    pub fn from_errors(errors: &[FileError]) -> Self {
        let mut by_stage: HashMap<ProcessingStage, Vec<FileError>> = HashMap::new();

        for error in errors {
            by_stage.entry(error.stage).or_default().push(error.clone());
        }

        Self {
            total_errors: errors.len(),
            by_stage,
        }
    }

    pub fn has_errors(&self) -> bool {
        self.total_errors > 0
    }

    /// Print a summary of the errors to stdout
    pub fn print_summary(&self) {
        if self.total_errors == 0 {
            return;
        }

        println!("{} files could not be indexed:", self.total_errors);

        let mut stages: Vec<_> = self.by_stage.iter().collect();
        stages.sort_by_key(|(stage, _)| stage.to_string());

        for (stage, errors) in stages {
            println!("  {}: {} errors", stage, errors.len());

            for error in errors.iter().take(5) {
                println!("    - {}: {}", error.path.display(), error.error);
            }

            if errors.len() > 5 {
                println!("    ... and {} more", errors.len() - 5);
            }
        }
    }
}
