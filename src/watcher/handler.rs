//! Applies coalesced file changes to the index

use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{debug, error, info};

use crate::indexing::{EventOutcome, FileEvent, ProjectIndexer};

use super::debouncer::{ChangeType, FileChange};

/// Statistics from processing file changes
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ProcessingStats {
    pub files_added: usize,
    pub files_modified: usize,
    pub files_deleted: usize,
    pub definitions_indexed: usize,
    /// Results dropped because a newer change to the same file won
    pub superseded: usize,
    pub errors: usize,
}

impl ProcessingStats {
    /// Merge another stats instance into this one
    pub fn merge(&mut self, other: &ProcessingStats) {
        self.files_added += other.files_added;
        self.files_modified += other.files_modified;
        self.files_deleted += other.files_deleted;
        self.definitions_indexed += other.definitions_indexed;
        self.superseded += other.superseded;
        self.errors += other.errors;
    }

    pub fn has_changes(&self) -> bool {
        self.files_added > 0 || self.files_modified > 0 || self.files_deleted > 0
    }

    pub fn total_files(&self) -> usize {
        self.files_added + self.files_modified + self.files_deleted
    }

    fn record(&mut self, change_type: ChangeType, outcome: EventOutcome) {
        match outcome {
            EventOutcome::Indexed { definitions } => {
                self.definitions_indexed += definitions;
                match change_type {
                    ChangeType::Created => self.files_added += 1,
                    _ => self.files_modified += 1,
                }
            }
            EventOutcome::Removed => self.files_deleted += 1,
            EventOutcome::Superseded => self.superseded += 1,
        }
    }
}

/// Turns file changes into index updates, one task per file
pub struct ChangeHandler {
    indexer: Arc<ProjectIndexer>,
}

impl ChangeHandler {
    pub fn new(indexer: Arc<ProjectIndexer>) -> Self {
        Self { indexer }
    }

    /// Process a batch of changes to distinct files concurrently
    pub async fn process_changes(&self, changes: Vec<FileChange>) -> ProcessingStats {
        let mut tasks = JoinSet::new();

        for change in changes {
            let indexer = Arc::clone(&self.indexer);
            tasks.spawn(async move {
                debug!("Processing {} change for {:?}", change.change_type, change.path);
                let outcome = if change.needs_content() {
                    indexer.rescan_file(&change.path).await
                } else {
                    indexer.apply_event(FileEvent::removed(change.path.clone())).await
                };
                (change, outcome)
            });
        }

        let mut stats = ProcessingStats::default();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((change, Ok(outcome))) => {
                    info!("Applied {} change to {:?}: {:?}", change.change_type, change.path, outcome);
                    stats.record(change.change_type, outcome);
                }
                Ok((change, Err(e))) => {
                    error!("Failed to process {:?}: {:#}", change.path, e);
                    stats.errors += 1;
                }
                Err(e) => {
                    error!("Change task failed: {}", e);
                    stats.errors += 1;
                }
            }
        }

        stats
    }
}
