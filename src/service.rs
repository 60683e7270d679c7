//! Session-owned code search service
//!
//! Owns the [`SymbolIndex`] for one project and exposes indexing and search
//! to the request layer. There is no process-wide index; each service is
//! independent.

use anyhow::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::Config;
use crate::indexing::{EventOutcome, FileEvent, ProcessingResult, ProjectIndexer};
use crate::symbol::{DefinitionRecord, SearchEngine, SearchError, SearchHit, SymbolIndex};

pub struct CodeSearchService {
    index: Arc<SymbolIndex>,
    indexer: Arc<ProjectIndexer>,
    engine: SearchEngine,
    default_prefix_only: bool,
}

impl CodeSearchService {
    /// Create a service with an empty index for the project at `root`
    pub fn new(root: PathBuf, config: &Config) -> Result<Self> {
        let index = Arc::new(SymbolIndex::new());
        let indexer = Arc::new(ProjectIndexer::new(root, Arc::clone(&index), &config.indexer)?);
        let engine = SearchEngine::new(Arc::clone(&index));

        Ok(Self {
            index,
            indexer,
            engine,
            default_prefix_only: config.search.prefix_only,
        })
    }

    pub fn root(&self) -> &Path {
        self.indexer.root()
    }

    pub fn index(&self) -> &Arc<SymbolIndex> {
        &self.index
    }

    pub fn indexer(&self) -> &Arc<ProjectIndexer> {
        &self.indexer
    }

    pub fn engine(&self) -> &SearchEngine {
        &self.engine
    }

    /// Scan the whole project
    pub async fn index_project(&self) -> Result<ProcessingResult> {
        self.indexer.index_project().await
    }

    /// Apply a change notification from a project watcher
    pub async fn apply_event(&self, event: FileEvent) -> Result<EventOutcome> {
        self.indexer.apply_event(event).await
    }

    /// Search definitions; without `prefix_only` the configured mode applies
    /// (substring matching by default)
    pub fn search(&self, term: &str, prefix_only: Option<bool>) -> Result<Vec<SearchHit>, SearchError> {
        self.engine
            .search(term, prefix_only.unwrap_or(self.default_prefix_only))
    }

    /// Search and return the bare records as delivered to request callers
    pub fn search_code(
        &self,
        term: &str,
        prefix_only: Option<bool>,
    ) -> Result<Vec<DefinitionRecord>, SearchError> {
        Ok(self
            .search(term, prefix_only)?
            .into_iter()
            .map(|hit| hit.definition)
            .collect())
    }
}
