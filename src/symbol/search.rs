//! Name search over the definition index

use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

use super::index::{DefinitionRecord, IndexSnapshot, SymbolIndex};

/// Errors returned by [`SearchEngine`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    /// The search term was missing, empty or whitespace-only
    #[error("Invalid query: {0}")]
    InvalidQuery(String),
}

/// How a definition name matched the search term, best first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchKind {
    Exact,
    Prefix,
    Substring,
}

impl MatchKind {
    /// Classify `name` against `term`; `None` if it does not match in this mode
    pub fn classify(name: &str, term: &str, prefix_only: bool) -> Option<Self> {
        if name == term {
            Some(Self::Exact)
        } else if name.starts_with(term) {
            Some(Self::Prefix)
        } else if !prefix_only && name.contains(term) {
            Some(Self::Substring)
        } else {
            None
        }
    }
}

/// A matched definition and the file it came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchHit {
    pub path: PathBuf,
    pub definition: DefinitionRecord,
    pub match_kind: MatchKind,
}

/// Executes name queries against the current index snapshot
#[derive(Debug, Clone)]
pub struct SearchEngine {
    index: Arc<SymbolIndex>,
}

impl SearchEngine {
    pub fn new(index: Arc<SymbolIndex>) -> Self {
        Self { index }
    }

    /// Search definition names.
    ///
    /// With `prefix_only` only names starting with `term` match, otherwise
    /// any name containing it. Matching is case-sensitive. Results are
    /// ordered exact, prefix, substring, then by path, line and column.
    pub fn search(&self, term: &str, prefix_only: bool) -> Result<Vec<SearchHit>, SearchError> {
        Self::search_snapshot(&self.index.snapshot(), term, prefix_only)
    }

    /// Like [`search`](Self::search), truncated to `limit` results after ranking
    pub fn search_limited(
        &self,
        term: &str,
        prefix_only: bool,
        limit: Option<usize>,
    ) -> Result<Vec<SearchHit>, SearchError> {
        let mut hits = self.search(term, prefix_only)?;
        if let Some(limit) = limit {
            hits.truncate(limit);
        }
        Ok(hits)
    }

    /// Run a query against a fixed snapshot
    pub fn search_snapshot(
        snapshot: &IndexSnapshot,
        term: &str,
        prefix_only: bool,
    ) -> Result<Vec<SearchHit>, SearchError> {
        let term = term.trim();
        if term.is_empty() {
            return Err(SearchError::InvalidQuery(
                "search term must not be empty".to_string(),
            ));
        }

        let mut hits: Vec<SearchHit> = snapshot
            .entries()
            .flat_map(|entry| {
                entry.definitions.iter().filter_map(|definition| {
                    MatchKind::classify(&definition.name, term, prefix_only).map(|match_kind| {
                        SearchHit {
                            path: entry.path.clone(),
                            definition: definition.clone(),
                            match_kind,
                        }
                    })
                })
            })
            .collect();

        hits.sort_by(|a, b| {
            a.match_kind
                .cmp(&b.match_kind)
                .then_with(|| a.path.cmp(&b.path))
                .then_with(|| a.definition.line.cmp(&b.definition.line))
                .then_with(|| a.definition.column.cmp(&b.definition.column))
                .then_with(|| a.definition.name.cmp(&b.definition.name))
        });

        debug!(
            "Search for '{}' (prefix_only={}) matched {} definitions",
            term,
            prefix_only,
            hits.len()
        );

        Ok(hits)
    }
}
