//! In-memory definition index with per-file atomic replacement

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tracing::{debug, trace};

/// A single indexed function definition
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DefinitionRecord {
    /// Function name
    pub name: String,
    /// Display label for where the definition lives (file name, enclosing functions)
    pub context: String,
    /// 1-based line number
    pub line: u32,
    /// 1-based column number
    pub column: u32,
}

/// All definitions produced by one scan of one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub path: PathBuf,
    pub definitions: Vec<DefinitionRecord>,
}

/// Proof that a scan of `path` was started at a given generation.
///
/// A scan may only commit if no newer scan, upsert or removal of the
/// same path happened after it was issued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanTicket {
    path: PathBuf,
    generation: u64,
}

impl ScanTicket {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[derive(Debug, Clone, Default)]
struct IndexState {
    entries: HashMap<PathBuf, Arc<FileEntry>>,
    symbol_count: usize,
}

#[derive(Debug, Default)]
struct Generations {
    next: u64,
    by_path: HashMap<PathBuf, u64>,
}

impl Generations {
    fn advance(&mut self, path: &Path) -> u64 {
        self.next += 1;
        self.by_path.insert(path.to_path_buf(), self.next);
        self.next
    }

    /// Stop tracking `path`. Outstanding tickets stay stale because
    /// generations are never reissued.
    fn forget(&mut self, path: &Path) {
        self.by_path.remove(path);
    }

    fn is_current(&self, ticket: &ScanTicket) -> bool {
        self.by_path.get(&ticket.path) == Some(&ticket.generation)
    }
}

/// Read-only view of the index at a point in time.
///
/// Cloning is cheap; later writes to the [`SymbolIndex`] never show up in
/// an existing snapshot.
#[derive(Debug, Clone, Default)]
pub struct IndexSnapshot {
    state: Arc<IndexState>,
}

impl IndexSnapshot {
    /// Iterate over every registered file entry (unordered)
    pub fn entries(&self) -> impl Iterator<Item = &FileEntry> {
        self.state.entries.values().map(|entry| entry.as_ref())
    }

    /// Get the entry for a file
    pub fn get(&self, path: &Path) -> Option<&FileEntry> {
        self.state.entries.get(path).map(|entry| entry.as_ref())
    }

    /// Number of registered files
    pub fn file_count(&self) -> usize {
        self.state.entries.len()
    }

    /// Total number of definitions across all files
    pub fn symbol_count(&self) -> usize {
        self.state.symbol_count
    }

    /// Registered file paths, sorted
    pub fn files(&self) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = self.state.entries.keys().cloned().collect();
        files.sort();
        files
    }
}

/// Project-wide definition index.
///
/// Writers copy-on-write the shared state, so a snapshot handed to a
/// reader keeps its own consistent view and a file's definitions are
/// always replaced as a whole.
#[derive(Debug, Default)]
pub struct SymbolIndex {
    state: RwLock<Arc<IndexState>>,
    generations: Mutex<Generations>,
}

impl SymbolIndex {
    /// Create a new empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Take a read-consistent view of the index
    pub fn snapshot(&self) -> IndexSnapshot {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        IndexSnapshot {
            state: Arc::clone(&state),
        }
    }

    /// Replace all definitions for `path`
    pub fn upsert_file(&self, path: &Path, definitions: Vec<DefinitionRecord>) {
        let mut generations = self.lock_generations();
        generations.advance(path);
        self.replace_entry(path, Some(definitions));
    }

    /// Drop `path` from the index; unknown paths are ignored
    pub fn remove_file(&self, path: &Path) {
        let mut generations = self.lock_generations();
        generations.forget(path);
        self.replace_entry(path, None);
    }

    /// Register the start of a scan for `path`.
    ///
    /// Any ticket issued earlier for the same path becomes stale.
    pub fn begin_scan(&self, path: &Path) -> ScanTicket {
        let generation = self.lock_generations().advance(path);
        trace!("Scan of {:?} started at generation {}", path, generation);
        ScanTicket {
            path: path.to_path_buf(),
            generation,
        }
    }

    /// Apply the result of a scan if it is still the latest one for its path.
    ///
    /// Returns `false` when the result was superseded and dropped.
    pub fn commit_scan(&self, ticket: ScanTicket, definitions: Vec<DefinitionRecord>) -> bool {
        let generations = self.lock_generations();
        if !generations.is_current(&ticket) {
            debug!(
                "Dropping stale scan of {:?} (generation {})",
                ticket.path, ticket.generation
            );
            return false;
        }
        self.replace_entry(&ticket.path, Some(definitions));
        true
    }

    /// Remove the ticket's path if the scan is still current (the file vanished mid-scan)
    pub fn commit_removal(&self, ticket: ScanTicket) -> bool {
        let mut generations = self.lock_generations();
        if !generations.is_current(&ticket) {
            return false;
        }
        generations.forget(&ticket.path);
        self.replace_entry(&ticket.path, None);
        true
    }

    /// Number of registered files
    pub fn file_count(&self) -> usize {
        self.snapshot().file_count()
    }

    /// Total number of definitions
    pub fn symbol_count(&self) -> usize {
        self.snapshot().symbol_count()
    }

    /// Registered file paths, sorted
    pub fn files(&self) -> Vec<PathBuf> {
        self.snapshot().files()
    }

    /// Definitions currently registered for one file
    pub fn definitions_in(&self, path: &Path) -> Vec<DefinitionRecord> {
        self.snapshot()
            .get(path)
            .map(|entry| entry.definitions.clone())
            .unwrap_or_default()
    }

    fn lock_generations(&self) -> std::sync::MutexGuard<'_, Generations> {
        self.generations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    // Callers hold the generations lock, which serializes all writers.
    fn replace_entry(&self, path: &Path, definitions: Option<Vec<DefinitionRecord>>) {
        let mut guard = self.state.write().unwrap_or_else(PoisonError::into_inner);
        let state = Arc::make_mut(&mut *guard);

        if let Some(old) = state.entries.remove(path) {
            state.symbol_count -= old.definitions.len();
        }

        if let Some(definitions) = definitions {
            state.symbol_count += definitions.len();
            state.entries.insert(
                path.to_path_buf(),
                Arc::new(FileEntry {
                    path: path.to_path_buf(),
                    definitions,
                }),
            );
        }
    }
}
