//! Project scanning: parallel full scans and per-file incremental updates

use anyhow::{Context, Result};
use rayon::prelude::*;
use std::collections::HashSet;
use std::fs;
use std::io::ErrorKind;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::config::IndexerConfig;
use crate::indexer::{SourceScanner, Walker};
use crate::symbol::{DefinitionRecord, ScanTicket, SymbolIndex};

use super::errors::{ErrorCollector, ProcessingStage};
use super::pipeline::{EventOutcome, FileEvent, ProcessingResult};

/// Outcome of reading a source file from disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceRead {
    Content(String),
    /// The file no longer exists
    Missing,
}

/// Read a source file for scanning.
///
/// Invalid UTF-8 is replaced rather than rejected, and files above
/// `max_bytes` read as empty so they contribute no definitions.
pub fn read_source(path: &Path, max_bytes: u64) -> std::io::Result<SourceRead> {
    let metadata = match fs::metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(SourceRead::Missing),
        Err(e) => return Err(e),
    };

    if metadata.len() > max_bytes {
        warn!(
            "Skipping {:?}: {} bytes exceeds the {} byte limit",
            path,
            metadata.len(),
            max_bytes
        );
        return Ok(SourceRead::Content(String::new()));
    }

    match fs::read(path) {
        Ok(bytes) => Ok(SourceRead::Content(
            String::from_utf8_lossy(&bytes).into_owned(),
        )),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(SourceRead::Missing),
        Err(e) => Err(e),
    }
}

/// Keeps a [`SymbolIndex`] in sync with the project's source files
pub struct ProjectIndexer {
    index: Arc<SymbolIndex>,
    scanner: Arc<SourceScanner>,
    walker: Walker,
    config: IndexerConfig,
    pool: Arc<rayon::ThreadPool>,
}

impl ProjectIndexer {
    pub fn new(root: PathBuf, index: Arc<SymbolIndex>, config: &IndexerConfig) -> Result<Self> {
        let threads = config.parallel_threads.unwrap_or_else(num_cpus::get).max(1);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("codesearch-scan-{}", i))
            .build()
            .context("Failed to initialize Rayon thread pool")?;
        debug!("Using {} threads for project scans", threads);

        Ok(Self {
            index,
            scanner: Arc::new(SourceScanner::new()),
            walker: Walker::new(root, config),
            config: config.clone(),
            pool: Arc::new(pool),
        })
    }

    pub fn index(&self) -> &Arc<SymbolIndex> {
        &self.index
    }

    pub fn root(&self) -> &Path {
        self.walker.root()
    }

    /// Worker threads used for project scans
    pub fn scan_threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Scan every source file in the project.
    ///
    /// Entries for files that are no longer part of the project are removed.
    /// Unreadable files are indexed as empty and reported in the result.
    pub async fn index_project(&self) -> Result<ProcessingResult> {
        let start = Instant::now();
        let files = self.walker.collect_files();
        info!("Scanning {} source files under {:?}", files.len(), self.root());

        let mut result = ProcessingResult::new();
        let errors = ErrorCollector::new();

        let on_disk: HashSet<&PathBuf> = files.iter().collect();
        for stale in self.index.files() {
            if !on_disk.contains(&stale) {
                debug!("Dropping {:?}, no longer part of the project", stale);
                self.index.remove_file(&stale);
                result.files_removed += 1;
            }
        }

        for batch in files.chunks(self.config.file_batch_size.max(1)) {
            let tickets: Vec<ScanTicket> = batch
                .iter()
                .map(|path| self.index.begin_scan(path))
                .collect();

            let index = Arc::clone(&self.index);
            let scanner = Arc::clone(&self.scanner);
            let pool = Arc::clone(&self.pool);
            let errors = errors.clone();
            let max_bytes = self.config.max_file_size_bytes;

            let outcomes = tokio::task::spawn_blocking(move || {
                pool.install(|| {
                    tickets
                        .into_par_iter()
                        .map(|ticket| scan_from_disk(&index, &scanner, ticket, max_bytes, &errors))
                        .collect::<Vec<_>>()
                })
            })
            .await
            .context("Project scan worker failed")?;

            for outcome in outcomes {
                result.record(outcome);
            }
        }

        result.errors = errors.drain();
        result.duration_secs = start.elapsed().as_secs_f64();

        info!(
            "Project scan completed in {:.2}s: {} files, {} definitions, {} errors",
            result.duration_secs,
            result.files_processed,
            result.definitions_indexed,
            result.errors.len()
        );

        Ok(result)
    }

    /// Apply one change notification.
    ///
    /// The scan runs on the blocking pool; if another event for the same
    /// path is applied before it finishes, this result is dropped.
    pub async fn apply_event(&self, event: FileEvent) -> Result<EventOutcome> {
        let FileEvent { path, content } = event;

        let Some(content) = content else {
            self.index.remove_file(&path);
            debug!("Removed {:?} from index", path);
            return Ok(EventOutcome::Removed);
        };

        let ticket = self.index.begin_scan(&path);
        let scanner = Arc::clone(&self.scanner);
        let definitions = tokio::task::spawn_blocking(move || scanner.scan(&path, &content))
            .await
            .context("Scan task failed")?;

        Ok(commit(&self.index, ticket, definitions))
    }

    /// Re-read one file from disk and apply it.
    ///
    /// The ticket is taken before the read starts, so an update that lands
    /// while the file is still being read wins over this rescan.
    pub async fn rescan_file(&self, path: &Path) -> Result<EventOutcome> {
        let ticket = self.index.begin_scan(path);
        let index = Arc::clone(&self.index);
        let scanner = Arc::clone(&self.scanner);
        let max_bytes = self.config.max_file_size_bytes;

        tokio::task::spawn_blocking(move || {
            let errors = ErrorCollector::new();
            let outcome = scan_from_disk(&index, &scanner, ticket, max_bytes, &errors);
            // Read failures were already logged by scan_from_disk
            for error in errors.drain() {
                if error.stage != ProcessingStage::FileRead {
                    warn!("Rescan of {:?} failed during {}: {}", error.path, error.stage, error.error);
                }
            }
            outcome
        })
        .await
        .context("Rescan task failed")
    }
}

fn commit(index: &SymbolIndex, ticket: ScanTicket, definitions: Vec<DefinitionRecord>) -> EventOutcome {
    let count = definitions.len();
    if index.commit_scan(ticket, definitions) {
        EventOutcome::Indexed { definitions: count }
    } else {
        EventOutcome::Superseded
    }
}

fn scan_from_disk(
    index: &SymbolIndex,
    scanner: &SourceScanner,
    ticket: ScanTicket,
    max_bytes: u64,
    errors: &ErrorCollector,
) -> EventOutcome {
    let path = ticket.path().to_path_buf();

    let content = match read_source(&path, max_bytes) {
        Ok(SourceRead::Content(content)) => content,
        Ok(SourceRead::Missing) => {
            return if index.commit_removal(ticket) {
                EventOutcome::Removed
            } else {
                EventOutcome::Superseded
            };
        }
        Err(e) => {
            warn!("Could not read {:?}: {}", path, e);
            errors.record(path, e, ProcessingStage::FileRead);
            return commit(index, ticket, Vec::new());
        }
    };

    match catch_unwind(AssertUnwindSafe(|| scanner.scan(&path, &content))) {
        Ok(definitions) => commit(index, ticket, definitions),
        Err(_) => {
            errors.record(path, "panic during scan", ProcessingStage::Scanning);
            commit(index, ticket, Vec::new())
        }
    }
}
