//! File system watcher that keeps the index current
//!
//! Debounced notify events are filtered to project source files, coalesced
//! per path and handed to the [`ProjectIndexer`] as file events.

pub mod debouncer;
pub mod handler;

use anyhow::{Context, Result};
use notify::RecursiveMode;
use notify_debouncer_full::{new_debouncer, DebouncedEvent};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::indexer::SourceFilter;
use crate::indexing::ProjectIndexer;

pub use debouncer::{coalesce, ChangeType, FileChange};
pub use handler::{ChangeHandler, ProcessingStats};

/// Configuration for the file watcher
#[derive(Debug, Clone)]
pub struct WatcherConfig {
    /// Debounce delay in milliseconds
    pub debounce_ms: u64,
    /// Which paths count as project sources
    pub filter: SourceFilter,
}

impl WatcherConfig {
    pub fn from_config(config: &Config, debounce_ms: u64) -> Self {
        Self {
            debounce_ms,
            filter: SourceFilter::new(&config.indexer),
        }
    }
}

/// Watches the project root and applies changes to the index
pub struct FileWatcher {
    root: PathBuf,
    config: WatcherConfig,
    indexer: Arc<ProjectIndexer>,
}

impl FileWatcher {
    pub fn new(root: PathBuf, mut config: WatcherConfig, indexer: Arc<ProjectIndexer>) -> Self {
        config.filter = config.filter.with_root(root.clone());
        Self {
            root,
            config,
            indexer,
        }
    }

    /// Run the watcher on a background task
    pub fn spawn(self) -> WatcherHandle {
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let task = tokio::spawn(self.run(shutdown_rx));
        WatcherHandle {
            shutdown_tx: Some(shutdown_tx),
            task,
        }
    }

    /// Watch for changes until the shutdown signal is received
    pub async fn run(self, mut shutdown_rx: oneshot::Receiver<()>) -> Result<ProcessingStats> {
        let debounce_duration = Duration::from_millis(self.config.debounce_ms);
        let (tx, mut rx) = mpsc::channel::<Vec<DebouncedEvent>>(100);

        let mut debouncer = new_debouncer(
            debounce_duration,
            None,
            move |result: std::result::Result<Vec<DebouncedEvent>, Vec<notify::Error>>| {
                match result {
                    Ok(events) => {
                        if !events.is_empty() {
                            if let Err(e) = tx.blocking_send(events) {
                                error!("Failed to send debounced events: {}", e);
                            }
                        }
                    }
                    Err(errors) => {
                        for error in errors {
                            error!("Watch error: {}", error);
                        }
                    }
                }
            },
        )
        .with_context(|| "Failed to create file watcher debouncer")?;

        debouncer
            .watch(&self.root, RecursiveMode::Recursive)
            .with_context(|| format!("Failed to watch directory: {:?}", self.root))?;

        info!(
            "Watching {:?} (debounce {}ms)",
            self.root, self.config.debounce_ms
        );

        let handler = ChangeHandler::new(Arc::clone(&self.indexer));
        let mut total_stats = ProcessingStats::default();

        loop {
            tokio::select! {
                _ = &mut shutdown_rx => {
                    info!("Shutdown signal received, stopping watcher");
                    break;
                }

                Some(events) = rx.recv() => {
                    let changes = self.convert_events(events);
                    if changes.is_empty() {
                        continue;
                    }

                    info!("Processing {} file changes", changes.len());
                    let stats = handler.process_changes(changes).await;
                    if stats.errors > 0 {
                        warn!("{} changes failed to apply", stats.errors);
                    }
                    info!(
                        "Index now holds {} definitions in {} files",
                        self.indexer.index().symbol_count(),
                        self.indexer.index().file_count()
                    );
                    total_stats.merge(&stats);
                }
            }
        }

        Ok(total_stats)
    }

    /// Convert notify debounced events to per-file changes
    fn convert_events(&self, events: Vec<DebouncedEvent>) -> Vec<FileChange> {
        let mut changes = Vec::new();

        for event in &events {
            for path in &event.paths {
                if path.is_dir() {
                    continue;
                }

                if !self.config.filter.accepts(path) {
                    debug!("Skipping non-source path: {:?}", path);
                    continue;
                }

                if let Some(change_type) = ChangeType::classify(&event.kind, path) {
                    debug!("File change detected: {} -> {:?}", change_type, path);
                    changes.push(FileChange::new(path.clone(), change_type));
                }
            }
        }

        coalesce(changes)
    }
}

/// Handle to control a running watcher
pub struct WatcherHandle {
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: JoinHandle<Result<ProcessingStats>>,
}

impl WatcherHandle {
    /// Request graceful shutdown
    pub fn shutdown(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }

    /// Wait for the watcher to finish and get the final stats
    pub async fn wait(self) -> Result<ProcessingStats> {
        self.task.await.context("Watcher task panicked")?
    }
}
