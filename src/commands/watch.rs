//! Watch command implementation
//!
//! Indexes the project, then keeps the index current until Ctrl+C.

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use tokio::signal;
use tracing::info;

use crate::service::CodeSearchService;
use crate::watcher::{FileWatcher, WatcherConfig};
use crate::Config;

pub async fn run(root: &Path, config: &Config, debounce_ms: Option<u64>) -> Result<()> {
    let debounce_ms = debounce_ms.unwrap_or(config.watcher.debounce_ms);

    let service = CodeSearchService::new(root.to_path_buf(), config)?;
    let initial = service.index_project().await?;
    println!("{}", initial.summary());

    println!("Watching {} (debounce {}ms)", root.display(), debounce_ms);
    println!("Press Ctrl+C to stop.");

    let watcher = FileWatcher::new(
        root.to_path_buf(),
        WatcherConfig::from_config(config, debounce_ms),
        Arc::clone(service.indexer()),
    );
    let mut handle = watcher.spawn();

    signal::ctrl_c().await?;
    println!();
    println!("Shutting down...");

    handle.shutdown();
    let stats = handle.wait().await?;

    println!("----------------------------------------");
    println!("  Files added:     {}", stats.files_added);
    println!("  Files modified:  {}", stats.files_modified);
    println!("  Files deleted:   {}", stats.files_deleted);
    println!("  Definitions:     {}", stats.definitions_indexed);
    if stats.superseded > 0 {
        println!("  Superseded:      {}", stats.superseded);
    }
    if stats.errors > 0 {
        println!("  Errors:          {}", stats.errors);
    }
    println!("----------------------------------------");

    info!("Watch session ended");

    Ok(())
}
