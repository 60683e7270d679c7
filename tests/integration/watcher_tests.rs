use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;

use codesearch::watcher::{ChangeHandler, FileChange, FileWatcher, WatcherConfig};

use crate::helpers::test_harness::TestHarness;
use crate::helpers::test_utils::{GRAPHICS_R, UTIL_R};

#[tokio::test]
async fn test_change_handler_applies_batch() -> Result<()> {
    let harness = TestHarness::new()?;
    let graphics = harness.create_test_file("graphics.R", GRAPHICS_R)?;
    let util = harness.create_test_file("util.R", UTIL_R)?;
    harness.service.index_project().await?;

    std::fs::write(&graphics, "plot <- function(x) x\n")?;
    harness.remove_test_file("util.R")?;
    let added = harness.create_test_file("new.R", "fresh <- function() 1\n")?;

    let handler = ChangeHandler::new(Arc::clone(harness.service.indexer()));
    let stats = handler
        .process_changes(vec![
            FileChange::modified(graphics),
            FileChange::deleted(util),
            FileChange::created(added),
        ])
        .await;

    assert_eq!(stats.files_added, 1);
    assert_eq!(stats.files_modified, 1);
    assert_eq!(stats.files_deleted, 1);
    assert_eq!(stats.errors, 0);

    assert_eq!(harness.names_in("graphics.R"), vec!["plot"]);
    assert!(harness.names_in("util.R").is_empty());
    assert_eq!(harness.names_in("new.R"), vec!["fresh"]);
    assert_eq!(harness.service.index().file_count(), 2);

    Ok(())
}

#[tokio::test]
async fn test_watcher_picks_up_new_file() -> Result<()> {
    let harness = TestHarness::new()?;
    harness.create_test_file("graphics.R", GRAPHICS_R)?;
    harness.service.index_project().await?;

    let watcher = FileWatcher::new(
        harness.path().to_path_buf(),
        WatcherConfig::from_config(&harness.config, 100),
        Arc::clone(harness.service.indexer()),
    );
    let mut handle = watcher.spawn();

    // Give the backend time to register the watch
    tokio::time::sleep(Duration::from_millis(300)).await;
    harness.create_test_file("util.R", UTIL_R)?;

    let mut found = false;
    for _ in 0..50 {
        if !harness.service.search_code("plotMatrix", None)?.is_empty() {
            found = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }

    handle.shutdown();
    handle.wait().await?;

    assert!(found, "watcher never indexed util.R");

    Ok(())
}
