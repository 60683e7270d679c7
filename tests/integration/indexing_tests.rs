use anyhow::Result;
use std::sync::Arc;

use codesearch::indexing::{EventOutcome, FileEvent, ProjectIndexer};
use codesearch::symbol::SymbolIndex;
use codesearch::Config;

use crate::helpers::test_harness::TestHarness;
use crate::helpers::test_utils::{summarize, GRAPHICS_R, NESTED_R, NO_DEFINITIONS_R, UTIL_R};

#[tokio::test]
async fn test_index_project_registers_every_source_file() -> Result<()> {
    let harness = TestHarness::new()?;
    harness.create_test_file("R/graphics.R", GRAPHICS_R)?;
    harness.create_test_file("R/util.R", UTIL_R)?;
    harness.create_test_file("scripts/data.R", NO_DEFINITIONS_R)?;
    harness.create_test_file("README.md", "plot <- function() {}")?;

    let result = harness.service.index_project().await?;

    assert!(result.is_success());
    assert_eq!(result.files_processed, 3);
    assert_eq!(result.definitions_indexed, 3);

    // A file without definitions still gets an (empty) entry
    assert_eq!(harness.service.index().file_count(), 3);
    assert!(harness.names_in("scripts/data.R").is_empty());
    assert!(harness
        .service
        .index()
        .snapshot()
        .get(&harness.path().join("scripts/data.R"))
        .is_some());

    assert_eq!(harness.names_in("R/graphics.R"), vec!["setup", "plot"]);

    Ok(())
}

#[tokio::test]
async fn test_positions_are_one_based() -> Result<()> {
    let harness = TestHarness::new()?;
    harness.create_test_file("graphics.R", GRAPHICS_R)?;
    harness.create_test_file("util.R", UTIL_R)?;

    harness.service.index_project().await?;

    let graphics = harness
        .service
        .index()
        .definitions_in(&harness.path().join("graphics.R"));
    assert_eq!(
        summarize(&graphics),
        vec![
            ("setup".to_string(), "graphics.R".to_string(), 3, 1),
            ("plot".to_string(), "graphics.R".to_string(), 10, 1),
        ]
    );

    let util = harness
        .service
        .index()
        .definitions_in(&harness.path().join("util.R"));
    assert_eq!(
        summarize(&util),
        vec![("plotMatrix".to_string(), "util.R".to_string(), 4, 3)]
    );

    Ok(())
}

#[tokio::test]
async fn test_nested_definitions_carry_enclosing_context() -> Result<()> {
    let harness = TestHarness::new()?;
    harness.create_test_file("nested.R", NESTED_R)?;

    harness.service.index_project().await?;

    let records = harness
        .service
        .index()
        .definitions_in(&harness.path().join("nested.R"));
    assert_eq!(
        summarize(&records),
        vec![
            ("outer".to_string(), "nested.R".to_string(), 1, 1),
            ("inner".to_string(), "nested.R > outer".to_string(), 2, 3),
        ]
    );

    Ok(())
}

#[tokio::test]
async fn test_rescan_is_idempotent() -> Result<()> {
    let harness = TestHarness::new()?;
    harness.create_test_file("graphics.R", GRAPHICS_R)?;
    harness.create_test_file("util.R", UTIL_R)?;

    harness.service.index_project().await?;
    let first = harness.service.index().snapshot();

    harness.service.index_project().await?;
    let second = harness.service.index().snapshot();

    assert_eq!(first.files(), second.files());
    assert_eq!(first.symbol_count(), second.symbol_count());
    for path in first.files() {
        assert_eq!(
            first.get(&path).map(|e| &e.definitions),
            second.get(&path).map(|e| &e.definitions)
        );
    }

    Ok(())
}

#[tokio::test]
async fn test_rescan_drops_deleted_files() -> Result<()> {
    let harness = TestHarness::new()?;
    harness.create_test_file("graphics.R", GRAPHICS_R)?;
    harness.create_test_file("util.R", UTIL_R)?;

    harness.service.index_project().await?;
    assert_eq!(harness.service.index().file_count(), 2);

    harness.remove_test_file("util.R")?;
    let result = harness.service.index_project().await?;

    assert_eq!(result.files_removed, 1);
    assert_eq!(
        harness.service.index().files(),
        vec![harness.path().join("graphics.R")]
    );
    assert!(harness.service.search_code("plotMatrix", None)?.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_ignored_directories_are_skipped() -> Result<()> {
    let harness = TestHarness::new()?;
    harness.create_test_file("R/main.R", "main <- function() {}\n")?;
    harness.create_test_file("renv/library/pkg/R/vendored.R", "vendored <- function() {}\n")?;
    harness.create_test_file(".Rproj.user/shared/notebooks/scratch.R", "scratch <- function() {}\n")?;
    harness.create_test_file(".Rprofile", "startup <- function() {}\n")?;

    harness.service.index_project().await?;

    assert_eq!(
        harness.service.index().files(),
        vec![harness.path().join(".Rprofile"), harness.path().join("R/main.R")]
    );

    Ok(())
}

#[tokio::test]
async fn test_invalid_utf8_is_scanned_lossily() -> Result<()> {
    let harness = TestHarness::new()?;
    std::fs::write(
        harness.path().join("latin1.R"),
        b"# caf\xe9\nhelper <- function() 1\n",
    )?;

    let result = harness.service.index_project().await?;

    assert!(result.is_success());
    assert_eq!(harness.names_in("latin1.R"), vec!["helper"]);

    Ok(())
}

#[tokio::test]
async fn test_oversized_file_contributes_nothing() -> Result<()> {
    let mut config = Config::default();
    config.indexer.max_file_size_bytes = 32;
    let harness = TestHarness::with_config(config)?;
    harness.create_test_file("big.R", GRAPHICS_R)?;
    harness.create_test_file("small.R", "f <- function() 1\n")?;

    harness.service.index_project().await?;

    assert_eq!(harness.service.index().file_count(), 2);
    assert!(harness.names_in("big.R").is_empty());
    assert_eq!(harness.names_in("small.R"), vec!["f"]);

    Ok(())
}

#[tokio::test]
async fn test_apply_event_replaces_file_atomically() -> Result<()> {
    let harness = TestHarness::new()?;
    let path = harness.path().join("util.R");

    let outcome = harness
        .service
        .apply_event(FileEvent::changed(&path, UTIL_R))
        .await?;
    assert_eq!(outcome, EventOutcome::Indexed { definitions: 1 });

    let outcome = harness
        .service
        .apply_event(FileEvent::changed(
            &path,
            "a <- function() 1\nb <- function() 2\n",
        ))
        .await?;
    assert_eq!(outcome, EventOutcome::Indexed { definitions: 2 });
    assert_eq!(harness.names_in("util.R"), vec!["a", "b"]);

    let outcome = harness
        .service
        .apply_event(FileEvent::removed(&path))
        .await?;
    assert_eq!(outcome, EventOutcome::Removed);
    assert_eq!(harness.service.index().file_count(), 0);

    // Removing again is a no-op
    harness
        .service
        .apply_event(FileEvent::removed(&path))
        .await?;
    assert_eq!(harness.service.index().file_count(), 0);

    Ok(())
}

#[tokio::test]
async fn test_stale_scan_never_overwrites_newer_update() -> Result<()> {
    let index = Arc::new(SymbolIndex::new());
    let dir = tempfile::tempdir()?;
    let indexer = ProjectIndexer::new(
        dir.path().to_path_buf(),
        Arc::clone(&index),
        &Config::default().indexer,
    )?;
    let path = dir.path().join("util.R");

    // A slow scan of an older version starts first...
    let stale = index.begin_scan(&path);

    // ...and a newer change lands before it finishes
    indexer
        .apply_event(FileEvent::changed(&path, "fresh <- function() 1\n"))
        .await?;

    let old = vec![codesearch::DefinitionRecord {
        name: "old".to_string(),
        context: "util.R".to_string(),
        line: 1,
        column: 1,
    }];
    assert!(!index.commit_scan(stale, old));

    let names: Vec<String> = index.definitions_in(&path).into_iter().map(|d| d.name).collect();
    assert_eq!(names, vec!["fresh"]);

    Ok(())
}

#[tokio::test]
async fn test_rescan_file_of_vanished_file_removes_entry() -> Result<()> {
    let harness = TestHarness::new()?;
    harness.create_test_file("util.R", UTIL_R)?;
    harness.service.index_project().await?;

    harness.remove_test_file("util.R")?;
    let outcome = harness
        .service
        .indexer()
        .rescan_file(&harness.path().join("util.R"))
        .await?;

    assert_eq!(outcome, EventOutcome::Removed);
    assert_eq!(harness.service.index().file_count(), 0);

    Ok(())
}

/// A rescan still blocked reading old content must lose to an update that
/// commits while it waits.
#[cfg(unix)]
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_slow_rescan_loses_to_newer_update() -> Result<()> {
    use std::process::Command;
    use std::time::Duration;

    let dir = tempfile::tempdir()?;
    let path = dir.path().join("util.R");
    let status = Command::new("mkfifo").arg(&path).status()?;
    assert!(status.success(), "mkfifo failed");

    let index = Arc::new(SymbolIndex::new());
    let indexer = Arc::new(ProjectIndexer::new(
        dir.path().to_path_buf(),
        Arc::clone(&index),
        &Config::default().indexer,
    )?);

    // Reading a FIFO blocks until a writer shows up
    let slow = {
        let indexer = Arc::clone(&indexer);
        let path = path.clone();
        tokio::spawn(async move { indexer.rescan_file(&path).await })
    };
    tokio::time::sleep(Duration::from_millis(300)).await;

    let outcome = indexer
        .apply_event(FileEvent::changed(&path, "fresh <- function() 1\n"))
        .await?;
    assert_eq!(outcome, EventOutcome::Indexed { definitions: 1 });

    let writer_path = path.clone();
    tokio::task::spawn_blocking(move || std::fs::write(writer_path, "old <- function() 1\n"))
        .await??;

    let outcome = tokio::time::timeout(Duration::from_secs(10), slow).await???;
    assert_eq!(outcome, EventOutcome::Superseded);

    let names: Vec<String> = index.definitions_in(&path).into_iter().map(|d| d.name).collect();
    assert_eq!(names, vec!["fresh"]);

    Ok(())
}
