use anyhow::Result;

use codesearch::symbol::{MatchKind, SearchError};

use crate::helpers::test_harness::TestHarness;
use crate::helpers::test_utils::{summarize, GRAPHICS_R, NESTED_R, UTIL_R};

async fn plot_project() -> Result<TestHarness> {
    let harness = TestHarness::new()?;
    harness.create_test_file("graphics.R", GRAPHICS_R)?;
    harness.create_test_file("util.R", UTIL_R)?;
    harness.service.index_project().await?;
    Ok(harness)
}

#[tokio::test]
async fn test_plot_scenario() -> Result<()> {
    let harness = plot_project().await?;

    let records = harness.service.search_code("plot", Some(false))?;
    assert_eq!(
        summarize(&records),
        vec![
            ("plot".to_string(), "graphics.R".to_string(), 10, 1),
            ("plotMatrix".to_string(), "util.R".to_string(), 4, 3),
        ]
    );

    let records = harness.service.search_code("Matrix", Some(true))?;
    assert!(records.is_empty());

    let records = harness.service.search_code("Matrix", None)?;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].name, "plotMatrix");

    Ok(())
}

#[tokio::test]
async fn test_exact_match_ranks_first() -> Result<()> {
    let harness = TestHarness::new()?;
    harness.create_test_file("a.R", "replot <- function() 1\nplotAll <- function() 2\n")?;
    harness.create_test_file("z.R", "plot <- function() 3\n")?;
    harness.service.index_project().await?;

    let hits = harness.service.search("plot", None)?;
    let ranked: Vec<(&str, MatchKind)> = hits
        .iter()
        .map(|hit| (hit.definition.name.as_str(), hit.match_kind))
        .collect();

    assert_eq!(
        ranked,
        vec![
            ("plot", MatchKind::Exact),
            ("plotAll", MatchKind::Prefix),
            ("replot", MatchKind::Substring),
        ]
    );

    Ok(())
}

#[tokio::test]
async fn test_search_is_case_sensitive_and_trims_term() -> Result<()> {
    let harness = plot_project().await?;

    assert!(harness.service.search_code("PLOT", None)?.is_empty());
    assert_eq!(harness.service.search_code("  plot\t", Some(true))?.len(), 2);

    Ok(())
}

#[tokio::test]
async fn test_blank_term_is_rejected() -> Result<()> {
    let harness = plot_project().await?;

    for term in ["", "   ", "\n"] {
        assert!(matches!(
            harness.service.search_code(term, None),
            Err(SearchError::InvalidQuery(_))
        ));
    }

    Ok(())
}

#[tokio::test]
async fn test_results_are_deterministic() -> Result<()> {
    let harness = plot_project().await?;
    harness.create_test_file("nested.R", NESTED_R)?;
    harness.service.index_project().await?;

    let first = harness.service.search_code("e", None)?;
    for _ in 0..5 {
        assert_eq!(harness.service.search_code("e", None)?, first);
    }

    Ok(())
}

#[tokio::test]
async fn test_limit_applies_after_ranking() -> Result<()> {
    let harness = plot_project().await?;

    let hits = harness
        .service
        .engine()
        .search_limited("plot", false, Some(1))?;

    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].definition.name, "plot");

    Ok(())
}

#[tokio::test]
async fn test_snapshot_is_isolated_from_later_updates() -> Result<()> {
    let harness = plot_project().await?;
    let snapshot = harness.service.index().snapshot();

    harness.remove_test_file("util.R")?;
    harness.service.index_project().await?;

    let before = codesearch::SearchEngine::search_snapshot(&snapshot, "plotMatrix", false)?;
    let after = harness.service.search_code("plotMatrix", None)?;

    assert_eq!(before.len(), 1);
    assert!(after.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_configured_prefix_mode_applies_when_flag_absent() -> Result<()> {
    let mut config = codesearch::Config::default();
    config.search.prefix_only = true;
    let harness = TestHarness::with_config(config)?;
    harness.create_test_file("util.R", UTIL_R)?;
    harness.service.index_project().await?;

    assert!(harness.service.search_code("Matrix", None)?.is_empty());
    assert_eq!(harness.service.search_code("Matrix", Some(false))?.len(), 1);

    Ok(())
}
