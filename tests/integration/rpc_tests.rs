use anyhow::Result;
use serde_json::json;

use codesearch::rpc::{RpcError, RpcRegistry};

use crate::helpers::test_harness::TestHarness;
use crate::helpers::test_utils::{GRAPHICS_R, UTIL_R};

#[tokio::test]
async fn test_search_code_over_indexed_project() -> Result<()> {
    let harness = TestHarness::new()?;
    harness.create_test_file("R/graphics.R", GRAPHICS_R)?;
    harness.create_test_file("R/util.R", UTIL_R)?;
    harness.service.index_project().await?;

    let registry = RpcRegistry::new();
    let result = registry.call(&harness.service, "search_code", &json!(["plot", false]))?;

    assert_eq!(
        result,
        json!([
            {"name": "plot", "context": "graphics.R", "line": 10, "column": 1},
            {"name": "plotMatrix", "context": "util.R", "line": 4, "column": 3}
        ])
    );

    let result = registry.call(&harness.service, "search_code", &json!(["Matrix", true]))?;
    assert_eq!(result, json!([]));

    Ok(())
}

#[tokio::test]
async fn test_empty_index_returns_empty_list() -> Result<()> {
    let harness = TestHarness::new()?;
    let registry = RpcRegistry::new();

    let result = registry.call(&harness.service, "search_code", &json!(["anything"]))?;
    assert_eq!(result, json!([]));

    Ok(())
}

#[tokio::test]
async fn test_blank_term_maps_to_invalid_query() -> Result<()> {
    let harness = TestHarness::new()?;
    let registry = RpcRegistry::new();

    assert!(matches!(
        registry.call(&harness.service, "search_code", &json!([""])),
        Err(RpcError::InvalidQuery(_))
    ));

    Ok(())
}
