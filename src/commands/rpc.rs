use anyhow::{Context, Result};
use serde_json::Value;
use std::path::Path;

use crate::rpc::RpcRegistry;
use crate::service::CodeSearchService;
use crate::Config;

/// Index the project and dispatch one request through the handler registry
pub async fn run(root: &Path, config: &Config, method: &str, params: &str) -> Result<()> {
    let params: Value = serde_json::from_str(params)
        .with_context(|| format!("Params are not valid JSON: {}", params))?;

    let registry = RpcRegistry::new();
    let service = CodeSearchService::new(root.to_path_buf(), config)?;
    service.index_project().await?;

    let result = registry.call(&service, method, &params)?;
    println!("{}", serde_json::to_string_pretty(&result)?);

    Ok(())
}
