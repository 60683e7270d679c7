use anyhow::Result;
use std::path::Path;

use crate::service::CodeSearchService;
use crate::symbol::SearchHit;
use crate::Config;

/// Index the project, then print ranked definitions matching `term`
pub async fn run(
    root: &Path,
    config: &Config,
    term: &str,
    prefix_only: Option<bool>,
    limit: Option<usize>,
) -> Result<()> {
    let service = CodeSearchService::new(root.to_path_buf(), config)?;
    service.index_project().await?;

    let limit = limit.unwrap_or(config.search.default_limit);
    let prefix_only = prefix_only.unwrap_or(config.search.prefix_only);
    let hits = service.engine().search_limited(term, prefix_only, Some(limit))?;

    if hits.is_empty() {
        println!("No definitions found for: {}", term.trim());
        return Ok(());
    }

    for hit in &hits {
        println!("{}", format_hit(root, hit));
    }

    Ok(())
}

/// `name  (context)  path:line:column`
fn format_hit(root: &Path, hit: &SearchHit) -> String {
    let display_path = hit.path.strip_prefix(root).unwrap_or(&hit.path);
    let definition = &hit.definition;
    format!(
        "{}  ({})  {}:{}:{}",
        definition.name,
        definition.context,
        display_path.display(),
        definition.line,
        definition.column
    )
}
