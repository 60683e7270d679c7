use anyhow::Result;
use std::path::Path;

use crate::indexing::ErrorReport;
use crate::service::CodeSearchService;
use crate::Config;

/// Scan the project once and print a summary
pub async fn run(root: &Path, config: &Config) -> Result<()> {
    let service = CodeSearchService::new(root.to_path_buf(), config)?;
    let result = service.index_project().await?;

    println!("{}", result.summary());
    println!(
        "  {} definitions across {} files",
        service.index().symbol_count(),
        service.index().file_count()
    );

    let report = ErrorReport::from_errors(&result.errors);
    if report.has_errors() {
        report.print_summary();
    }

    Ok(())
}
