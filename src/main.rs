use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use codesearch::cli::{requested_prefix_only, Cli, Commands};
use codesearch::config::Config;
use codesearch::logging::{init_early_logging, init_logging};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let project_root = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));

    let config = match Config::load(&project_root) {
        Ok(config) => config,
        Err(e) => {
            init_early_logging();
            tracing::warn!("Using default configuration: {:#}", e);
            Config::default()
        }
    };

    // The guard MUST be held until program exit to ensure logs are flushed
    let _logging_guard = match init_logging(&config.logging, &project_root) {
        Ok(guard) => Some(guard),
        Err(e) => {
            init_early_logging();
            tracing::warn!("Falling back to stderr logging: {:#}", e);
            None
        }
    };

    tracing::debug!("Project root: {}", project_root.display());

    match cli.command {
        Commands::Init { force } => {
            codesearch::commands::init::run(&project_root, force).await?;
        }
        Commands::Index => {
            codesearch::commands::index::run(&project_root, &config).await?;
        }
        Commands::Search {
            term,
            prefix,
            substring,
            limit,
        } => {
            let prefix_only = requested_prefix_only(prefix, substring);
            codesearch::commands::search::run(&project_root, &config, &term, prefix_only, limit)
                .await?;
        }
        Commands::Watch { debounce_ms } => {
            codesearch::commands::watch::run(&project_root, &config, debounce_ms).await?;
        }
        Commands::Rpc { method, params } => {
            codesearch::commands::rpc::run(&project_root, &config, &method, &params).await?;
        }
    }

    Ok(())
}
