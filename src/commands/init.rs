use anyhow::{bail, Result};
use std::path::Path;
use tracing::info;

use crate::Config;

pub async fn run(root: &Path, force: bool) -> Result<()> {
    if Config::is_initialized(root) && !force {
        bail!(
            "codesearch is already initialized in {:?} (use --force to overwrite)",
            Config::config_dir(root)
        );
    }

    Config::default().save(root)?;

    info!("Initialized codesearch in {:?}", Config::config_dir(root));
    println!(
        "Created {} with default configuration",
        Config::config_dir(root).join("config.toml").display()
    );

    Ok(())
}
