use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const CONFIG_DIR: &str = ".codesearch";
const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub indexer: IndexerConfig,

    #[serde(default)]
    pub search: SearchConfig,

    #[serde(default)]
    pub watcher: WatcherSettings,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexerConfig {
    /// File extensions to index (without the dot; `Rprofile` matches `.Rprofile`)
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Path components to skip (in addition to .gitignore)
    #[serde(default = "default_ignore_patterns")]
    pub ignore_patterns: Vec<String>,

    /// Number of threads for project scans (None = auto-detect)
    #[serde(default)]
    pub parallel_threads: Option<usize>,

    /// Number of files read per blocking batch
    #[serde(default = "default_file_batch_size")]
    pub file_batch_size: usize,

    /// Files larger than this are indexed as having no definitions
    #[serde(default = "default_max_file_size_bytes")]
    pub max_file_size_bytes: u64,
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
            ignore_patterns: default_ignore_patterns(),
            parallel_threads: None,
            file_batch_size: default_file_batch_size(),
            max_file_size_bytes: default_max_file_size_bytes(),
        }
    }
}

fn default_extensions() -> Vec<String> {
    vec!["R".to_string(), "r".to_string(), "Rprofile".to_string()]
}

fn default_ignore_patterns() -> Vec<String> {
    vec![
        ".git".to_string(),
        ".Rproj.user".to_string(),
        ".codesearch".to_string(),
        "renv".to_string(),
        "packrat".to_string(),
        "node_modules".to_string(),
    ]
}

fn default_file_batch_size() -> usize {
    100
}

fn default_max_file_size_bytes() -> u64 {
    2 * 1024 * 1024
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Default number of results shown by the CLI
    #[serde(default = "default_search_limit")]
    pub default_limit: usize,

    /// Match mode used when a request does not say
    #[serde(default)]
    pub prefix_only: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_limit: default_search_limit(),
            prefix_only: false,
        }
    }
}

fn default_search_limit() -> usize {
    50
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatcherSettings {
    /// Debounce delay in milliseconds
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

impl Default for WatcherSettings {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
        }
    }
}

fn default_debounce_ms() -> u64 {
    500
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Write logs to rolling files
    #[serde(default)]
    pub enabled: bool,

    /// Also log to stderr (filtered by RUST_LOG)
    #[serde(default = "default_true")]
    pub stderr: bool,

    /// File log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log directory, relative to the project root unless absolute
    #[serde(default = "default_log_directory")]
    pub directory: PathBuf,

    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,

    /// hourly, daily, minutely or never
    #[serde(default = "default_rotation")]
    pub rotation: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            stderr: default_true(),
            level: default_log_level(),
            directory: default_log_directory(),
            file_prefix: default_file_prefix(),
            rotation: default_rotation(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_directory() -> PathBuf {
    PathBuf::from(CONFIG_DIR).join("logs")
}

fn default_file_prefix() -> String {
    "codesearch.log".to_string()
}

fn default_rotation() -> String {
    "daily".to_string()
}

impl Config {
    /// Load configuration from the .codesearch directory
    pub fn load(root: &Path) -> Result<Self> {
        let config_path = root.join(CONFIG_DIR).join(CONFIG_FILE);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)
                .with_context(|| format!("Failed to read config from {:?}", config_path))?;

            toml::from_str(&content)
                .with_context(|| format!("Failed to parse config from {:?}", config_path))
        } else {
            Ok(Config::default())
        }
    }

    /// Save configuration to the .codesearch directory
    pub fn save(&self, root: &Path) -> Result<()> {
        let config_dir = Self::config_dir(root);
        let config_path = config_dir.join(CONFIG_FILE);

        std::fs::create_dir_all(&config_dir)
            .with_context(|| format!("Failed to create config directory {:?}", config_dir))?;

        let content =
            toml::to_string_pretty(self).with_context(|| "Failed to serialize config")?;

        std::fs::write(&config_path, content)
            .with_context(|| format!("Failed to write config to {:?}", config_path))?;

        Ok(())
    }

    /// Get the path to the .codesearch directory
    pub fn config_dir(root: &Path) -> PathBuf {
        root.join(CONFIG_DIR)
    }

    /// Check if a project configuration exists in the given directory
    pub fn is_initialized(root: &Path) -> bool {
        Self::config_dir(root).join(CONFIG_FILE).exists()
    }
}
