use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "codesearch")]
#[command(author, version, about = "Go to File/Function search for R projects")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a default .codesearch/config.toml in the current directory
    Init {
        /// Overwrite an existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Scan the project and report what was indexed
    Index,

    /// Search function definitions by name
    Search {
        /// Name or part of a name
        term: String,

        /// Only match names starting with the term
        #[arg(short, long)]
        prefix: bool,

        /// Match the term anywhere in a name, overriding a configured prefix mode
        #[arg(short, long, conflicts_with = "prefix")]
        substring: bool,

        /// Maximum number of results to show
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Keep the index current while files change
    Watch {
        /// Debounce delay in milliseconds (defaults to the configured value)
        #[arg(short, long)]
        debounce_ms: Option<u64>,
    },

    /// Call a request handler with JSON params, e.g. `rpc search_code '["plot"]'`
    Rpc {
        /// Method name
        method: String,

        /// JSON parameter array
        #[arg(default_value = "[]")]
        params: String,
    },
}

/// Match mode requested on the command line; `None` defers to the config
pub fn requested_prefix_only(prefix: bool, substring: bool) -> Option<bool> {
    if prefix {
        Some(true)
    } else if substring {
        Some(false)
    } else {
        None
    }
}
