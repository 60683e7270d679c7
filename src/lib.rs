pub mod cli;
pub mod commands;
pub mod config;
pub mod indexer;
pub mod indexing;
pub mod logging;
pub mod rpc;
pub mod service;
pub mod symbol;
pub mod watcher;

pub use config::Config;
pub use service::CodeSearchService;
pub use symbol::{DefinitionRecord, SearchEngine, SearchError, SymbolIndex};
