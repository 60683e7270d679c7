pub mod context;
pub mod lexer;
pub mod scanner;
pub mod walker;

pub use context::{ContextResolver, DefinitionSite};
pub use scanner::{bounded_position, find_definitions, SourceScanner};
pub use walker::{SourceFilter, Walker};
