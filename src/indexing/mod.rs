//! Index maintenance: full project scans and incremental file updates

pub mod errors;
pub mod parallel;
pub mod pipeline;

pub use errors::{ErrorCollector, ErrorReport, FileError, ProcessingStage};
pub use parallel::{read_source, ProjectIndexer, SourceRead};
pub use pipeline::{EventOutcome, FileEvent, ProcessingResult};
