//! Definition indexing and search
//!
//! [`SymbolIndex`] holds the definitions extracted from every project file and
//! hands out immutable snapshots; [`SearchEngine`] ranks name matches against
//! the current snapshot.

pub mod index;
pub mod search;

pub use index::{DefinitionRecord, FileEntry, IndexSnapshot, ScanTicket, SymbolIndex};
pub use search::{MatchKind, SearchEngine, SearchError, SearchHit};
