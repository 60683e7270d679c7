//! File change classification and coalescing
//!
//! Debounced notify events are reduced to one [`FileChange`] per path before
//! they reach the index.

use notify::EventKind;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Types of file system changes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeType {
    Created,
    Modified,
    Deleted,
}

impl ChangeType {
    /// Map a notify event kind for `path` to a change.
    ///
    /// Renames arrive as modify events for both names, so a modified path
    /// that no longer exists counts as deleted.
    pub fn classify(kind: &EventKind, path: &Path) -> Option<Self> {
        match kind {
            EventKind::Create(_) => Some(Self::Created),
            EventKind::Modify(_) if path.exists() => Some(Self::Modified),
            EventKind::Modify(_) | EventKind::Remove(_) => Some(Self::Deleted),
            _ => None,
        }
    }
}

impl std::fmt::Display for ChangeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChangeType::Created => write!(f, "created"),
            ChangeType::Modified => write!(f, "modified"),
            ChangeType::Deleted => write!(f, "deleted"),
        }
    }
}

/// A file change event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChange {
    pub path: PathBuf,
    pub change_type: ChangeType,
}

impl FileChange {
    pub fn new(path: PathBuf, change_type: ChangeType) -> Self {
        Self { path, change_type }
    }

    pub fn created(path: PathBuf) -> Self {
        Self::new(path, ChangeType::Created)
    }

    pub fn modified(path: PathBuf) -> Self {
        Self::new(path, ChangeType::Modified)
    }

    pub fn deleted(path: PathBuf) -> Self {
        Self::new(path, ChangeType::Deleted)
    }

    /// Whether the file must be read to apply this change
    pub fn needs_content(&self) -> bool {
        !matches!(self.change_type, ChangeType::Deleted)
    }
}

/// Keep only the last change per path, ordered by path.
///
/// A file created and then modified within one debounce window stays
/// `Created`.
pub fn coalesce(changes: impl IntoIterator<Item = FileChange>) -> Vec<FileChange> {
    let mut latest: HashMap<PathBuf, ChangeType> = HashMap::new();

    for change in changes {
        let merged = match (latest.get(&change.path), change.change_type) {
            (Some(ChangeType::Created), ChangeType::Modified) => ChangeType::Created,
            (_, change_type) => change_type,
        };
        latest.insert(change.path, merged);
    }

    let mut coalesced: Vec<FileChange> = latest
        .into_iter()
        .map(|(path, change_type)| FileChange::new(path, change_type))
        .collect();
    coalesced.sort_by(|a, b| a.path.cmp(&b.path));
    coalesced
}
