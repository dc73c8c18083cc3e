//! Snapshot reconciliation: normalize titles, parse the stored snapshot, compare it with
//! the freshly observed titles and render the new snapshot document.

pub mod parser;
pub mod reconcile;
pub mod render;
pub mod title;

pub use parser::parse;
pub use reconcile::reconcile;
pub use render::{EntryOrder, RenderOptions, render};
pub use title::Title;

/// Extension of every snapshot document in the store.
pub const SNAPSHOT_EXTENSION: &str = "md";

/// Heading prefix written at the top of every snapshot document.
pub const HEADING_PREFIX: &str = "## Playlist:";

/// The storage key for a playlist's snapshot document.
pub fn snapshot_filename(name: &str) -> String {
    format!("{}.{}", name, SNAPSHOT_EXTENSION)
}

/// Whether a stored filename looks like a snapshot document.
pub fn is_snapshot_filename(filename: &str) -> bool {
    filename
        .rsplit_once('.')
        .is_some_and(|(stem, ext)| !stem.is_empty() && ext == SNAPSHOT_EXTENSION)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    /// Present before and now.
    Kept,
    /// Present now, absent before.
    Added,
    /// Present before, absent now.
    Removed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconciledEntry {
    pub title: Title,
    pub status: Status,
}

/// New canonical state of one playlist. Titles are unique.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconciliationResult {
    pub entries: Vec<ReconciledEntry>,
}

/// Per-status tallies of a reconciliation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub kept: usize,
    pub added: usize,
    pub removed: usize,
}

impl ReconciliationResult {
    pub fn counts(&self) -> StatusCounts {
        self.entries
            .iter()
            .fold(StatusCounts::default(), |mut counts, entry| {
                match entry.status {
                    Status::Kept => counts.kept += 1,
                    Status::Added => counts.added += 1,
                    Status::Removed => counts.removed += 1,
                }
                counts
            })
    }

    /// Whether anything was added or removed since the last snapshot.
    pub fn has_changes(&self) -> bool {
        self.entries.iter().any(|e| e.status != Status::Kept)
    }
}
