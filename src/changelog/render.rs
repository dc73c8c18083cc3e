use std::fmt::Write;

use super::{HEADING_PREFIX, ReconciledEntry, ReconciliationResult, Status};

/// Order in which entries are written to the snapshot document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum EntryOrder {
    /// Keep the reconciled order: removals first, then current titles as reported.
    #[default]
    Reconciled,
    /// Removals first, then current titles, each group sorted by title.
    Alphabetical,
}

#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    pub order: EntryOrder,
}

/// Renders a reconciliation result as a snapshot document.
///
/// ```text
/// ## Playlist: <name>
///
/// - ❌ ~~<removed>~~
/// - ✅ <kept>
/// - ➕ **<added>**
/// ```
pub fn render(name: &str, result: &ReconciliationResult, options: &RenderOptions) -> String {
    let mut entries: Vec<&ReconciledEntry> = result.entries.iter().collect();
    if options.order == EntryOrder::Alphabetical {
        entries.sort_by(|a, b| {
            (a.status != Status::Removed, a.title.as_str())
                .cmp(&(b.status != Status::Removed, b.title.as_str()))
        });
    }

    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = writeln!(out, "{} {}", HEADING_PREFIX, name);
    out.push('\n');
    for entry in entries {
        let _ = match entry.status {
            Status::Kept => writeln!(out, "- ✅ {}", entry.title),
            Status::Added => writeln!(out, "- ➕ **{}**", entry.title),
            Status::Removed => writeln!(out, "- ❌ ~~{}~~", entry.title),
        };
    }
    out
}
