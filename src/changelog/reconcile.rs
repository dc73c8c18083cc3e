use std::collections::HashSet;

use super::title::normalize_lossy;
use super::{ReconciledEntry, ReconciliationResult, Status, Title};

/// Classifies every title as kept, added or removed.
///
/// Removed entries come first in `prior` order, followed by the current titles in the
/// order the provider reported them. Empty current titles are dropped and duplicates
/// collapse onto their first occurrence.
pub fn reconcile<S: AsRef<str>>(prior: &[Title], current: &[S]) -> ReconciliationResult {
    let mut seen = HashSet::new();
    let current: Vec<Title> = normalize_lossy(current)
        .filter(|title| seen.insert(title.clone()))
        .collect();
    let current_set = seen;

    let mut prior_set = HashSet::with_capacity(prior.len());
    let mut entries = Vec::with_capacity(prior.len() + current.len());

    for title in prior {
        // prior is expected to be unique already; guard anyway so output stays unique
        if !prior_set.insert(title) {
            continue;
        }
        if !current_set.contains(title) {
            entries.push(ReconciledEntry {
                title: title.clone(),
                status: Status::Removed,
            });
        }
    }

    entries.extend(current.into_iter().map(|title| {
        let status = if prior_set.contains(&title) {
            Status::Kept
        } else {
            Status::Added
        };
        ReconciledEntry { title, status }
    }));

    ReconciliationResult { entries }
}
