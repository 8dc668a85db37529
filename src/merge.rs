use crate::types::Incident;
use std::collections::HashSet;

/// Merge a new batch into an existing history.
///
/// `existing` is walked before `new`; the first record seen for a
/// `(date, title)` key is kept and later duplicates are dropped. Order of first
/// occurrence is preserved and no record is altered.
pub fn merge_incidents(existing: Vec<Incident>, new: Vec<Incident>) -> Vec<Incident> {
    let mut seen = HashSet::with_capacity(existing.len() + new.len());
    let mut merged = Vec::with_capacity(existing.len() + new.len());

    for incident in existing.into_iter().chain(new) {
        let key = (incident.date, incident.title.clone());
        if seen.insert(key) {
            merged.push(incident);
        }
    }
    merged
}
