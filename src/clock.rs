use crate::dates::truncate_to_second;
use crate::types::{ClockDocument, DataSource, Incident};
use chrono::{DateTime, Utc};

/// Descriptive fields copied verbatim into every document a clock publishes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClockMeta {
    pub clock_id: String,
    pub clock_name: String,
    pub description: String,
    pub data_source: DataSource,
}

/// Index of the most recent incident. Ties go to the earliest position.
pub fn latest_index(incidents: &[Incident]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (i, incident) in incidents.iter().enumerate() {
        match best {
            Some(b) if incidents[b].date >= incident.date => {}
            _ => best = Some(i),
        }
    }
    best
}

/// Assemble a fresh document from a merged incident sequence.
///
/// `previous_incidents` keeps the input order minus the chosen latest record.
/// `last_updated` is always `now`, whether or not the content changed.
pub fn build_clock_document(
    meta: &ClockMeta,
    mut incidents: Vec<Incident>,
    now: DateTime<Utc>,
) -> ClockDocument {
    let last_incident = latest_index(&incidents).map(|i| incidents.remove(i));

    ClockDocument {
        clock_id: meta.clock_id.clone(),
        clock_name: meta.clock_name.clone(),
        description: meta.description.clone(),
        last_incident,
        previous_incidents: incidents,
        last_updated: truncate_to_second(now),
        data_source: meta.data_source.clone(),
    }
}
