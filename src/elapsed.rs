use crate::types::ClockDocument;
use chrono::{DateTime, Utc};
use std::fmt;

/// Whole time units since an incident.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Elapsed {
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
}

impl Elapsed {
    /// Time from `incident` to `now`; zero when the incident is not in the past.
    pub fn between(incident: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        let total = (now - incident).num_seconds();
        if total <= 0 {
            return Self::default();
        }
        Self {
            days: total / 86_400,
            hours: (total % 86_400) / 3_600,
            minutes: (total % 3_600) / 60,
            seconds: total % 60,
        }
    }
}

impl fmt::Display for Elapsed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}d {:02}h {:02}m {:02}s",
            self.days, self.hours, self.minutes, self.seconds
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusBand {
    Green,
    Yellow,
    Red,
}

impl StatusBand {
    pub fn for_days(days: i64) -> Self {
        if days >= 30 {
            StatusBand::Green
        } else if days >= 7 {
            StatusBand::Yellow
        } else {
            StatusBand::Red
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StatusBand::Green => "green",
            StatusBand::Yellow => "yellow",
            StatusBand::Red => "red",
        }
    }
}

/// One-line human summary of a document as of `now`.
pub fn describe(doc: &ClockDocument, now: DateTime<Utc>) -> String {
    match &doc.last_incident {
        None => format!("{}: No incident data available.", doc.clock_name),
        Some(latest) => {
            let elapsed = Elapsed::between(latest.date, now);
            format!(
                "{}: {} since \"{}\" [{}] (source: {})",
                doc.clock_name,
                elapsed,
                latest.title,
                StatusBand::for_days(elapsed.days).as_str(),
                doc.data_source.name
            )
        }
    }
}
