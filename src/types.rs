use crate::dates::utc_seconds;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed set of classification tags carried by every incident.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    SeriousInjury,
    MinorInjury,
    PropertyDamage,
    CyberVulnerability,
    CyberAdvisory,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::SeriousInjury => "serious_injury",
            Severity::MinorInjury => "minor_injury",
            Severity::PropertyDamage => "property_damage",
            Severity::CyberVulnerability => "cyber_vulnerability",
            Severity::CyberAdvisory => "cyber_advisory",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single normalized, dated event record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Incident {
    #[serde(with = "utc_seconds")]
    pub date: DateTime<Utc>,
    pub title: String,
    pub source_url: String,
    pub source_name: String,
    pub severity: Severity,
}

/// Static provenance of a clock's data, not derived from incidents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataSource {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub update_frequency: String,
}

/// The published per-topic document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockDocument {
    pub clock_id: String,
    pub clock_name: String,
    pub description: String,
    pub last_incident: Option<Incident>,
    #[serde(default)]
    pub previous_incidents: Vec<Incident>,
    #[serde(with = "utc_seconds")]
    pub last_updated: DateTime<Utc>,
    #[serde(default)]
    pub data_source: DataSource,
}

impl ClockDocument {
    /// Flatten back into an incident history: the latest first, then the rest.
    ///
    /// A document without a `last_incident` contributes nothing, even if
    /// `previous_incidents` is populated.
    pub fn into_incidents(self) -> Vec<Incident> {
        match self.last_incident {
            Some(latest) => {
                let mut incidents = Vec::with_capacity(self.previous_incidents.len() + 1);
                incidents.push(latest);
                incidents.extend(self.previous_incidents);
                incidents
            }
            None => Vec::new(),
        }
    }

    pub fn incident_count(&self) -> usize {
        match self.last_incident {
            Some(_) => self.previous_incidents.len() + 1,
            None => 0,
        }
    }
}
