use crate::clock::ClockMeta;
use crate::constants::*;
use crate::error::{ClockError, Result};
use crate::parser::{
    FeedKind, FeedParser, FieldMapping, FieldTemplate, SeverityMapping, SeverityRule,
};
use crate::types::{DataSource, Severity};

/// One upstream feed of a clock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedSpec {
    pub name: String,
    pub url: String,
    pub parser: FeedParser,
}

/// Everything needed to run one clock end to end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClockDefinition {
    pub meta: ClockMeta,
    /// File name under the configured data directory.
    pub output_file: String,
    /// Fetched and parsed in order; their incidents are concatenated.
    pub feeds: Vec<FeedSpec>,
}

impl ClockDefinition {
    pub fn id(&self) -> &str {
        &self.meta.clock_id
    }
}

#[derive(Debug, Clone)]
pub struct ClockRegistry {
    clocks: Vec<ClockDefinition>,
}

impl ClockRegistry {
    pub fn new(clocks: Vec<ClockDefinition>) -> Self {
        Self { clocks }
    }

    /// The clocks shipped with the crate.
    pub fn builtin() -> Self {
        Self::new(vec![av_collisions(), cyber_incidents()])
    }

    pub fn get(&self, clock_id: &str) -> Result<&ClockDefinition> {
        self.clocks
            .iter()
            .find(|c| c.id() == clock_id)
            .ok_or_else(|| ClockError::UnknownClock(clock_id.to_string()))
    }

    pub fn all(&self) -> &[ClockDefinition] {
        &self.clocks
    }
}

fn rule(values: &[&str], severity: Severity) -> SeverityRule {
    SeverityRule {
        values: values.iter().map(|v| v.to_string()).collect(),
        severity,
    }
}

fn fields(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}

fn av_collisions() -> ClockDefinition {
    ClockDefinition {
        meta: ClockMeta {
            clock_id: AV_COLLISIONS.to_string(),
            clock_name: "Physical AI Safety Clock".to_string(),
            description: "Time since last autonomous vehicle collision".to_string(),
            data_source: DataSource {
                name: "NHTSA Standing General Order (SGO-2021-01)".to_string(),
                url: NHTSA_SGO_ADS_URL.to_string(),
                update_frequency: "near-daily".to_string(),
            },
        },
        output_file: AV_COLLISIONS_FILE.to_string(),
        feeds: vec![FeedSpec {
            name: "nhtsa_sgo_ads".to_string(),
            url: NHTSA_SGO_ADS_URL.to_string(),
            parser: FeedParser {
                kind: FeedKind::Tabular,
                mapping: FieldMapping {
                    date_field: "Incident Date".to_string(),
                    title: FieldTemplate::new("{Make} {Model} ADS collision, {City}, {State=}"),
                    source_url: FieldTemplate::new(NHTSA_SGO_ADS_URL),
                    source_name: NHTSA_SGO.to_string(),
                    severity: SeverityMapping {
                        field: Some("Highest Injury Severity".to_string()),
                        rules: vec![
                            rule(
                                &["suspected serious", "serious", "fatal", "incapacitating"],
                                Severity::SeriousInjury,
                            ),
                            rule(&["minor", "possible", "suspected minor"], Severity::MinorInjury),
                        ],
                        default: Severity::PropertyDamage,
                    },
                    // Every row of this feed is in scope
                    relevance_fields: Vec::new(),
                },
            },
        }],
    }
}

fn cyber_incidents() -> ClockDefinition {
    ClockDefinition {
        meta: ClockMeta {
            clock_id: CYBER_INCIDENTS.to_string(),
            clock_name: "Digital AI Safety Clock".to_string(),
            description: "Time since last AI-related cybersecurity incident".to_string(),
            data_source: DataSource {
                name: "CISA (KEV Catalog + Cybersecurity Advisories RSS)".to_string(),
                url: CISA_KEV_CATALOG_PAGE.to_string(),
                update_frequency: "weekly".to_string(),
            },
        },
        output_file: CYBER_INCIDENTS_FILE.to_string(),
        feeds: vec![
            FeedSpec {
                name: "cisa_kev".to_string(),
                url: CISA_KEV_URL.to_string(),
                parser: FeedParser {
                    kind: FeedKind::Catalog {
                        records_key: "vulnerabilities".to_string(),
                    },
                    mapping: FieldMapping {
                        date_field: "dateAdded".to_string(),
                        title: FieldTemplate::new("{vulnerabilityName|cveID}"),
                        source_url: FieldTemplate::new(NVD_DETAIL_URL),
                        source_name: CISA_KEV.to_string(),
                        severity: SeverityMapping::fixed(Severity::CyberVulnerability),
                        relevance_fields: fields(&["vulnerabilityName", "shortDescription", "product"]),
                    },
                },
            },
            FeedSpec {
                name: "cisa_advisories".to_string(),
                url: CISA_ADVISORIES_RSS_URL.to_string(),
                parser: FeedParser {
                    kind: FeedKind::Syndication,
                    mapping: FieldMapping {
                        date_field: "published".to_string(),
                        title: FieldTemplate::new("{title}"),
                        source_url: FieldTemplate::new("{link}"),
                        source_name: CISA_ADVISORY.to_string(),
                        severity: SeverityMapping::fixed(Severity::CyberAdvisory),
                        relevance_fields: fields(&["title", "summary", "description"]),
                    },
                },
            },
        ],
    }
}
