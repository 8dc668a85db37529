//! Feed extraction: one strategy per upstream format, one shared mapping step.
//!
//! Each strategy turns a raw payload into flat [`RawRecord`]s. The
//! [`FieldMapping`] then composes the five incident fields from those records,
//! applying the relevance filter where the upstream feed is broader than the
//! clock's topic. Bad individual records are counted and skipped; only a
//! payload that cannot be decoded at all is an error.

pub mod catalog;
pub mod syndication;
pub mod tabular;

use crate::dates::parse_incident_date;
use crate::relevance::RelevanceClassifier;
use crate::types::{Incident, Severity};
use std::collections::BTreeMap;
use tracing::debug;

/// Field name to trimmed text, as pulled out of one feed record.
pub type RawRecord = BTreeMap<String, String>;

/// Rendered in titles where a component field is absent.
pub const PLACEHOLDER: &str = "Unknown";

/// Records pulled out of a payload, plus how many could not be read.
#[derive(Debug, Default)]
pub struct Extracted {
    pub records: Vec<RawRecord>,
    pub malformed: usize,
}

/// The upstream format of a feed, selecting its extraction strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedKind {
    /// Delimited text with a header row.
    Tabular,
    /// JSON document holding an array of objects under `records_key`.
    Catalog { records_key: String },
    /// RSS 2.0 or Atom.
    Syndication,
}

impl FeedKind {
    pub fn label(&self) -> &'static str {
        match self {
            FeedKind::Tabular => "tabular",
            FeedKind::Catalog { .. } => "catalog",
            FeedKind::Syndication => "syndication",
        }
    }

    pub fn extract(&self, payload: &[u8]) -> anyhow::Result<Extracted> {
        match self {
            FeedKind::Tabular => tabular::extract(payload),
            FeedKind::Catalog { records_key } => catalog::extract(payload, records_key),
            FeedKind::Syndication => Ok(syndication::extract(payload)),
        }
    }
}

/// Literal text with `{Field}` slots.
///
/// A slot renders its field's value as found, even when empty. `{A|B}` falls
/// through to B only when A is absent from the record. `{Field=text}` renders
/// `text` instead of [`PLACEHOLDER`] when every field of the slot is absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldTemplate(String);

enum Segment<'a> {
    Literal(&'a str),
    Slot {
        fields: Vec<&'a str>,
        default: Option<&'a str>,
    },
}

impl FieldTemplate {
    pub fn new(template: impl Into<String>) -> Self {
        Self(template.into())
    }

    fn segments(&self) -> Vec<Segment<'_>> {
        let mut out = Vec::new();
        let mut rest = self.0.as_str();
        while let Some(open) = rest.find('{') {
            let Some(close) = rest[open..].find('}').map(|c| open + c) else {
                break;
            };
            if open > 0 {
                out.push(Segment::Literal(&rest[..open]));
            }
            let body = &rest[open + 1..close];
            let (names, default) = match body.split_once('=') {
                Some((names, default)) => (names, Some(default)),
                None => (body, None),
            };
            out.push(Segment::Slot {
                fields: names.split('|').map(str::trim).collect(),
                default,
            });
            rest = &rest[close + 1..];
        }
        if !rest.is_empty() {
            out.push(Segment::Literal(rest));
        }
        out
    }

    /// Render, returning the text and whether every slot found a non-empty value.
    fn render_with(&self, record: &RawRecord) -> (String, bool) {
        let mut text = String::new();
        let mut complete = true;
        for segment in self.segments() {
            match segment {
                Segment::Literal(s) => text.push_str(s),
                Segment::Slot { fields, default } => {
                    match fields.iter().find_map(|f| record.get(*f)) {
                        Some(v) => {
                            complete &= !v.trim().is_empty();
                            text.push_str(v);
                        }
                        None => {
                            complete = false;
                            text.push_str(default.unwrap_or(PLACEHOLDER));
                        }
                    }
                }
            }
        }
        (text, complete)
    }

    pub fn render(&self, record: &RawRecord) -> String {
        self.render_with(record).0
    }

    /// Render only if every slot resolved to a non-empty value.
    pub fn render_complete(&self, record: &RawRecord) -> Option<String> {
        match self.render_with(record) {
            (text, true) => Some(text),
            _ => None,
        }
    }
}

/// Raw values (compared trimmed, case-insensitively) that select one severity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeverityRule {
    pub values: Vec<String>,
    pub severity: Severity,
}

/// Deterministic raw-value to severity table with a fallback tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeverityMapping {
    pub field: Option<String>,
    pub rules: Vec<SeverityRule>,
    pub default: Severity,
}

impl SeverityMapping {
    /// Every record from the feed gets the same tag.
    pub fn fixed(severity: Severity) -> Self {
        Self {
            field: None,
            rules: Vec::new(),
            default: severity,
        }
    }

    pub fn classify(&self, record: &RawRecord) -> Severity {
        let Some(raw) = self.field.as_ref().and_then(|f| record.get(f)) else {
            return self.default;
        };
        let raw = raw.trim().to_lowercase();
        self.rules
            .iter()
            .find(|rule| rule.values.iter().any(|v| v.trim().to_lowercase() == raw))
            .map_or(self.default, |rule| rule.severity)
    }
}

/// Where each incident field comes from in a feed's records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMapping {
    pub date_field: String,
    pub title: FieldTemplate,
    /// Falls back to the feed url when any slot is missing.
    pub source_url: FieldTemplate,
    pub source_name: String,
    pub severity: SeverityMapping,
    /// Fields joined and run through the relevance filter. Empty disables it.
    pub relevance_fields: Vec<String>,
}

/// Why a record did not become an incident.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkipReason {
    MissingDate,
    InvalidDate,
    Irrelevant,
    Malformed,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::MissingDate => "missing_date",
            SkipReason::InvalidDate => "invalid_date",
            SkipReason::Irrelevant => "irrelevant",
            SkipReason::Malformed => "malformed",
        }
    }
}

#[derive(Debug, Default)]
pub struct ParseOutcome {
    pub incidents: Vec<Incident>,
    pub total_records: usize,
    pub skipped: BTreeMap<&'static str, usize>,
}

impl ParseOutcome {
    fn skip(&mut self, reason: SkipReason, count: usize) {
        if count > 0 {
            *self.skipped.entry(reason.as_str()).or_default() += count;
        }
    }

    pub fn skipped_total(&self) -> usize {
        self.skipped.values().sum()
    }
}

/// A feed's extraction strategy paired with its field mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedParser {
    pub kind: FeedKind,
    pub mapping: FieldMapping,
}

impl FeedParser {
    pub fn parse(
        &self,
        feed_url: &str,
        payload: &[u8],
        classifier: &RelevanceClassifier,
    ) -> anyhow::Result<ParseOutcome> {
        let extracted = self.kind.extract(payload)?;
        let mut outcome = ParseOutcome {
            total_records: extracted.records.len() + extracted.malformed,
            ..Default::default()
        };
        outcome.skip(SkipReason::Malformed, extracted.malformed);

        for record in &extracted.records {
            match draft_incident(record, &self.mapping, feed_url, classifier) {
                Ok(incident) => outcome.incidents.push(incident),
                Err(reason) => {
                    debug!(reason = reason.as_str(), "Skipping {} record", self.kind.label());
                    outcome.skip(reason, 1);
                }
            }
        }
        Ok(outcome)
    }
}

/// Compose one incident from a record, or say why it was dropped.
pub fn draft_incident(
    record: &RawRecord,
    mapping: &FieldMapping,
    feed_url: &str,
    classifier: &RelevanceClassifier,
) -> Result<Incident, SkipReason> {
    let raw_date = record
        .get(&mapping.date_field)
        .map(|d| d.trim())
        .filter(|d| !d.is_empty())
        .ok_or(SkipReason::MissingDate)?;

    if !mapping.relevance_fields.is_empty() {
        let searchable = mapping
            .relevance_fields
            .iter()
            .filter_map(|f| record.get(f))
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" ");
        if !classifier.is_relevant(&searchable) {
            return Err(SkipReason::Irrelevant);
        }
    }

    let date = parse_incident_date(raw_date).map_err(|_| SkipReason::InvalidDate)?;

    Ok(Incident {
        date,
        title: mapping.title.render(record),
        source_url: mapping
            .source_url
            .render_complete(record)
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| feed_url.to_string()),
        source_name: mapping.source_name.clone(),
        severity: mapping.severity.classify(record),
    })
}
