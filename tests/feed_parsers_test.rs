mod common;

use common::fixture;
use incident_clock::constants::{AV_COLLISIONS, CYBER_INCIDENTS, NHTSA_SGO_ADS_URL};
use incident_clock::dates::format_utc;
use incident_clock::registry::{ClockRegistry, FeedSpec};
use incident_clock::relevance::RelevanceClassifier;
use incident_clock::types::Severity;

fn feed(clock: &str, index: usize) -> FeedSpec {
    ClockRegistry::builtin().get(clock).unwrap().feeds[index].clone()
}

#[test]
fn test_nhtsa_csv_extracts_dated_rows() {
    let feed = feed(AV_COLLISIONS, 0);
    let outcome = feed
        .parser
        .parse(&feed.url, &fixture("sample_ads.csv"), &RelevanceClassifier::default())
        .unwrap();

    assert_eq!(outcome.total_records, 7);
    assert_eq!(outcome.incidents.len(), 5);
    assert_eq!(outcome.skipped.get("missing_date"), Some(&1));
    assert_eq!(outcome.skipped.get("invalid_date"), Some(&1));

    let first = &outcome.incidents[0];
    assert_eq!(format_utc(&first.date), "2025-12-15T00:00:00Z");
    assert_eq!(first.title, "JAGUAR I-PACE ADS collision, San Francisco, CA");
    assert_eq!(first.source_url, NHTSA_SGO_ADS_URL);
    assert_eq!(first.source_name, "NHTSA SGO");
    assert_eq!(first.severity, Severity::PropertyDamage);
}

#[test]
fn test_nhtsa_severity_and_placeholders() {
    let feed = feed(AV_COLLISIONS, 0);
    let outcome = feed
        .parser
        .parse(&feed.url, &fixture("sample_ads.csv"), &RelevanceClassifier::default())
        .unwrap();

    let severities: Vec<Severity> = outcome.incidents.iter().map(|i| i.severity).collect();
    assert_eq!(
        severities,
        vec![
            Severity::PropertyDamage,
            Severity::MinorInjury,
            Severity::SeriousInjury,
            Severity::SeriousInjury,
            Severity::MinorInjury,
        ]
    );

    let waymo = &outcome.incidents[4];
    assert_eq!(waymo.title, "WAYMO  ADS collision, Los Angeles, CA");
    assert_eq!(format_utc(&waymo.date), "2025-09-30T14:20:00Z");
}

#[test]
fn test_nhtsa_titles_keep_blank_cells() {
    let feed = feed(AV_COLLISIONS, 0);
    let blank_state = "Make,Model,City,State,Incident Date\nWAYMO,JAGUAR,Phoenix,,DEC-2025\n";
    let outcome = feed
        .parser
        .parse(&feed.url, blank_state.as_bytes(), &RelevanceClassifier::default())
        .unwrap();
    assert_eq!(outcome.incidents[0].title, "WAYMO JAGUAR ADS collision, Phoenix, ");

    let no_state_column = "Make,City,Incident Date\nZOOX,Las Vegas,2025-10-21\n";
    let outcome = feed
        .parser
        .parse(&feed.url, no_state_column.as_bytes(), &RelevanceClassifier::default())
        .unwrap();
    assert_eq!(outcome.incidents[0].title, "ZOOX Unknown ADS collision, Las Vegas, ");
}

#[test]
fn test_nhtsa_header_only_has_no_incidents() {
    let feed = feed(AV_COLLISIONS, 0);
    let header =
        "Report ID,Make,Model,City,State,Incident Date,Highest Injury Severity,Property Damage\n";
    let outcome = feed
        .parser
        .parse(&feed.url, header.as_bytes(), &RelevanceClassifier::default())
        .unwrap();
    assert!(outcome.incidents.is_empty());
    assert_eq!(outcome.total_records, 0);
}

#[test]
fn test_kev_keeps_only_ai_entries() {
    let feed = feed(CYBER_INCIDENTS, 0);
    let outcome = feed
        .parser
        .parse(&feed.url, &fixture("sample_kev.json"), &RelevanceClassifier::default())
        .unwrap();

    let urls: Vec<&str> = outcome.incidents.iter().map(|i| i.source_url.as_str()).collect();
    assert_eq!(
        urls,
        vec![
            "https://nvd.nist.gov/vuln/detail/CVE-2026-0001",
            "https://nvd.nist.gov/vuln/detail/CVE-2026-0003",
            "https://nvd.nist.gov/vuln/detail/CVE-2026-0005",
        ]
    );
    assert_eq!(outcome.skipped.get("irrelevant"), Some(&2));
    assert_eq!(outcome.skipped.get("invalid_date"), Some(&1));

    let first = &outcome.incidents[0];
    assert_eq!(first.title, "Acme AI Security Suite Deserialization Vulnerability");
    assert_eq!(first.source_name, "CISA KEV");
    assert_eq!(first.severity, Severity::CyberVulnerability);
    assert_eq!(format_utc(&first.date), "2026-01-05T00:00:00Z");
}

#[test]
fn test_kev_title_falls_back_to_cve_id() {
    let feed = feed(CYBER_INCIDENTS, 0);
    let payload = br#"{"vulnerabilities": [
        {"cveID": "CVE-2026-0100", "product": "LLM Router", "dateAdded": "2026-02-01"}
    ]}"#;
    let outcome = feed
        .parser
        .parse(&feed.url, payload, &RelevanceClassifier::default())
        .unwrap();
    assert_eq!(outcome.incidents.len(), 1);
    assert_eq!(outcome.incidents[0].title, "CVE-2026-0100");
}

#[test]
fn test_rss_keeps_only_ai_items() {
    let feed = feed(CYBER_INCIDENTS, 1);
    let outcome = feed
        .parser
        .parse(&feed.url, &fixture("sample_rss.xml"), &RelevanceClassifier::default())
        .unwrap();

    let titles: Vec<&str> = outcome.incidents.iter().map(|i| i.title.as_str()).collect();
    assert_eq!(
        titles,
        vec![
            "Joint Guidance on Deploying Artificial Intelligence Systems Securely",
            "Autonomous Systems Vendor Advisory",
        ]
    );
    assert!(!titles.iter().any(|t| t.contains("Yokogawa")));
    assert!(!titles.iter().any(|t| t.contains("Generic Router")));
    assert_eq!(outcome.skipped.get("missing_date"), Some(&1));

    let autonomous = &outcome.incidents[1];
    assert_eq!(format_utc(&autonomous.date), "2025-12-11T20:30:00Z");
    assert_eq!(
        autonomous.source_url,
        "https://www.cisa.gov/news-events/cybersecurity-advisories/aa25-002a"
    );
    assert_eq!(autonomous.source_name, "CISA Advisory");
    assert_eq!(autonomous.severity, Severity::CyberAdvisory);
}

#[test]
fn test_custom_keywords_change_what_is_relevant() {
    let feed = feed(CYBER_INCIDENTS, 1);
    let classifier = RelevanceClassifier::new(&incident_clock::relevance::KeywordConfig {
        phrases: vec!["firmware".to_string()],
        acronyms: vec![],
    })
    .unwrap();
    let outcome = feed
        .parser
        .parse(&feed.url, &fixture("sample_rss.xml"), &classifier)
        .unwrap();
    let titles: Vec<&str> = outcome.incidents.iter().map(|i| i.title.as_str()).collect();
    assert_eq!(titles, vec!["Generic Router Firmware Update"]);
}
