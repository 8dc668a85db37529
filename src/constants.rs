//! Clock identifiers, feed locations and other fixed values of the built-in clocks.

// Clock ids (used in CLI and as `clock_id` in documents)
pub const AV_COLLISIONS: &str = "av_collisions";
pub const CYBER_INCIDENTS: &str = "cyber_incidents";

// Default output files, relative to the data directory
pub const AV_COLLISIONS_FILE: &str = "clock1_av_collisions.json";
pub const CYBER_INCIDENTS_FILE: &str = "clock2_cyber_incidents.json";

// Upstream feeds
pub const NHTSA_SGO_ADS_URL: &str =
    "https://static.nhtsa.gov/odi/ffdd/sgo-2021-01/SGO-2021-01_Incident_Reports_ADS.csv";
pub const CISA_KEV_URL: &str =
    "https://www.cisa.gov/sites/default/files/feeds/known_exploited_vulnerabilities.json";
pub const CISA_ADVISORIES_RSS_URL: &str = "https://www.cisa.gov/cybersecurity-advisories/all.xml";
pub const CISA_KEV_CATALOG_PAGE: &str = "https://www.cisa.gov/known-exploited-vulnerabilities-catalog";
pub const NVD_DETAIL_URL: &str = "https://nvd.nist.gov/vuln/detail/{cveID}";

// Source names stamped on incidents
pub const NHTSA_SGO: &str = "NHTSA SGO";
pub const CISA_KEV: &str = "CISA KEV";
pub const CISA_ADVISORY: &str = "CISA Advisory";

/// Get all built-in clock ids
pub fn get_supported_clocks() -> Vec<&'static str> {
    vec![AV_COLLISIONS, CYBER_INCIDENTS]
}
