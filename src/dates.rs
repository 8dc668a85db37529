use crate::error::DateParseError;
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Timelike, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

/// Textual form of every instant the crate emits.
pub const CANONICAL_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Day assigned to month-granularity dates such as `DEC-2025`.
pub const MONTH_YEAR_DAY: u32 = 15;

const MONTHS: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

static MONTH_YEAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Za-z]{3})-(\d{4})$").expect("month-year pattern"));

static WEEKDAY_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z]{3,9},\s*").expect("weekday pattern"));

const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f %z",
];

// Anything without an offset is read as UTC, never local time.
const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

const NAIVE_DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%d %B %Y",
    "%d %b %Y",
];

/// Parse a date string from any supported feed into a UTC instant at second precision.
///
/// Month-year shorthand (`DEC-2025`) is tried first and lands on the 15th of the
/// month at midnight. After that come ISO 8601 with an offset, RFC 2822 feed
/// timestamps, and naive ISO/US date-times and bare dates, which are taken as UTC.
pub fn parse_incident_date(input: &str) -> Result<DateTime<Utc>, DateParseError> {
    let trimmed = input.trim();
    let parsed = parse_month_year(trimmed)
        .or_else(|| parse_with_offset(trimmed))
        .or_else(|| parse_rfc2822(trimmed))
        .or_else(|| parse_naive(trimmed));

    parsed
        .map(truncate_to_second)
        .ok_or_else(|| DateParseError {
            input: input.to_string(),
        })
}

/// Render an instant in the canonical `YYYY-MM-DDTHH:MM:SSZ` form.
pub fn format_utc(instant: &DateTime<Utc>) -> String {
    instant.format(CANONICAL_FORMAT).to_string()
}

fn parse_month_year(s: &str) -> Option<DateTime<Utc>> {
    let caps = MONTH_YEAR.captures(s)?;
    let abbrev = caps.get(1)?.as_str().to_ascii_lowercase();
    let month = MONTHS.iter().position(|m| *m == abbrev)? as u32 + 1;
    let year: i32 = caps.get(2)?.as_str().parse().ok()?;
    let date = NaiveDate::from_ymd_opt(year, month, MONTH_YEAR_DAY)?;
    Some(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?))
}

fn parse_with_offset(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    OFFSET_FORMATS
        .iter()
        .find_map(|fmt| DateTime::parse_from_str(s, fmt).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

fn parse_rfc2822(s: &str) -> Option<DateTime<Utc>> {
    // Feeds routinely carry a weekday that disagrees with the date; the date wins.
    let without_weekday = WEEKDAY_PREFIX.replace(s, "");
    DateTime::parse_from_rfc2822(&without_weekday)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn parse_naive(s: &str) -> Option<DateTime<Utc>> {
    if let Some(dt) = NAIVE_DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
    {
        return Some(Utc.from_utc_datetime(&dt));
    }
    NAIVE_DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| Utc.from_utc_datetime(&dt))
}

pub(crate) fn truncate_to_second(dt: DateTime<Utc>) -> DateTime<Utc> {
    dt.with_nanosecond(0).unwrap_or(dt)
}

/// Serde adapter storing instants as canonical UTC strings.
pub mod utc_seconds {
    use super::{format_utc, parse_incident_date};
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(instant: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format_utc(instant))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse_incident_date(&raw).map_err(serde::de::Error::custom)
    }
}
