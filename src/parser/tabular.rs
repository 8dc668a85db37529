use super::{Extracted, RawRecord};
use anyhow::Context;
use tracing::debug;

/// Read a CSV payload with a header row into one record per data row.
///
/// Rows that fail to decode are counted as malformed and skipped. Bytes that
/// are not valid UTF-8 are replaced rather than rejected.
pub fn extract(payload: &[u8]) -> anyhow::Result<Extracted> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(payload);

    let headers: Vec<String> = reader
        .byte_headers()
        .context("Failed to read CSV header row")?
        .iter()
        .map(|h| String::from_utf8_lossy(h).trim().to_string())
        .collect();

    let mut out = Extracted::default();
    for (idx, row) in reader.byte_records().enumerate() {
        let row = match row {
            Ok(r) => r,
            Err(e) => {
                debug!("CSV row {} error: {}", idx, e);
                out.malformed += 1;
                continue;
            }
        };
        let record: RawRecord = headers
            .iter()
            .zip(row.iter())
            .map(|(h, v)| (h.clone(), String::from_utf8_lossy(v).into_owned()))
            .collect();
        out.records.push(record);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_become_records_keyed_by_header() {
        let csv = "Make,Model,Incident Date\nWAYMO, Jaguar I-Pace ,DEC-2025\nZOOX,Robotaxi,2025-11-03\n";
        let out = extract(csv.as_bytes()).unwrap();
        assert_eq!(out.records.len(), 2);
        assert_eq!(out.malformed, 0);
        assert_eq!(out.records[0]["Make"], "WAYMO");
        assert_eq!(out.records[0]["Model"], "Jaguar I-Pace");
        assert_eq!(out.records[1]["Incident Date"], "2025-11-03");
    }

    #[test]
    fn header_only_yields_nothing() {
        let out = extract(b"Report ID,Make,Model,City,State,Incident Date\n").unwrap();
        assert!(out.records.is_empty());
    }

    #[test]
    fn empty_payload_yields_nothing() {
        let out = extract(b"").unwrap();
        assert!(out.records.is_empty());
    }

    #[test]
    fn short_rows_only_carry_present_columns() {
        let out = extract(b"A,B,C\n1,2\n").unwrap();
        assert_eq!(out.records.len(), 1);
        assert_eq!(out.records[0].get("C"), None);
        assert_eq!(out.records[0]["B"], "2");
    }

    #[test]
    fn invalid_utf8_is_replaced() {
        let out = extract(b"City\nS\xe3o Paulo\n").unwrap();
        assert_eq!(out.records.len(), 1);
        assert!(out.records[0]["City"].starts_with('S'));
    }
}
