use super::{Extracted, RawRecord};
use anyhow::Context;
use serde_json::Value;

/// Read a JSON catalog whose entries sit in an array under `records_key`.
///
/// A missing or non-array key means an empty catalog. Entries that are not
/// objects are malformed. Scalar fields are kept as text; nested values and
/// nulls are dropped.
pub fn extract(payload: &[u8], records_key: &str) -> anyhow::Result<Extracted> {
    let doc: Value = serde_json::from_slice(payload).context("Catalog payload is not JSON")?;

    let mut out = Extracted::default();
    let Some(entries) = doc.get(records_key).and_then(Value::as_array) else {
        return Ok(out);
    };

    for entry in entries {
        let Some(obj) = entry.as_object() else {
            out.malformed += 1;
            continue;
        };
        let record: RawRecord = obj
            .iter()
            .filter_map(|(k, v)| scalar_text(v).map(|s| (k.clone(), s)))
            .collect();
        out.records.push(record);
    }
    Ok(out)
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
