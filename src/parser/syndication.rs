use super::{Extracted, RawRecord};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::warn;

/// Read RSS `<item>` and Atom `<entry>` elements into flat records.
///
/// Keys are the lowercased qualified names of the item's direct children, so
/// `media:title` stays apart from `title`. Only `dc:date` and
/// `content:encoded` lose their prefix. Atom fields are folded onto the RSS
/// names: `link` from the `href` attribute, `published` from `published`,
/// `updated` or `dc:date`, and `summary` from `summary`, `content` or
/// `description`. A markup error ends the read but keeps the items already
/// completed.
pub fn extract(payload: &[u8]) -> Extracted {
    let mut reader = Reader::from_reader(payload);
    reader.config_mut().trim_text(true);

    let mut out = Extracted::default();
    let mut buf = Vec::new();
    let mut current: Option<RawRecord> = None;
    let mut field: Option<String> = None;
    let mut depth = 0usize;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                let name = field_name(&e);
                match current.as_mut() {
                    None if is_item(&local_name(&e)) => {
                        current = Some(RawRecord::new());
                        depth = 0;
                    }
                    None => {}
                    Some(record) => {
                        depth += 1;
                        if depth == 1 {
                            if name == "link" {
                                take_href(&e, record);
                            }
                            field = Some(name);
                        }
                    }
                }
            }
            Ok(Event::Empty(e)) => {
                if let Some(record) = current.as_mut() {
                    if depth == 0 && field_name(&e) == "link" {
                        take_href(&e, record);
                    }
                }
            }
            Ok(Event::Text(e)) => {
                if let (Some(record), Some(name)) = (current.as_mut(), field.as_ref()) {
                    match e.unescape() {
                        Ok(text) => append(record, name, &text),
                        Err(err) => warn!("Skipping undecodable text in <{}>: {}", name, err),
                    }
                }
            }
            Ok(Event::CData(e)) => {
                if let (Some(record), Some(name)) = (current.as_mut(), field.as_ref()) {
                    let bytes = e.into_inner();
                    append(record, name, &String::from_utf8_lossy(&bytes));
                }
            }
            Ok(Event::End(_)) => {
                if current.is_some() {
                    if depth == 0 {
                        if let Some(record) = current.take() {
                            out.records.push(normalize(record));
                        }
                    } else {
                        depth -= 1;
                        if depth == 0 {
                            field = None;
                        }
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                warn!(
                    "Feed markup error at byte {}: {}; keeping {} complete items",
                    reader.buffer_position(),
                    e,
                    out.records.len()
                );
                if current.is_some() {
                    out.malformed += 1;
                }
                break;
            }
            _ => {}
        }
        buf.clear();
    }
    out
}

fn is_item(name: &str) -> bool {
    name == "item" || name == "entry"
}

fn local_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.local_name().as_ref()).to_lowercase()
}

/// Qualified child name, with the accepted extension prefixes folded away.
fn field_name(e: &BytesStart<'_>) -> String {
    let name = String::from_utf8_lossy(e.name().as_ref()).to_lowercase();
    match name.as_str() {
        "dc:date" => "date".to_string(),
        "content:encoded" => "encoded".to_string(),
        _ => name,
    }
}

fn take_href(e: &BytesStart<'_>, record: &mut RawRecord) {
    if record.contains_key("link") {
        return;
    }
    let rel = e
        .try_get_attribute("rel")
        .ok()
        .flatten()
        .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()));
    if matches!(rel.as_deref(), Some(r) if r != "alternate") {
        return;
    }
    if let Some(href) = e
        .try_get_attribute("href")
        .ok()
        .flatten()
        .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()))
    {
        record.insert("link".to_string(), href);
    }
}

fn append(record: &mut RawRecord, name: &str, text: &str) {
    let text = text.trim();
    if text.is_empty() {
        return;
    }
    let slot = record.entry(name.to_string()).or_default();
    if !slot.is_empty() {
        slot.push(' ');
    }
    slot.push_str(text);
}

fn normalize(mut record: RawRecord) -> RawRecord {
    fill_from(&mut record, "published", &["pubdate", "updated", "date"]);
    fill_from(&mut record, "summary", &["description", "content", "encoded"]);
    fill_from(&mut record, "description", &["summary"]);
    record
}

fn fill_from(record: &mut RawRecord, target: &str, sources: &[&str]) {
    if record.get(target).map_or(false, |v| !v.is_empty()) {
        return;
    }
    if let Some(value) = sources
        .iter()
        .filter_map(|s| record.get(*s))
        .find(|v| !v.is_empty())
        .cloned()
    {
        record.insert(target.to_string(), value);
    }
}
