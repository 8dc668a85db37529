use crate::error::{ClockError, PersistenceReadError, Result};
use crate::types::ClockDocument;
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, warn};

/// Storage trait for clock documents.
///
/// `load` never fails: a missing, empty or undecodable document all read as
/// "no prior history". `save` fully replaces whatever was stored.
pub trait DocumentStore: Send + Sync {
    fn load(&self, path: &Path) -> Option<ClockDocument>;
    fn save(&self, document: &ClockDocument, path: &Path) -> Result<()>;
}

/// Pretty-printed JSON files on the local filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonFileStore;

impl JsonFileStore {
    pub fn new() -> Self {
        Self
    }

    fn read(path: &Path) -> std::result::Result<ClockDocument, PersistenceReadError> {
        let content = fs::read_to_string(path)?;
        let content = content.trim();
        if content.is_empty() {
            return Err(PersistenceReadError::Empty);
        }
        Ok(serde_json::from_str(content)?)
    }
}

impl DocumentStore for JsonFileStore {
    fn load(&self, path: &Path) -> Option<ClockDocument> {
        match Self::read(path) {
            Ok(doc) => Some(doc),
            Err(PersistenceReadError::Io(e)) if e.kind() == ErrorKind::NotFound => {
                debug!("No prior document at {}", path.display());
                None
            }
            Err(e) => {
                warn!("Ignoring prior document at {}: {}", path.display(), e);
                None
            }
        }
    }

    fn save(&self, document: &ClockDocument, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }

        let mut body = serde_json::to_string_pretty(document)?;
        body.push('\n');

        // Write beside the target and rename so readers never see a partial file
        let tmp = temp_path(path);
        fs::write(&tmp, body)?;
        if let Err(e) = fs::rename(&tmp, path) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }
        debug!("Saved document to {}", path.display());
        Ok(())
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// In-memory storage implementation for testing.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    documents: Mutex<HashMap<PathBuf, ClockDocument>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DocumentStore for InMemoryStore {
    fn load(&self, path: &Path) -> Option<ClockDocument> {
        match self.documents.lock() {
            Ok(docs) => docs.get(path).cloned(),
            Err(e) => {
                warn!("Ignoring prior document at {}: {}", path.display(), e);
                None
            }
        }
    }

    fn save(&self, document: &ClockDocument, path: &Path) -> Result<()> {
        let mut docs = self
            .documents
            .lock()
            .map_err(|e| ClockError::Storage(e.to_string()))?;
        docs.insert(path.to_path_buf(), document.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DataSource, Incident, Severity};
    use chrono::{TimeZone, Utc};
    use tempfile::tempdir;

    fn document() -> ClockDocument {
        ClockDocument {
            clock_id: "test".into(),
            clock_name: "Test Clock".into(),
            description: "A test clock".into(),
            last_incident: Some(Incident {
                date: Utc.with_ymd_and_hms(2025, 12, 10, 0, 0, 0).unwrap(),
                title: "test incident".into(),
                source_url: "https://test.com".into(),
                source_name: "test".into(),
                severity: Severity::CyberAdvisory,
            }),
            previous_incidents: vec![],
            last_updated: Utc.with_ymd_and_hms(2025, 12, 11, 1, 2, 3).unwrap(),
            data_source: DataSource {
                name: "test".into(),
                url: "https://test.com".into(),
                update_frequency: "daily".into(),
            },
        }
    }

    #[test]
    fn missing_file_is_absent() {
        let dir = tempdir().unwrap();
        assert!(JsonFileStore.load(&dir.path().join("nope.json")).is_none());
    }

    #[test]
    fn empty_and_garbage_files_are_absent() {
        let dir = tempdir().unwrap();
        let empty = dir.path().join("empty.json");
        fs::write(&empty, "  \n").unwrap();
        assert!(JsonFileStore.load(&empty).is_none());

        let garbage = dir.path().join("garbage.json");
        fs::write(&garbage, "{not json").unwrap();
        assert!(JsonFileStore.load(&garbage).is_none());
    }

    #[test]
    fn save_creates_directories_and_round_trips() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/data/clock.json");
        let doc = document();

        JsonFileStore.save(&doc, &path).unwrap();
        let written = fs::read_to_string(&path).unwrap();
        assert!(written.ends_with("}\n"));
        assert!(written.contains("\"last_updated\": \"2025-12-11T01:02:03Z\""));
        assert!(!temp_path(&path).exists());

        assert_eq!(JsonFileStore.load(&path), Some(doc));
    }

    #[test]
    fn save_overwrites_previous_content() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("clock.json");
        let mut doc = document();
        JsonFileStore.save(&doc, &path).unwrap();

        doc.last_incident = None;
        JsonFileStore.save(&doc, &path).unwrap();
        assert_eq!(JsonFileStore.load(&path).unwrap().last_incident, None);
    }

    #[test]
    fn in_memory_store_round_trips() {
        let store = InMemoryStore::new();
        let path = Path::new("data/x.json");
        assert!(store.load(path).is_none());
        store.save(&document(), path).unwrap();
        assert_eq!(store.load(path), Some(document()));
    }

    #[test]
    fn poisoned_in_memory_store_refuses_to_save() {
        let store = std::sync::Arc::new(InMemoryStore::new());
        let poisoner = store.clone();
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.documents.lock().unwrap();
            panic!("poison the lock");
        })
        .join();

        let path = Path::new("data/x.json");
        assert!(matches!(store.save(&document(), path), Err(ClockError::Storage(_))));
        assert!(store.load(path).is_none());
    }
}
