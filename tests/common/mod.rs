#![allow(dead_code)]

use async_trait::async_trait;
use incident_clock::app::ports::{HttpClientPort, HttpGetResult};
use incident_clock::error::FetchError;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

pub fn fixture(name: &str) -> Vec<u8> {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name);
    std::fs::read(&path).unwrap_or_else(|e| panic!("fixture {}: {}", path.display(), e))
}

/// Canned responses keyed by URL. Unknown URLs answer 404.
#[derive(Default)]
pub struct StaticHttp {
    routes: HashMap<String, (u16, Vec<u8>)>,
    calls: Mutex<Vec<String>>,
}

impl StaticHttp {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, url: &str, status: u16, body: impl Into<Vec<u8>>) -> Self {
        self.routes.insert(url.to_string(), (status, body.into()));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpClientPort for StaticHttp {
    async fn get(&self, url: &str) -> Result<HttpGetResult, FetchError> {
        self.calls.lock().unwrap().push(url.to_string());
        let (status, body) = self
            .routes
            .get(url)
            .cloned()
            .unwrap_or((404, Vec::new()));
        if !(200..300).contains(&status) {
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }
        Ok(HttpGetResult {
            status,
            bytes: body,
            content_type: "text/plain".to_string(),
        })
    }
}
