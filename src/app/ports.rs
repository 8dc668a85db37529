use crate::error::FetchError;
use async_trait::async_trait;

// Ingest-side ports
#[async_trait]
pub trait HttpClientPort: Send + Sync {
    /// GET a feed. Non-2xx responses and transport failures are `FetchError`s.
    async fn get(&self, url: &str) -> Result<HttpGetResult, FetchError>;
}

#[derive(Clone, Debug)]
pub struct HttpGetResult {
    pub status: u16,
    pub bytes: Vec<u8>,
    pub content_type: String,
}
