use thiserror::Error;

/// A date string that matched none of the supported representations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Cannot parse date: {input:?}")]
pub struct DateParseError {
    pub input: String,
}

/// Retrieval of a source feed failed. Always fatal for the run.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("Request to {url} returned HTTP {status}")]
    Status { url: String, status: u16 },
}

/// Prior state could not be read. Never escapes the store; callers see "no history".
#[derive(Error, Debug)]
pub enum PersistenceReadError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Document is empty")]
    Empty,

    #[error("Document could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum ClockError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Feed {url} is not readable: {message}")]
    Feed { url: String, message: String },

    #[error("Failed to write document: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to encode document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Document store unavailable: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unknown clock: {0}")]
    UnknownClock(String),
}

pub type Result<T> = std::result::Result<T, ClockError>;
