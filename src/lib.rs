pub mod clock;
pub mod config;
pub mod constants;
pub mod dates;
pub mod elapsed;
pub mod error;
pub mod logging;
pub mod merge;
pub mod parser;
pub mod pipeline;
pub mod registry;
pub mod relevance;
pub mod storage;
pub mod types;

// Ports and their adapters for the external collaborators
pub mod app;
pub mod infra;
