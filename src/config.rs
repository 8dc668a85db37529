use crate::error::{ClockError, Result};
use crate::relevance::KeywordConfig;
use serde::Deserialize;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub http: HttpConfig,
    pub output: OutputConfig,
    pub relevance: KeywordConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_seconds: u64,
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 60,
            user_agent: concat!("incident_clock/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub data_dir: PathBuf,
    pub log_dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            log_dir: PathBuf::from("logs"),
        }
    }
}

impl Config {
    /// Load from a TOML file, then apply environment overrides.
    ///
    /// A missing file means defaults; a file that exists but does not parse is an error.
    pub fn load(path: &Path) -> Result<Self> {
        let mut config = match fs::read_to_string(path) {
            Ok(content) => Self::from_toml(&content)?,
            Err(e) if e.kind() == ErrorKind::NotFound => Self::default(),
            Err(e) => {
                return Err(ClockError::Config(format!(
                    "Failed to read config file '{}': {}",
                    path.display(),
                    e
                )))
            }
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// `CLOCK_DATA_DIR`, `CLOCK_LOG_DIR` and `CLOCK_HTTP_TIMEOUT_SECS` win over the file.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup("CLOCK_DATA_DIR").filter(|v| !v.trim().is_empty()) {
            self.output.data_dir = PathBuf::from(dir);
        }
        if let Some(dir) = lookup("CLOCK_LOG_DIR").filter(|v| !v.trim().is_empty()) {
            self.output.log_dir = PathBuf::from(dir);
        }
        if let Some(secs) = lookup("CLOCK_HTTP_TIMEOUT_SECS") {
            self.http.timeout_seconds = secs.trim().parse().map_err(|_| {
                ClockError::Config(format!("CLOCK_HTTP_TIMEOUT_SECS is not a number: {:?}", secs))
            })?;
        }
        Ok(())
    }
}
