use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

/// User configuration, read from `config.toml` in the application
/// directory. Every field has a default; the file itself is optional.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Timeout for every HTTP request, in seconds.
    pub http_timeout_secs: u64,
    /// User-Agent header sent with feed and page requests.
    pub user_agent: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            http_timeout_secs: 30,
            user_agent: concat!("tern/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl Config {
    /// Loads configuration from `path`, falling back to defaults when the
    /// file does not exist. A file that exists but does not parse is an
    /// error so typos are not silently ignored.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }
}
