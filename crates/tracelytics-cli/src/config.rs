use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracelytics_sdk::QueryConfig;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TracelyticsConfig {
    /// JSON snapshot the CLI loads before and saves after each command.
    pub data_file: PathBuf,
    pub default_limit: usize,
    pub max_limit: usize,
}

impl Default for TracelyticsConfig {
    fn default() -> Self {
        let query = QueryConfig::default();
        Self {
            data_file: PathBuf::from("tracelytics.json"),
            default_limit: query.default_limit,
            max_limit: query.max_limit,
        }
    }
}

impl TracelyticsConfig {
    /// Read a TOML file, or fall back to defaults when no path is given.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: Self = toml::from_str(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;
        if config.default_limit > config.max_limit {
            anyhow::bail!(
                "default_limit ({}) exceeds max_limit ({})",
                config.default_limit,
                config.max_limit
            );
        }
        Ok(config)
    }

    pub fn query(&self) -> QueryConfig {
        QueryConfig {
            default_limit: self.default_limit,
            max_limit: self.max_limit,
        }
    }
}
