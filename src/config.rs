use crate::error::ConfigError;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_LIST_ENDPOINT: &str = "https://api.coinmarketcap.com/v1/ticker/?limit=0";
pub const DEFAULT_TICKER_ENDPOINT: &str = "https://api.coinmarketcap.com/v1/ticker/";

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub token: String,
    pub channels: Vec<String>,
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,
    #[serde(default = "default_cooldown_secs")]
    pub cooldown_secs: u64,
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,
    #[serde(default = "default_list_endpoint")]
    pub list_endpoint: String,
    #[serde(default = "default_ticker_endpoint")]
    pub ticker_endpoint: String,
}

fn default_refresh_interval_secs() -> u64 {
    5 * 60
}

fn default_cooldown_secs() -> u64 {
    30
}

fn default_http_timeout_secs() -> u64 {
    10
}

fn default_list_endpoint() -> String {
    DEFAULT_LIST_ENDPOINT.to_string()
}

fn default_ticker_endpoint() -> String {
    DEFAULT_TICKER_ENDPOINT.to_string()
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_slice(&raw)
    }

    pub fn from_slice(raw: &[u8]) -> Result<Self, ConfigError> {
        let config: Config = serde_json::from_slice(raw)?;
        if config.token.trim().is_empty() {
            return Err(ConfigError::MissingToken);
        }
        if config.channels.is_empty() {
            return Err(ConfigError::EmptyAllowList);
        }
        Ok(config)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_secs(self.cooldown_secs)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}
