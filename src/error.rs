use reqwest::StatusCode;
use std::path::PathBuf;
use thiserror::Error;

/// Failures of the ticker provider and of query resolution.
#[derive(Error, Debug)]
pub enum TickerError {
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Ticker endpoint returned {0}")]
    Status(StatusCode),

    #[error("JSON parsing error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("No ticker matches '{0}'")]
    NotFound(String),

    #[error("Expected exactly one ticker, got {0}")]
    Cardinality(usize),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Config is missing a bot token")]
    MissingToken,

    #[error("Config lists no channels")]
    EmptyAllowList,
}

#[derive(Error, Debug)]
pub enum DiscordError {
    #[error("WebSocket error: {0}")]
    Websocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Discord API returned {0}")]
    Status(StatusCode),

    #[error("Gateway protocol error: {0}")]
    Protocol(String),
}
