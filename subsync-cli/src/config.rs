//! `config.json` — channel nickname to channel id mapping.
//!
//! ```json
//! { "channels": { "main": "UCxxxxxxxxxxxxxxxxxxxxxx" } }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use subsync_core::types::ChannelId;

/// Config filename, looked up in the working directory.
pub const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration file '{0}' not found; create it with a 'channels' map")]
    NotFound(String),

    #[error("could not read '{0}': {1}")]
    Unreadable(String, #[source] std::io::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),

    #[error("unknown channel '{nickname}'; configured channels: {known}")]
    UnknownChannel { nickname: String, known: String },
}

#[derive(Debug, Deserialize)]
pub struct Config {
    pub channels: BTreeMap<String, String>,
}

/// Load and validate the channel config.
pub fn load(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound(path.display().to_string()));
    }
    let contents = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::Unreadable(path.display().to_string(), e))?;
    let config: Config = serde_json::from_str(&contents)
        .map_err(|e| ConfigError::Invalid(e.to_string()))?;

    if config.channels.is_empty() {
        return Err(ConfigError::Invalid(
            "'channels' must be a non-empty map".to_string(),
        ));
    }
    for (nickname, id) in &config.channels {
        if !id.starts_with("UC") {
            return Err(ConfigError::Invalid(format!(
                "channel id for '{nickname}' must start with 'UC', got '{id}'"
            )));
        }
    }
    Ok(config)
}

impl Config {
    /// Resolve a nickname to its channel id.
    pub fn resolve(&self, nickname: &str) -> Result<ChannelId, ConfigError> {
        self.channels
            .get(nickname)
            .map(|id| ChannelId::from(id.as_str()))
            .ok_or_else(|| ConfigError::UnknownChannel {
                nickname: nickname.to_string(),
                known: self
                    .channels
                    .keys()
                    .cloned()
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    }
}
