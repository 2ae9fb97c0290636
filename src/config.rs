// Configuration loading and parsing (config/overlay.toml).
//
// Every field has a default, and the file itself is optional: with no
// config present the overlay connects to Streamer.bot on 127.0.0.1:8080
// and gates commands at the Moderator role, matching the defaults of the
// original browser overlay. `PRICEBOARD_ADDRESS` and `PRICEBOARD_PORT`
// environment variables override the file.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::game::session::DEFAULT_MODERATOR_LEVEL;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {message}")]
    ReadError { path: PathBuf, message: String },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },
}

// ---------------------------------------------------------------------------
// Config structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub connection: ConnectionConfig,
    pub chat: ChatConfig,
}

/// `[connection]` table: where the Streamer.bot WebSocket server lives.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    pub host: String,
    pub port: u16,
    /// Seconds to wait between reconnect attempts.
    pub reconnect_delay_secs: u64,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        ConnectionConfig {
            host: "127.0.0.1".to_string(),
            port: 8080,
            reconnect_delay_secs: 5,
        }
    }
}

/// `[chat]` table: command gating.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Minimum Streamer.bot role allowed to issue round commands
    /// (1 = Viewer .. 4 = Broadcaster).
    pub moderator_level: u8,
}

impl Default for ChatConfig {
    fn default() -> Self {
        ChatConfig {
            moderator_level: DEFAULT_MODERATOR_LEVEL,
        }
    }
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load configuration from `config/overlay.toml` under `base_dir`. A
/// missing file is not an error; defaults apply.
pub(crate) fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let path = base_dir.join("config").join("overlay.toml");

    let config = if path.exists() {
        let text = std::fs::read_to_string(&path).map_err(|e| ConfigError::ReadError {
            path: path.clone(),
            message: e.to_string(),
        })?;
        toml::from_str(&text).map_err(|e| ConfigError::ParseError {
            path: path.clone(),
            source: e,
        })?
    } else {
        Config::default()
    };

    validate(&config)?;
    Ok(config)
}

/// Apply environment-style overrides for the connection address and port.
/// These stand in for the original overlay's URL query parameters.
pub(crate) fn apply_overrides(
    config: &mut Config,
    address: Option<String>,
    port: Option<String>,
) -> Result<(), ConfigError> {
    if let Some(address) = address {
        config.connection.host = address;
    }
    if let Some(port) = port {
        config.connection.port = port.parse().map_err(|_| ConfigError::ValidationError {
            field: "connection.port".into(),
            message: format!("override is not a valid port number: {port:?}"),
        })?;
    }
    Ok(())
}

/// Convenience wrapper: loads config relative to the current working
/// directory and applies `PRICEBOARD_ADDRESS` / `PRICEBOARD_PORT`
/// environment overrides.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|e| ConfigError::ReadError {
        path: PathBuf::from("."),
        message: e.to_string(),
    })?;
    let mut config = load_config_from(&cwd)?;
    apply_overrides(
        &mut config,
        std::env::var("PRICEBOARD_ADDRESS").ok(),
        std::env::var("PRICEBOARD_PORT").ok(),
    )?;
    validate(&config)?;
    Ok(config)
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.connection.host.is_empty() {
        return Err(ConfigError::ValidationError {
            field: "connection.host".into(),
            message: "must not be empty".into(),
        });
    }

    if config.connection.port == 0 {
        return Err(ConfigError::ValidationError {
            field: "connection.port".into(),
            message: "must be greater than 0".into(),
        });
    }

    if config.connection.reconnect_delay_secs == 0 {
        return Err(ConfigError::ValidationError {
            field: "connection.reconnect_delay_secs".into(),
            message: "must be greater than 0".into(),
        });
    }

    let level = config.chat.moderator_level;
    if !(1..=4).contains(&level) {
        return Err(ConfigError::ValidationError {
            field: "chat.moderator_level".into(),
            message: format!("must be between 1 (viewer) and 4 (broadcaster), got {level}"),
        });
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
