//! Application settings loading from config.toml
//!
//! Non-secret settings (bind address, token lifetime, chat model) live in an optional
//! TOML file. Every field has a default, so a missing file yields a working configuration.
//! Secrets such as `JWT_SECRET` and `OPENAI_API_KEY` are read from the environment instead.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info};

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Settings {
    /// HTTP server settings
    pub server: ServerSettings,
    /// Token issuance settings
    pub auth: AuthSettings,
    /// Conversational adapter settings
    pub chat: ChatSettings,
}

/// `[server]` table
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerSettings {
    /// Socket address the API listens on
    pub bind_addr: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
        }
    }
}

/// `[auth]` table
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AuthSettings {
    /// Lifetime of issued bearer tokens
    pub token_ttl_hours: i64,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self { token_ttl_hours: 72 }
    }
}

impl AuthSettings {
    /// Token lifetime as a duration. Fails for non-positive or out-of-range hour counts.
    pub fn token_ttl(&self) -> Result<chrono::Duration> {
        chrono::Duration::try_hours(self.token_ttl_hours)
            .filter(|ttl| *ttl > chrono::Duration::zero())
            .ok_or_else(|| Error::Config {
                message: format!(
                    "auth.token_ttl_hours must be a positive number of hours, got {}",
                    self.token_ttl_hours
                ),
            })
    }
}

/// `[chat]` table
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ChatSettings {
    /// Chat-completion model used for intent parsing
    pub model: String,
    /// Base URL of the OpenAI-compatible API
    pub api_base: String,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            model: "gpt-3.5-turbo".to_string(),
            api_base: "https://api.openai.com/v1".to_string(),
        }
    }
}

/// Loads settings from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<Settings> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read config file {:?}: {e}", path.as_ref()),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse {:?}: {e}", path.as_ref()),
    })
}

/// Loads settings from `CONFIG_PATH` (default `./config.toml`), falling back to defaults
/// when the file does not exist.
pub fn load_default_settings() -> Result<Settings> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    if Path::new(&path).exists() {
        info!("Loading settings from {}", path);
        load_settings(&path)
    } else {
        debug!("No settings file at {}, using defaults", path);
        Ok(Settings::default())
    }
}
