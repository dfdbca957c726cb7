//! Platform configuration loading from platform.toml
//!
//! The file is optional. Every field has a default matching the values the
//! platform shipped with, so a missing file or a partial file both work.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Default configuration file name, looked up in the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "platform.toml";

/// Configuration structure representing the entire platform.toml file
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PlatformConfig {
    /// Credentials seeded into `adminSettings` on first initialization
    pub admin: AdminDefaults,
    /// Outbound notification settings
    pub telegram: TelegramSettings,
    /// Page the UI layer is sent to when a session check fails or on logout
    pub login_page: String,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            admin: AdminDefaults::default(),
            telegram: TelegramSettings::default(),
            login_page: "login.html".to_string(),
        }
    }
}

/// Admin credentials written when `adminSettings` is absent
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AdminDefaults {
    /// Initial admin username
    pub username: String,
    /// Initial admin password (stored as plaintext)
    pub password: String,
}

impl Default for AdminDefaults {
    fn default() -> Self {
        Self {
            username: "ielts_teacher".to_string(),
            password: "admin123".to_string(),
        }
    }
}

/// Telegram bot API settings. Token and chat id live in the store, not here.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TelegramSettings {
    /// Base URL of the bot API, without trailing slash
    pub api_base: String,
}

impl Default for TelegramSettings {
    fn default() -> Self {
        Self {
            api_base: "https://api.telegram.org".to_string(),
        }
    }
}

/// Loads platform configuration from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<PlatformConfig> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read config file: {e}"),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse platform.toml: {e}"),
    })
}

/// Loads configuration from `PLATFORM_CONFIG` or `./platform.toml`.
///
/// A missing file yields [`PlatformConfig::default`]; a file that exists but
/// does not parse is still an error.
pub fn load_default_config() -> Result<PlatformConfig> {
    let path = std::env::var("PLATFORM_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    if !Path::new(&path).exists() {
        tracing::info!("No config file at {}, using defaults", path);
        return Ok(PlatformConfig::default());
    }
    load_config(path)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let toml_str = r#"
            login_page = "index.html"

            [admin]
            username = "head_teacher"
            password = "s3cret"

            [telegram]
            api_base = "http://127.0.0.1:9000"
        "#;

        let config: PlatformConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.login_page, "index.html");
        assert_eq!(config.admin.username, "head_teacher");
        assert_eq!(config.admin.password, "s3cret");
        assert_eq!(config.telegram.api_base, "http://127.0.0.1:9000");
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let toml_str = r#"
            [admin]
            password = "changed"
        "#;

        let config: PlatformConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.admin.username, "ielts_teacher");
        assert_eq!(config.admin.password, "changed");
        assert_eq!(config.telegram, TelegramSettings::default());
        assert_eq!(config.login_page, "login.html");
    }

    #[test]
    fn test_load_config_missing_file_is_config_error() {
        let result = load_config("definitely/not/here/platform.toml");
        assert!(matches!(result, Err(Error::Config { .. })));
    }
}
