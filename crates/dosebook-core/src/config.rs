//! Application configuration management.
//!
//! This module handles loading and saving the application configuration,
//! which includes the server address, the last used username and which
//! storage backend keeps the session.
//!
//! Configuration is stored at `~/.config/dosebook/config.json`.

use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Application name used for config directory paths
const APP_NAME: &str = "dosebook";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Environment variable overriding the server origin. Read by the front-end
/// and passed in as the override.
pub const API_BASE_URL_ENV: &str = "DOSEBOOK_API_BASE_URL";

/// Local development server used when nothing else is configured
pub const DEFAULT_API_ORIGIN: &str = "http://127.0.0.1:8000";

/// Path prefix every API route lives under
const API_PREFIX: &str = "/api";

/// Where the session token and user are persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    File,
    Keyring,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub api_base_url: Option<String>,
    pub last_username: Option<String>,
    pub storage: StorageBackend,
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            Ok(serde_json::from_str(&contents)?)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Resolve the API base URL.
    ///
    /// First non-empty of: `override_origin` (flag or environment, supplied
    /// by the caller), the config file, the local default. `/api` is always
    /// appended. Nothing is read from the process environment here.
    pub fn resolve_api_base_url(&self, override_origin: Option<&str>) -> String {
        let origin = [override_origin, self.api_base_url.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|s| !s.is_empty())
            .unwrap_or(DEFAULT_API_ORIGIN);
        api_url(origin)
    }
}

/// Append the API prefix to a server origin
pub fn api_url(origin: &str) -> String {
    format!("{}{}", origin.trim_end_matches('/'), API_PREFIX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_url_appends_prefix() {
        assert_eq!(api_url("http://127.0.0.1:8000"), "http://127.0.0.1:8000/api");
        assert_eq!(api_url("https://example.com/"), "https://example.com/api");
    }

    #[test]
    fn test_override_wins() {
        let config = Config {
            api_base_url: Some("http://from-file".to_string()),
            ..Default::default()
        };
        assert_eq!(
            config.resolve_api_base_url(Some("http://from-flag")),
            "http://from-flag/api"
        );
    }

    #[test]
    fn test_blank_override_is_ignored() {
        let config = Config {
            api_base_url: Some("http://from-file".to_string()),
            ..Default::default()
        };
        assert_eq!(config.resolve_api_base_url(Some("  ")), "http://from-file/api");
        assert_eq!(config.resolve_api_base_url(None), "http://from-file/api");
    }

    #[test]
    fn test_default_origin_when_nothing_configured() {
        let config = Config {
            api_base_url: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(config.resolve_api_base_url(None), "http://127.0.0.1:8000/api");
        assert_eq!(Config::default().resolve_api_base_url(Some("")), "http://127.0.0.1:8000/api");
    }

    #[test]
    fn test_process_environment_is_not_consulted() {
        std::env::set_var(API_BASE_URL_ENV, "http://from-env");
        let resolved = Config::default().resolve_api_base_url(None);
        std::env::remove_var(API_BASE_URL_ENV);
        assert_eq!(resolved, "http://127.0.0.1:8000/api");
    }

    #[test]
    fn test_config_defaults_when_fields_missing() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config.storage, StorageBackend::File);
        assert!(config.api_base_url.is_none());

        let config: Config = serde_json::from_str(r#"{"storage":"keyring"}"#).unwrap();
        assert_eq!(config.storage, StorageBackend::Keyring);
    }
}
