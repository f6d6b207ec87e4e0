//! Application configuration management.
//!
//! This module handles loading and saving the application configuration,
//! which includes the API base URL, the refresh endpoint, the request timeout
//! and the last used email address.
//!
//! Configuration is stored at `~/.config/quizkit/config.json`. The API URL
//! can be overridden with `QUIZKIT_API_URL`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Application name used for config/cache directory paths
const APP_NAME: &str = "quizkit";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Environment variable overriding the configured API URL
pub const API_URL_ENV: &str = "QUIZKIT_API_URL";

const DEFAULT_API_URL: &str = "http://localhost:3000/api";

const DEFAULT_REFRESH_PATH: &str = "/auth/refresh";

/// HTTP request timeout in seconds. Also bounds the refresh call, and with it
/// how long queued requests wait for a refresh to settle.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub api_base_url: Option<String>,
    pub refresh_path: Option<String>,
    pub request_timeout_secs: Option<u64>,
    pub last_email: Option<String>,
}

/// What the API client needs, with defaults filled in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub refresh_path: String,
    pub request_timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            refresh_path: DEFAULT_REFRESH_PATH.to_string(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Missing file means defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse config file {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)
            .with_context(|| format!("Failed to write config file {}", path.display()))?;
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Directory for log files
    pub fn cache_dir() -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }

    /// Client settings, honoring `QUIZKIT_API_URL`
    pub fn client_config(&self) -> ClientConfig {
        self.resolve(std::env::var(API_URL_ENV).ok())
    }

    fn resolve(&self, env_url: Option<String>) -> ClientConfig {
        let defaults = ClientConfig::default();
        let base_url = env_url
            .filter(|url| !url.trim().is_empty())
            .or_else(|| self.api_base_url.clone())
            .unwrap_or(defaults.base_url);
        ClientConfig {
            base_url,
            refresh_path: self.refresh_path.clone().unwrap_or(defaults.refresh_path),
            request_timeout_secs: self
                .request_timeout_secs
                .filter(|secs| *secs > 0)
                .unwrap_or(defaults.request_timeout_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_defaults() {
        let client = Config::default().resolve(None);
        assert_eq!(client, ClientConfig::default());
        assert_eq!(client.refresh_path, "/auth/refresh");
    }

    #[test]
    fn test_env_url_wins() {
        let config = Config {
            api_base_url: Some("https://quiz.example.com/api".to_string()),
            request_timeout_secs: Some(0),
            ..Config::default()
        };
        assert_eq!(config.resolve(None).base_url, "https://quiz.example.com/api");
        assert_eq!(
            config.resolve(Some("http://127.0.0.1:4000".to_string())).base_url,
            "http://127.0.0.1:4000"
        );
        assert_eq!(config.resolve(Some("  ".to_string())).base_url, "https://quiz.example.com/api");
        // Zero timeout is not a timeout
        assert_eq!(config.resolve(None).request_timeout_secs, 30);
    }

    #[test]
    fn test_save_and_load() {
        let path = std::env::temp_dir()
            .join(format!("quizkit-config-test-{}", std::process::id()))
            .join(CONFIG_FILE);
        let config = Config {
            last_email: Some("ada@example.com".to_string()),
            refresh_path: Some("/api/auth/refresh-token".to_string()),
            ..Config::default()
        };
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.last_email.as_deref(), Some("ada@example.com"));
        assert_eq!(loaded.client_config().refresh_path, "/api/auth/refresh-token");

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_missing_file_is_default() {
        let path = std::env::temp_dir().join("quizkit-config-does-not-exist.json");
        let loaded = Config::load_from(&path).unwrap();
        assert!(loaded.api_base_url.is_none());
    }
}
