//! Application configuration management.
//!
//! This module handles loading the application configuration,
//! which includes the drinks service base URL, the data directory holding
//! user drinks and cached images, and the HTTP request timeout.
//!
//! Configuration is stored at `~/.config/barman/config.json`. Every field is
//! optional; `BARMAN_BASE_URL` and `BARMAN_DATA_DIR` override the file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::api::{Endpoints, DEFAULT_BASE_URL, DEFAULT_REQUEST_TIMEOUT_SECS};
use crate::cache::IMAGES_DIR;
use crate::store::STORE_FILE;

/// Application name used for config/data directory paths
pub const APP_NAME: &str = "barman";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Environment variable overriding the service base URL
pub const ENV_BASE_URL: &str = "BARMAN_BASE_URL";

/// Environment variable overriding the data directory
pub const ENV_DATA_DIR: &str = "BARMAN_DATA_DIR";

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    pub base_url: Option<String>,
    pub data_dir: Option<PathBuf>,
    pub request_timeout_secs: Option<u64>,
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            Ok(serde_json::from_str(&contents)?)
        } else {
            Ok(Self::default())
        }
    }

    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Apply overrides from the environment. `lookup` is `std::env::var` in
    /// the binary; empty values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(url) = non_empty(ENV_BASE_URL) {
            self.base_url = Some(url);
        }
        if let Some(dir) = non_empty(ENV_DATA_DIR) {
            self.data_dir = Some(PathBuf::from(dir));
        }
    }

    pub fn endpoints(&self) -> Endpoints {
        Endpoints::new(self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS))
    }

    pub fn data_dir(&self) -> Result<PathBuf> {
        if let Some(ref dir) = self.data_dir {
            return Ok(dir.clone());
        }
        let data_dir = dirs::data_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?;
        Ok(data_dir.join(APP_NAME))
    }

    pub fn images_dir(&self) -> Result<PathBuf> {
        Ok(self.data_dir()?.join(IMAGES_DIR))
    }

    pub fn store_path(&self) -> Result<PathBuf> {
        Ok(self.data_dir()?.join(STORE_FILE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.endpoints().base_url(), DEFAULT_BASE_URL);
        assert_eq!(
            config.request_timeout(),
            Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS)
        );
    }

    #[test]
    fn test_paths_follow_data_dir() {
        let config = Config {
            data_dir: Some(PathBuf::from("/var/lib/barman")),
            ..Config::default()
        };
        assert_eq!(
            config.images_dir().expect("images dir"),
            PathBuf::from("/var/lib/barman/images")
        );
        assert_eq!(
            config.store_path().expect("store path"),
            PathBuf::from("/var/lib/barman/drinks.json")
        );
    }

    #[test]
    fn test_apply_env_overrides_file_values() {
        let mut config = Config {
            base_url: Some("http://from-file.test".to_string()),
            data_dir: None,
            request_timeout_secs: Some(5),
        };
        config.apply_env(|key| match key {
            ENV_BASE_URL => Some("http://from-env.test/".to_string()),
            ENV_DATA_DIR => Some("   ".to_string()),
            _ => None,
        });

        assert_eq!(config.endpoints().base_url(), "http://from-env.test");
        assert_eq!(config.data_dir, None);
        assert_eq!(config.request_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(
            &path,
            r#"{"base_url": "http://drinks.test", "data_dir": "/srv/barman"}"#,
        )
        .expect("write config");

        let config = Config::load_from(&path).expect("load");
        assert_eq!(config.base_url.as_deref(), Some("http://drinks.test"));
        assert_eq!(config.data_dir, Some(PathBuf::from("/srv/barman")));
        assert_eq!(config.request_timeout_secs, None);
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = Config::load_from(&dir.path().join(CONFIG_FILE)).expect("load");
        assert_eq!(config, Config::default());
    }
}
