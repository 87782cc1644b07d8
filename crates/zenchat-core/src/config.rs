use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::ai::{ChatClient, DEFAULT_ENDPOINT, DEFAULT_TIMEOUT_SECS};

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub endpoint: Option<String>,
    pub timeout_secs: Option<u64>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from the user config directory, falling back to defaults when
    /// no file exists yet
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::get_config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: Config = serde_json::from_str(&config_content)
            .with_context(|| format!("parsing config {}", path.display()))?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::get_config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Create config directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config_content = serde_json::to_string_pretty(self)?;
        fs::write(path, config_content)?;
        Ok(())
    }

    /// Apply new settings, validating them first. Returns whether anything
    /// changed.
    pub fn update(&mut self, endpoint: Option<String>, timeout_secs: Option<u64>) -> Result<bool> {
        let mut changed = false;

        if let Some(endpoint) = endpoint {
            ChatClient::new(&endpoint)?;
            changed |= self.endpoint.as_deref() != Some(endpoint.as_str());
            self.endpoint = Some(endpoint);
        }

        if let Some(secs) = timeout_secs {
            if secs == 0 {
                return Err(anyhow!("timeout must be at least one second"));
            }
            changed |= self.timeout_secs != Some(secs);
            self.timeout_secs = Some(secs);
        }

        Ok(changed)
    }

    /// Endpoint to use: explicit override first, then config, then default
    pub fn resolve_endpoint(&self, cli_override: Option<&str>) -> String {
        cli_override
            .map(str::to_string)
            .or_else(|| self.endpoint.clone())
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string())
    }

    pub fn resolve_timeout(&self, cli_override: Option<u64>) -> Duration {
        Duration::from_secs(
            cli_override
                .or(self.timeout_secs)
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
        )
    }

    fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("zenchat").join("config.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(config, Config::new());
        assert_eq!(config.resolve_endpoint(None), DEFAULT_ENDPOINT);
        assert_eq!(
            config.resolve_timeout(None),
            Duration::from_secs(DEFAULT_TIMEOUT_SECS)
        );
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = Config {
            endpoint: Some("http://chat.local/chat".to_string()),
            timeout_secs: Some(5),
        };

        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn test_update_validates_and_reports_changes() {
        let mut config = Config::new();

        assert!(config.update(Some("ftp://chat.local".to_string()), None).is_err());
        assert!(config.update(None, Some(0)).is_err());
        assert_eq!(config, Config::new());

        assert!(config
            .update(Some("http://chat.local/chat".to_string()), Some(15))
            .unwrap());
        assert_eq!(config.endpoint.as_deref(), Some("http://chat.local/chat"));
        assert_eq!(config.timeout_secs, Some(15));

        assert!(!config
            .update(Some("http://chat.local/chat".to_string()), None)
            .unwrap());
        assert!(!config.update(None, None).unwrap());
    }

    #[test]
    fn test_override_precedence() {
        let config = Config {
            endpoint: Some("http://from-config/chat".to_string()),
            timeout_secs: Some(10),
        };
        assert_eq!(config.resolve_endpoint(None), "http://from-config/chat");
        assert_eq!(
            config.resolve_endpoint(Some("http://from-cli/chat")),
            "http://from-cli/chat"
        );
        assert_eq!(config.resolve_timeout(Some(3)), Duration::from_secs(3));
        assert_eq!(config.resolve_timeout(None), Duration::from_secs(10));
    }
}
