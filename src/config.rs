//! Configuration management for DramaTUI
//!
//! Handles config file loading/saving.
//! Config is stored at ~/.config/dramatui/config.toml

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::api::client::{DEFAULT_BASE_URL, DEFAULT_LANG};
use crate::stream::PlayerType;

/// Environment variable overriding the backend root
pub const BASE_URL_ENV: &str = "DRAMATUI_BASE_URL";

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Backend root, endpoints are appended to it
    pub base_url: String,
    /// Content language sent with every request
    pub lang: String,
    /// Per-request upper bound in seconds
    pub request_timeout_secs: u64,
    /// Advance to the next episode when one finishes
    pub auto_advance: bool,
    /// Preferred external player
    pub player: PlayerType,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            lang: DEFAULT_LANG.to_string(),
            request_timeout_secs: 15,
            auto_advance: true,
            player: PlayerType::default(),
        }
    }
}

impl Config {
    /// Get config file path (~/.config/dramatui/config.toml)
    pub fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("dramatui").join("config.toml"))
    }

    /// Load config from the default location, or return default if not found
    pub fn load() -> Self {
        Self::path()
            .and_then(|p| Self::load_from(&p).ok())
            .unwrap_or_default()
    }

    /// Load config from an explicit file
    pub fn load_from(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("Invalid config in {}", path.display()))
    }

    /// Save config to the default location
    pub fn save(&self) -> Result<()> {
        let path = Self::path().ok_or_else(|| anyhow::anyhow!("Could not determine config path"))?;
        self.save_to(&path)
    }

    /// Save config to an explicit file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Create parent directory if needed
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let toml = toml::to_string_pretty(self)?;
        std::fs::write(path, toml)?;
        Ok(())
    }

    /// Backend root, with the environment variable taking precedence
    pub fn base_url(&self) -> String {
        std::env::var(BASE_URL_ENV)
            .ok()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| self.base_url.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.lang, "in");
        assert_eq!(config.request_timeout_secs, 15);
        assert!(config.auto_advance);
        assert_eq!(config.player, PlayerType::Mpv);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: Config = toml::from_str("auto_advance = false\nplayer = \"vlc\"").unwrap();
        assert!(!config.auto_advance);
        assert_eq!(config.player, PlayerType::Vlc);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let config = Config {
            lang: "en".into(),
            request_timeout_secs: 30,
            ..Config::default()
        };
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.lang, "en");
        assert_eq!(loaded.request_timeout_secs, 30);
    }

    #[test]
    fn test_load_missing_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Config::load_from(&dir.path().join("absent.toml")).is_err());
    }
}
