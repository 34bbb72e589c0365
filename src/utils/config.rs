//! Configuration management for ccplayer-common
//!
//! This module handles loading player defaults from config files and
//! environment variables. Values here seed [`crate::player::MemoryPlayer`]
//! and the bundle list transfer.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use crate::utils::error::{IntoMediaError, MediaError, Result};

/// Main configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Player behaviour
    pub player: PlayerConfig,

    /// Chunked list transfer
    pub transfer: TransferConfig,

    /// General settings
    pub general: GeneralConfig,
}

/// Player behaviour defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Increment used by `seek_back`, in milliseconds
    pub seek_back_increment_ms: i64,

    /// Increment used by `seek_forward`, in milliseconds
    pub seek_forward_increment_ms: i64,

    /// Up to this position `seek_to_previous` goes to the previous item
    pub max_seek_to_previous_position_ms: i64,
}

/// Chunked list transfer settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransferConfig {
    /// Soft ceiling for one encoded chunk, in bytes
    pub max_chunk_bytes: usize,
}

/// General settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            seek_back_increment_ms: 5_000,
            seek_forward_increment_ms: 15_000,
            max_seek_to_previous_position_ms: 3_000,
        }
    }
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            max_chunk_bytes: 64 * 1024,
        }
    }
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from various sources
    ///
    /// Configuration is loaded in the following order (later sources override earlier):
    /// 1. Default values
    /// 2. System config file (/etc/ccplayer/common.toml on Linux)
    /// 3. User config file (~/.config/ccplayer/common.toml on Linux)
    /// 4. Environment variables (CCPLAYER_* prefix)
    pub fn load() -> Result<Self> {
        let mut config = Self::default();

        if let Some(system_path) = Self::system_config_path() {
            if system_path.exists() {
                config.merge_from_file(&system_path)?;
            }
        }

        if let Some(user_path) = Self::user_config_path() {
            if user_path.exists() {
                config.merge_from_file(&user_path)?;
            }
        }

        config.apply_env_overrides()?;
        config.validate()?;

        Ok(config)
    }

    /// Load defaults overlaid with a single file, then environment overrides
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config = Self::default();
        config.merge_from_file(path)?;
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to user config file
    pub fn save(&self) -> Result<()> {
        let path = Self::user_config_path()
            .ok_or_else(|| MediaError::Config("Cannot determine user config path".to_string()))?;
        self.save_to(&path)
    }

    /// Save configuration to the given path, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).config_err("Failed to create config directory")?;
        }

        let toml = toml::to_string_pretty(self).config_err("Failed to serialize config")?;
        std::fs::write(path, toml).config_err("Failed to write config file")?;

        Ok(())
    }

    /// Merge configuration from a TOML file
    ///
    /// Keys present in the file replace the current values; absent keys keep them.
    fn merge_from_file(&mut self, path: &Path) -> Result<()> {
        let contents = std::fs::read_to_string(path).config_err("Failed to read config file")?;
        let overlay: toml::Value = toml::from_str(&contents).config_err("Failed to parse config file")?;

        let mut base = toml::Value::try_from(&*self).config_err("Failed to serialize config")?;
        merge_values(&mut base, overlay);

        *self = base.try_into().config_err("Invalid config file")?;
        log::debug!("Merged configuration from {}", path.display());

        Ok(())
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Some(value) = env_parse("CCPLAYER_SEEK_BACK_INCREMENT_MS")? {
            self.player.seek_back_increment_ms = value;
        }

        if let Some(value) = env_parse("CCPLAYER_SEEK_FORWARD_INCREMENT_MS")? {
            self.player.seek_forward_increment_ms = value;
        }

        if let Some(value) = env_parse("CCPLAYER_MAX_SEEK_TO_PREVIOUS_POSITION_MS")? {
            self.player.max_seek_to_previous_position_ms = value;
        }

        if let Some(value) = env_parse("CCPLAYER_TRANSFER_MAX_CHUNK_BYTES")? {
            self.transfer.max_chunk_bytes = value;
        }

        if let Ok(log_level) = std::env::var("CCPLAYER_LOG_LEVEL") {
            self.general.log_level = log_level;
        }

        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.player.seek_back_increment_ms <= 0 || self.player.seek_forward_increment_ms <= 0 {
            return Err(MediaError::Config("Seek increments must be positive".to_string()));
        }

        if self.player.max_seek_to_previous_position_ms < 0 {
            return Err(MediaError::Config(
                "Max seek-to-previous position must not be negative".to_string(),
            ));
        }

        if self.transfer.max_chunk_bytes < 1024 {
            return Err(MediaError::Config("Transfer chunks must allow at least 1024 bytes".to_string()));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&self.general.log_level.as_str()) {
            return Err(MediaError::Config(format!(
                "Invalid log level '{}', must be one of: {:?}",
                self.general.log_level,
                valid_log_levels
            )));
        }

        Ok(())
    }

    /// Get system config file path
    fn system_config_path() -> Option<PathBuf> {
        #[cfg(target_os = "linux")]
        return Some(PathBuf::from("/etc/ccplayer/common.toml"));

        #[cfg(target_os = "windows")]
        return std::env::var("PROGRAMDATA").ok()
            .map(|p| PathBuf::from(p).join("CCPlayer").join("common.toml"));

        #[cfg(target_os = "macos")]
        return Some(PathBuf::from("/Library/Application Support/CCPlayer/common.toml"));

        #[allow(unreachable_code)]
        None
    }

    /// Get user config file path
    fn user_config_path() -> Option<PathBuf> {
        #[cfg(target_os = "linux")]
        return dirs::config_dir()
            .map(|p| p.join("ccplayer").join("common.toml"));

        #[cfg(any(target_os = "windows", target_os = "macos"))]
        return dirs::config_dir()
            .map(|p| p.join("CCPlayer").join("common.toml"));

        #[allow(unreachable_code)]
        None
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Result<Option<T>> {
    match std::env::var(name) {
        Ok(raw) => raw
            .parse()
            .map(Some)
            .map_err(|_| MediaError::Config(format!("Invalid {}", name))),
        Err(_) => Ok(None),
    }
}

fn merge_values(base: &mut toml::Value, overlay: toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base), toml::Value::Table(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.player.seek_back_increment_ms, 5_000);
        assert_eq!(config.player.seek_forward_increment_ms, 15_000);
        assert_eq!(config.player.max_seek_to_previous_position_ms, 3_000);
        assert_eq!(config.transfer.max_chunk_bytes, 65_536);
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.player.seek_back_increment_ms = 0;
        assert!(config.validate().is_err());

        config.player.seek_back_increment_ms = 5_000;
        config.transfer.max_chunk_bytes = 10;
        assert!(config.validate().is_err());

        config.transfer.max_chunk_bytes = 4096;
        config.general.log_level = "invalid".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml = toml::to_string(&config).unwrap();
        let deserialized: Config = toml::from_str(&toml).unwrap();
        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_merge_keeps_unspecified_values() {
        let mut base = toml::Value::try_from(Config::default()).unwrap();
        let overlay: toml::Value = toml::from_str("[player]\nseek_back_increment_ms = 10000\n").unwrap();
        merge_values(&mut base, overlay);

        let merged: Config = base.try_into().unwrap();
        assert_eq!(merged.player.seek_back_increment_ms, 10_000);
        assert_eq!(merged.player.seek_forward_increment_ms, 15_000);
        assert_eq!(merged.general.log_level, "info");
    }
}
