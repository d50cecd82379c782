//! Configuration management for mediabridge
//!
//! This module handles loading and managing adapter configuration
//! from config files and environment variables.

use crate::utils::error::{AdapterError, IntoAdapterError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Playback adapter settings
    pub playback: PlaybackConfig,

    /// General settings
    pub general: GeneralConfig,
}

/// Playback adapter configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Progress poller period while playing, in milliseconds
    pub progress_interval_ms: u64,

    /// Playback rate applied when resuming
    pub normal_rate: f64,

    /// Surface errors raised while starting a load through the failure event
    pub report_play_errors: bool,
}

/// General configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            progress_interval_ms: 50, // 20 ticks per second
            normal_rate: 1.0,
            report_play_errors: true,
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

impl PlaybackConfig {
    pub fn progress_interval(&self) -> Duration {
        Duration::from_millis(self.progress_interval_ms)
    }
}

impl Config {
    /// Load configuration from various sources
    ///
    /// Configuration is loaded in the following order (later sources override earlier):
    /// 1. Default values
    /// 2. System config file (/etc/mediabridge/config.toml on Linux)
    /// 3. User config file (~/.config/mediabridge/config.toml on Linux)
    /// 4. Environment variables (MEDIABRIDGE_* prefix)
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

    /// Parse a TOML document; missing keys keep their defaults
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents).config_err("Failed to parse config")?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to user config file
    pub fn save(&self) -> Result<()> {
        let path = Self::user_config_path()
            .ok_or_else(|| AdapterError::Config("Cannot determine user config path".to_string()))?;
        self.save_to(&path)
    }

    /// Save configuration to an explicit path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).config_err("Failed to create config directory")?;
        }

        let toml = toml::to_string_pretty(self).config_err("Failed to serialize config")?;
        std::fs::write(path, toml)?;

        Ok(())
    }

    /// Merge configuration from a TOML file
    pub fn merge_from_file(&mut self, path: &Path) -> Result<()> {
        let contents = std::fs::read_to_string(path).config_err("Failed to read config file")?;
        let overrides: toml::Table = contents.parse().config_err("Failed to parse config file")?;

        // Keys absent from the file keep their current values
        let mut merged = toml::Value::try_from(&*self).config_err("Failed to serialize config")?;
        if let toml::Value::Table(table) = &mut merged {
            merge_tables(table, overrides);
        }
        *self = merged.try_into().config_err("Failed to apply config file")?;

        Ok(())
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(interval) = std::env::var("MEDIABRIDGE_PROGRESS_INTERVAL_MS") {
            self.playback.progress_interval_ms = interval
                .parse::<u64>()
                .config_err("Invalid MEDIABRIDGE_PROGRESS_INTERVAL_MS")?;
        }

        if let Ok(report) = std::env::var("MEDIABRIDGE_REPORT_PLAY_ERRORS") {
            self.playback.report_play_errors = report
                .parse::<bool>()
                .config_err("Invalid MEDIABRIDGE_REPORT_PLAY_ERRORS")?;
        }

        if let Ok(log_level) = std::env::var("MEDIABRIDGE_LOG_LEVEL") {
            self.general.log_level = log_level;
        }

        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.playback.progress_interval_ms == 0 {
            return Err(AdapterError::Config("Progress interval must be non-zero".to_string()));
        }

        if !(self.playback.normal_rate > 0.0) {
            return Err(AdapterError::Config("Normal playback rate must be positive".to_string()));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&self.general.log_level.as_str()) {
            return Err(AdapterError::Config(format!(
                "Invalid log level '{}', must be one of: {:?}",
                self.general.log_level, valid_log_levels
            )));
        }

        Ok(())
    }

    /// Get system config file path
    fn system_config_path() -> Option<PathBuf> {
        #[cfg(target_os = "linux")]
        return Some(PathBuf::from("/etc/mediabridge/config.toml"));

        #[cfg(target_os = "windows")]
        return std::env::var("PROGRAMDATA")
            .ok()
            .map(|p| PathBuf::from(p).join("MediaBridge").join("config.toml"));

        #[cfg(target_os = "macos")]
        return Some(PathBuf::from("/Library/Application Support/MediaBridge/config.toml"));

        #[allow(unreachable_code)]
        None
    }

    /// Get user config file path
    fn user_config_path() -> Option<PathBuf> {
        #[cfg(target_os = "linux")]
        return dirs::config_dir().map(|p| p.join("mediabridge").join("config.toml"));

        #[cfg(any(target_os = "windows", target_os = "macos"))]
        return dirs::config_dir().map(|p| p.join("MediaBridge").join("config.toml"));

        #[allow(unreachable_code)]
        None
    }
}

/// Recursively overlay `overrides` onto `base`
fn merge_tables(base: &mut toml::Table, overrides: toml::Table) {
    for (key, value) in overrides {
        match (base.get_mut(&key), value) {
            (Some(toml::Value::Table(existing)), toml::Value::Table(nested)) => {
                merge_tables(existing, nested)
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}
