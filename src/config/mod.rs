//! Configuration module for mousecontrol
//!
//! This module handles application configuration including:
//! - Playback timing and screen geometry
//! - Driver backend selection
//! - Motion relay tuning
//! - Logging output
//!
//! # Config Location
//!
//! The configuration file is TOML and lives in the platform-appropriate
//! config directory under `dev.mousecontrol`:
//! - **Linux**: `~/.config/dev.mousecontrol/config.toml`
//! - **macOS**: `~/Library/Application Support/dev.mousecontrol/config.toml`
//! - **Windows**: `%APPDATA%\dev.mousecontrol\config.toml`
//!
//! Every section and field is optional; missing values take their defaults.
//!
//! # Example
//!
//! ```ignore
//! use mousecontrol::config::AppConfig;
//!
//! let config = AppConfig::load_or_default();
//! println!("frame interval: {}ms", config.playback.frame_interval_ms);
//! ```

pub mod settings;

pub use settings::*;

use crate::error::{MouseControlError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application identifier for config directories
pub const APP_ID: &str = "dev.mousecontrol";

/// Config filename
pub const CONFIG_FILE: &str = "config.toml";

/// Default interval between trajectory samples (~120Hz)
pub const DEFAULT_FRAME_INTERVAL_MS: u64 = 8;

/// Default positional noise in pixels per unit of jitter
pub const DEFAULT_NOISE_SCALE_PX: f64 = 1.5;

/// Get the application config directory path
pub fn config_dir() -> Option<PathBuf> {
    dirs_next::config_dir().map(|p| p.join(APP_ID))
}

/// Get the path to the default config file
pub fn default_config_path() -> Option<PathBuf> {
    config_dir().map(|p| p.join(CONFIG_FILE))
}

/// Complete application configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub playback: PlaybackConfig,
    pub driver: DriverConfig,
    pub motion: MotionConfig,
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Parse a configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(content)
            .map_err(|e| MouseControlError::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            MouseControlError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    /// Load the default config file, returning defaults when it is missing or broken
    pub fn load_or_default() -> Self {
        let Some(path) = default_config_path() else {
            return Self::default();
        };

        if !path.exists() {
            return Self::default();
        }

        Self::load(&path).unwrap_or_else(|e| {
            tracing::warn!("Failed to load config, using defaults: {}", e);
            Self::default()
        })
    }

    /// Save the configuration as TOML, creating parent directories
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    MouseControlError::Config(format!("Failed to create config directory: {}", e))
                })?;
            }
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| MouseControlError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| MouseControlError::Config(format!("Failed to write config: {}", e)))
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<()> {
        if self.playback.frame_interval_ms == 0 {
            return Err(MouseControlError::Config(
                "playback.frame_interval_ms must be > 0".to_string(),
            ));
        }
        if self.playback.screen.width == 0 || self.playback.screen.height == 0 {
            return Err(MouseControlError::Config(
                "playback.screen must have a non-zero width and height".to_string(),
            ));
        }
        if !self.playback.noise_scale_px.is_finite() || self.playback.noise_scale_px < 0.0 {
            return Err(MouseControlError::Config(
                "playback.noise_scale_px must be >= 0".to_string(),
            ));
        }
        if self.motion.sensitivity <= 0.0 {
            return Err(MouseControlError::Config(
                "motion.sensitivity must be > 0".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.motion.smoothing) {
            return Err(MouseControlError::Config(
                "motion.smoothing must be between 0 and 1".to_string(),
            ));
        }
        if self.motion.dead_zone < 0.0 {
            return Err(MouseControlError::Config(
                "motion.dead_zone must be >= 0".to_string(),
            ));
        }
        Ok(())
    }
}
