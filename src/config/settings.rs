//! Settings sections of the application configuration
//!
//! # Main Types
//!
//! - [`PlaybackConfig`] - Frame rate, screen bounds and trajectory noise
//! - [`DriverConfig`] - Which [`crate::driver::PlaybackDriver`] variant to build
//! - [`MotionConfig`] - Tuning of the motion relay filter
//! - [`LoggingConfig`] - Log filter and optional log directory

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::types::ScreenBounds;

use super::{DEFAULT_FRAME_INTERVAL_MS, DEFAULT_NOISE_SCALE_PX};

/// Playback timing and geometry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Interval between trajectory samples in milliseconds (8ms ~ 120Hz)
    pub frame_interval_ms: u64,

    /// Screen every emitted point must lie on
    pub screen: ScreenBounds,

    /// Standard deviation of positional noise, in pixels per unit of jitter
    pub noise_scale_px: f64,

    /// Move the cursor onto a click point before pressing, unless it is
    /// already known to be there. Off by default: a click step presses
    /// wherever the cursor is.
    pub position_before_click: bool,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            frame_interval_ms: DEFAULT_FRAME_INTERVAL_MS,
            screen: ScreenBounds::default(),
            noise_scale_px: DEFAULT_NOISE_SCALE_PX,
            position_before_click: false,
        }
    }
}

impl PlaybackConfig {
    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }

    pub fn with_screen(mut self, width: u32, height: u32) -> Self {
        self.screen = ScreenBounds::new(width, height);
        self
    }

    pub fn with_frame_interval_ms(mut self, frame_interval_ms: u64) -> Self {
        self.frame_interval_ms = frame_interval_ms;
        self
    }
}

/// Available driver backends
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum DriverBackend {
    /// Real pointer injection through the operating system
    #[default]
    Os,
    /// Record every call in memory
    Recording,
    /// Discard every call
    Noop,
}

impl DriverBackend {
    pub fn display_name(&self) -> &'static str {
        match self {
            DriverBackend::Os => "os",
            DriverBackend::Recording => "recording",
            DriverBackend::Noop => "noop",
        }
    }
}

impl std::fmt::Display for DriverBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Driver selection
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    pub backend: DriverBackend,
}

/// Motion relay tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    /// Pixels per unit of angular rate
    pub sensitivity: f64,
    /// Exponential smoothing factor in `[0, 1]`; higher is smoother but lags more
    pub smoothing: f64,
    /// Readings with an absolute value below this are treated as zero
    pub dead_zone: f64,
    /// Offset subtracted from the X reading
    pub calibration_x: f64,
    /// Offset subtracted from the Y reading
    pub calibration_y: f64,
    /// Tilt up moves the cursor up
    pub invert_y: bool,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            sensitivity: 2.0,
            smoothing: 0.1,
            dead_zone: 0.0,
            calibration_x: 0.0,
            calibration_y: 0.0,
            invert_y: true,
        }
    }
}

/// Logging output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive used when `RUST_LOG` is unset
    pub filter: String,
    /// Directory for daily-rolling log files; console only when unset
    pub log_dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            log_dir: None,
        }
    }
}
