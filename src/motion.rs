//! Motion relay
//!
//! Turns a stream of angular-rate readings (for example from a phone
//! gyroscope) into relative cursor moves and clicks on a playback driver.
//!
//! Each reading goes through [`MotionFilter`]:
//!
//! 1. subtract the calibration offsets
//! 2. zero any axis whose magnitude is under the dead zone
//! 3. scale by the sensitivity
//! 4. negate Y when `invert_y` is set
//! 5. exponential smoothing, `new = old * (1 - a) + raw * a`
//! 6. round to whole pixels
//!
//! Readings arrive as JSON lines, `{"gyroX": 0.4, "gyroY": -0.1,
//! "leftClick": false, "rightClick": false}`; every key is optional.

use serde::{Deserialize, Serialize};
use std::io::BufRead;

use crate::config::MotionConfig;
use crate::driver::{PlaybackDriver, SharedDriver};
use crate::error::{MouseControlError, Result};
use crate::types::{MouseButton, Point, ScreenBounds};

/// One angular-rate reading with click requests
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionSample {
    #[serde(rename = "gyroX")]
    pub gyro_x: f64,
    #[serde(rename = "gyroY")]
    pub gyro_y: f64,
    #[serde(rename = "leftClick")]
    pub left_click: bool,
    #[serde(rename = "rightClick")]
    pub right_click: bool,
}

impl MotionSample {
    pub fn new(gyro_x: f64, gyro_y: f64) -> Self {
        Self {
            gyro_x,
            gyro_y,
            ..Default::default()
        }
    }

    pub fn from_json_line(line: &str) -> Result<Self> {
        Ok(serde_json::from_str(line)?)
    }
}

/// Stateful reading-to-delta filter
#[derive(Debug, Clone, PartialEq)]
pub struct MotionFilter {
    config: MotionConfig,
    last_dx: f64,
    last_dy: f64,
}

impl Default for MotionFilter {
    fn default() -> Self {
        Self::new(MotionConfig::default())
    }
}

impl MotionFilter {
    pub fn new(config: MotionConfig) -> Self {
        Self {
            config,
            last_dx: 0.0,
            last_dy: 0.0,
        }
    }

    pub fn config(&self) -> &MotionConfig {
        &self.config
    }

    pub fn set_sensitivity(&mut self, sensitivity: f64) -> Result<()> {
        if sensitivity.is_nan() || sensitivity <= 0.0 {
            return Err(MouseControlError::Config(format!(
                "sensitivity must be > 0, got {}",
                sensitivity
            )));
        }
        self.config.sensitivity = sensitivity;
        Ok(())
    }

    pub fn set_smoothing(&mut self, smoothing: f64) -> Result<()> {
        if !(0.0..=1.0).contains(&smoothing) {
            return Err(MouseControlError::Config(format!(
                "smoothing must be between 0 and 1, got {}",
                smoothing
            )));
        }
        self.config.smoothing = smoothing;
        Ok(())
    }

    pub fn set_dead_zone(&mut self, dead_zone: f64) -> Result<()> {
        if dead_zone.is_nan() || dead_zone < 0.0 {
            return Err(MouseControlError::Config(format!(
                "dead zone must be >= 0, got {}",
                dead_zone
            )));
        }
        self.config.dead_zone = dead_zone;
        Ok(())
    }

    pub fn set_calibration(&mut self, offset_x: f64, offset_y: f64) {
        self.config.calibration_x = offset_x;
        self.config.calibration_y = offset_y;
    }

    pub fn set_invert_y(&mut self, invert_y: bool) {
        self.config.invert_y = invert_y;
    }

    /// Forget smoothing history, e.g. after recalibrating
    pub fn reset_smoothing(&mut self) {
        self.last_dx = 0.0;
        self.last_dy = 0.0;
    }

    /// Pixel delta for one reading
    pub fn process(&mut self, sample: &MotionSample) -> (i32, i32) {
        let cfg = &self.config;
        let dead = |v: f64| if v.abs() < cfg.dead_zone { 0.0 } else { v };

        let gx = dead(sample.gyro_x - cfg.calibration_x);
        let gy = dead(sample.gyro_y - cfg.calibration_y);

        let raw_dx = gx * cfg.sensitivity;
        let mut raw_dy = gy * cfg.sensitivity;
        if cfg.invert_y {
            raw_dy = -raw_dy;
        }

        let a = cfg.smoothing;
        let dx = self.last_dx * (1.0 - a) + raw_dx * a;
        let dy = self.last_dy * (1.0 - a) + raw_dy * a;
        self.last_dx = dx;
        self.last_dy = dy;

        (dx.round() as i32, dy.round() as i32)
    }
}

/// Counters for a relay run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RelayStats {
    pub samples: usize,
    /// Lines that could not be parsed and were skipped
    pub rejected: usize,
    pub moves: usize,
    pub clicks: usize,
}

/// Applies filtered motion to a driver
#[derive(Debug)]
pub struct MotionRelay {
    driver: SharedDriver,
    filter: MotionFilter,
    bounds: ScreenBounds,
    position: Point,
    stats: RelayStats,
}

impl MotionRelay {
    /// Relay starting at the centre of the screen
    pub fn new(driver: SharedDriver, filter: MotionFilter, bounds: ScreenBounds) -> Self {
        let centre = Point::new((bounds.width / 2) as i32, (bounds.height / 2) as i32);
        Self {
            driver,
            filter,
            bounds,
            position: bounds.clamp(centre),
            stats: RelayStats::default(),
        }
    }

    pub fn with_position(mut self, position: Point) -> Self {
        self.position = self.bounds.clamp(position);
        self
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn stats(&self) -> RelayStats {
        self.stats
    }

    /// Filter one reading and emit the resulting move and clicks
    pub fn handle(&mut self, sample: &MotionSample) -> Result<()> {
        self.stats.samples += 1;
        let (dx, dy) = self.filter.process(sample);

        if dx != 0 || dy != 0 {
            let next = self.bounds.clamp(self.position.offset(dx, dy));
            if next != self.position {
                self.driver.emit_move(next)?;
                self.position = next;
                self.stats.moves += 1;
                tracing::trace!("Relayed move ({:+}, {:+}) to {}", dx, dy, next);
            }
        }

        if sample.left_click {
            self.click(MouseButton::Left)?;
        }
        if sample.right_click {
            self.click(MouseButton::Right)?;
        }
        Ok(())
    }

    fn click(&mut self, button: MouseButton) -> Result<()> {
        self.driver.emit_button(button, true)?;
        self.driver.emit_button(button, false)?;
        self.stats.clicks += 1;
        tracing::debug!("Relayed {} click at {}", button, self.position);
        Ok(())
    }

    /// Consume JSON lines until end of input
    ///
    /// Malformed lines are logged and skipped; driver and read errors stop
    /// the relay.
    pub fn run<R: BufRead>(&mut self, reader: R) -> Result<RelayStats> {
        for line in reader.lines() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match MotionSample::from_json_line(line) {
                Ok(sample) => self.handle(&sample)?,
                Err(e) => {
                    self.stats.rejected += 1;
                    tracing::warn!("Skipping invalid motion line {:?}: {}", line, e);
                }
            }
        }
        tracing::info!(
            "Relay finished: {} samples, {} moves, {} clicks, {} rejected",
            self.stats.samples,
            self.stats.moves,
            self.stats.clicks,
            self.stats.rejected
        );
        Ok(self.stats)
    }
}
