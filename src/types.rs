//! Core data types for mousecontrol
//!
//! This module contains the fundamental data structures shared by the
//! trajectory generator, the event scheduler and the session controller.
//!
//! # Main Types
//!
//! - [`Point`] - Integer screen coordinate
//! - [`ScreenBounds`] - The rectangle every emitted point must lie in
//! - [`MoveStep`] / [`ClickStep`] / [`Step`] - Resolved script instructions
//! - [`EasingKind`] - Speed profile of a move
//! - [`TimedSample`] / [`Trajectory`] - Expanded, time-stamped positions

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{MouseControlError, Result};

/// An (x, y) screen coordinate in pixels
///
/// Stored signed so that negative input survives parsing and can be
/// rejected by [`ScreenBounds::check`] with a useful message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point
    pub fn distance_to(&self, other: Point) -> f64 {
        let dx = (other.x - self.x) as f64;
        let dy = (other.y - self.y) as f64;
        (dx * dx + dy * dy).sqrt()
    }

    /// Offset by a relative delta
    pub fn offset(&self, dx: i32, dy: i32) -> Point {
        Point::new(self.x.saturating_add(dx), self.y.saturating_add(dy))
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl From<(i32, i32)> for Point {
    fn from((x, y): (i32, i32)) -> Self {
        Point::new(x, y)
    }
}

/// The screen rectangle `[0, width) x [0, height)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenBounds {
    pub width: u32,
    pub height: u32,
}

impl Default for ScreenBounds {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
        }
    }
}

impl ScreenBounds {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Check if a point lies on the screen
    pub fn contains(&self, point: Point) -> bool {
        point.x >= 0
            && point.y >= 0
            && (point.x as i64) < self.width as i64
            && (point.y as i64) < self.height as i64
    }

    /// Validate a point, naming it in the error message
    pub fn check(&self, point: Point, what: &str) -> Result<()> {
        if self.contains(point) {
            Ok(())
        } else {
            Err(MouseControlError::invalid_step(format!(
                "{} {} is outside the {}x{} screen",
                what, point, self.width, self.height
            )))
        }
    }

    /// Clamp a point onto the screen
    pub fn clamp(&self, point: Point) -> Point {
        let max_x = self.width.saturating_sub(1).min(i32::MAX as u32) as i32;
        let max_y = self.height.saturating_sub(1).min(i32::MAX as u32) as i32;
        Point::new(point.x.clamp(0, max_x), point.y.clamp(0, max_y))
    }
}

/// Pointer button
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MouseButton {
    #[default]
    Left,
    Right,
    Middle,
}

impl fmt::Display for MouseButton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MouseButton::Left => write!(f, "left"),
            MouseButton::Right => write!(f, "right"),
            MouseButton::Middle => write!(f, "middle"),
        }
    }
}

/// Speed profile of a move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EasingKind {
    /// Constant speed
    #[default]
    Linear,
    /// Cubic smoothstep: slow start, slow finish
    EaseInOut,
    /// Curved Bezier path with smoothstep speed
    BezierHuman,
}

impl EasingKind {
    /// Map normalized time `t` in `[0, 1]` to normalized progress
    pub fn progress(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            EasingKind::Linear => t,
            EasingKind::EaseInOut | EasingKind::BezierHuman => t * t * (3.0 - 2.0 * t),
        }
    }
}

/// Longest move duration or click hold a step may declare (one hour)
pub const MAX_STEP_DURATION_MS: u64 = 60 * 60 * 1000;

fn check_duration(duration_ms: u64, what: &str) -> Result<()> {
    if duration_ms > MAX_STEP_DURATION_MS {
        return Err(MouseControlError::invalid_step(format!(
            "{} of {}ms exceeds the {}ms limit",
            what, duration_ms, MAX_STEP_DURATION_MS
        )));
    }
    Ok(())
}

/// A fully resolved move instruction
#[derive(Debug, Clone, PartialEq)]
pub struct MoveStep {
    pub start: Point,
    pub end: Point,
    pub duration_ms: u64,
    pub easing: EasingKind,
    /// Randomness amount, `>= 0`. Zero yields a deterministic path.
    pub jitter: f64,
    /// Seed for reproducible jitter
    pub seed: Option<u64>,
}

impl MoveStep {
    /// Create a linear, jitter-free move
    pub fn new(start: Point, end: Point, duration_ms: u64) -> Self {
        Self {
            start,
            end,
            duration_ms,
            easing: EasingKind::Linear,
            jitter: 0.0,
            seed: None,
        }
    }

    pub fn with_easing(mut self, easing: EasingKind) -> Self {
        self.easing = easing;
        self
    }

    pub fn with_jitter(mut self, jitter: f64) -> Self {
        self.jitter = jitter;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Check geometry and randomness parameters against the screen
    pub fn validate(&self, bounds: &ScreenBounds) -> Result<()> {
        if !self.jitter.is_finite() || self.jitter < 0.0 {
            return Err(MouseControlError::invalid_step(format!(
                "jitter must be a finite value >= 0, got {}",
                self.jitter
            )));
        }
        check_duration(self.duration_ms, "move duration")?;
        bounds.check(self.start, "move start")?;
        bounds.check(self.end, "move end")
    }
}

/// A fully resolved click instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClickStep {
    pub point: Point,
    pub button: MouseButton,
    pub hold_ms: u64,
}

impl ClickStep {
    pub fn new(point: Point, button: MouseButton, hold_ms: u64) -> Self {
        Self {
            point,
            button,
            hold_ms,
        }
    }

    pub fn validate(&self, bounds: &ScreenBounds) -> Result<()> {
        check_duration(self.hold_ms, "click hold")?;
        bounds.check(self.point, "click point")
    }
}

/// Text typed through the driver's keyboard, at the current focus
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextStep {
    pub text: String,
}

impl TextStep {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// A single position of a trajectory and when to emit it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimedSample {
    pub position: Point,
    /// Milliseconds since the start of the move
    pub offset_ms: u64,
}

/// The expanded, time-stamped realization of one [`MoveStep`]
///
/// Offsets are strictly increasing, the first is 0 and the last equals the
/// move's duration.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Trajectory {
    samples: Vec<TimedSample>,
}

impl Trajectory {
    pub(crate) fn from_samples(samples: Vec<TimedSample>) -> Self {
        debug_assert!(samples
            .windows(2)
            .all(|pair| pair[0].offset_ms < pair[1].offset_ms));
        Self { samples }
    }

    pub fn samples(&self) -> &[TimedSample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn first(&self) -> Option<&TimedSample> {
        self.samples.first()
    }

    pub fn last(&self) -> Option<&TimedSample> {
        self.samples.last()
    }

    /// Total duration in milliseconds (offset of the last sample)
    pub fn duration_ms(&self) -> u64 {
        self.last().map(|s| s.offset_ms).unwrap_or(0)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TimedSample> {
        self.samples.iter()
    }
}

impl<'a> IntoIterator for &'a Trajectory {
    type Item = &'a TimedSample;
    type IntoIter = std::slice::Iter<'a, TimedSample>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.iter()
    }
}

/// A resolved script step
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    Move(MoveStep),
    Click(ClickStep),
    Text(TextStep),
}

impl Step {
    pub fn kind(&self) -> &'static str {
        match self {
            Step::Move(_) => "move",
            Step::Click(_) => "click",
            Step::Text(_) => "text",
        }
    }
}
