//! Script model and JSON loading
//!
//! A script is an ordered list of move, click and text descriptors:
//!
//! ```json
//! {
//!   "name": "open menu",
//!   "initial_position": { "x": 10, "y": 10 },
//!   "steps": [
//!     { "type": "move", "to": { "x": 400, "y": 300 }, "duration_ms": 350,
//!       "easing": "bezier_human", "jitter": 0.15, "seed": 7 },
//!     { "type": "click", "at": { "x": 400, "y": 300 }, "button": "left", "hold_ms": 60 },
//!     { "type": "text", "text": "hello" }
//!   ]
//! }
//! ```
//!
//! A move may omit `from`; it then starts wherever the previous step left
//! the cursor. Durations are signed in the descriptor so that a negative
//! value is reported as an invalid step rather than a parse error.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::config::PlaybackConfig;
use crate::error::{MouseControlError, Result, ResultExt};
use crate::types::{
    ClickStep, EasingKind, MouseButton, MoveStep, Point, ScreenBounds, Step, TextStep,
};

/// Move descriptor as written in a script
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveDescriptor {
    /// Start point; defaults to the last known cursor position
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<Point>,
    pub to: Point,
    pub duration_ms: i64,
    #[serde(default)]
    pub easing: EasingKind,
    #[serde(default)]
    pub jitter: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl MoveDescriptor {
    /// Resolve into a [`MoveStep`], filling a missing start from `last_position`
    pub fn resolve(&self, last_position: Option<Point>) -> Result<MoveStep> {
        if self.duration_ms < 0 {
            return Err(MouseControlError::invalid_step(format!(
                "move duration must be >= 0, got {}ms",
                self.duration_ms
            )));
        }
        let start = self.from.or(last_position).ok_or_else(|| {
            MouseControlError::invalid_step(
                "move has no start point and the cursor position is unknown",
            )
        })?;

        Ok(MoveStep {
            start,
            end: self.to,
            duration_ms: self.duration_ms as u64,
            easing: self.easing,
            jitter: self.jitter,
            seed: self.seed,
        })
    }
}

/// Click descriptor as written in a script
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClickDescriptor {
    pub at: Point,
    #[serde(default)]
    pub button: MouseButton,
    #[serde(default)]
    pub hold_ms: i64,
}

impl ClickDescriptor {
    pub fn resolve(&self) -> Result<ClickStep> {
        if self.hold_ms < 0 {
            return Err(MouseControlError::invalid_step(format!(
                "click hold must be >= 0, got {}ms",
                self.hold_ms
            )));
        }
        Ok(ClickStep::new(self.at, self.button, self.hold_ms as u64))
    }
}

/// Text descriptor as written in a script
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextDescriptor {
    pub text: String,
}

/// One scripted instruction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScriptStep {
    Move(MoveDescriptor),
    Click(ClickDescriptor),
    Text(TextDescriptor),
}

impl ScriptStep {
    pub fn kind(&self) -> &'static str {
        match self {
            ScriptStep::Move(_) => "move",
            ScriptStep::Click(_) => "click",
            ScriptStep::Text(_) => "text",
        }
    }

    /// Resolve and validate against the screen
    pub fn resolve(&self, last_position: Option<Point>, bounds: &ScreenBounds) -> Result<Step> {
        match self {
            ScriptStep::Move(descriptor) => {
                let step = descriptor.resolve(last_position)?;
                step.validate(bounds)?;
                Ok(Step::Move(step))
            }
            ScriptStep::Click(descriptor) => {
                let step = descriptor.resolve()?;
                step.validate(bounds)?;
                Ok(Step::Click(step))
            }
            ScriptStep::Text(descriptor) => Ok(Step::Text(TextStep::new(descriptor.text.clone()))),
        }
    }
}

impl From<Step> for ScriptStep {
    fn from(step: Step) -> Self {
        match step {
            Step::Move(m) => ScriptStep::Move(MoveDescriptor {
                from: Some(m.start),
                to: m.end,
                duration_ms: m.duration_ms.min(i64::MAX as u64) as i64,
                easing: m.easing,
                jitter: m.jitter,
                seed: m.seed,
            }),
            Step::Click(c) => ScriptStep::Click(ClickDescriptor {
                at: c.point,
                button: c.button,
                hold_ms: c.hold_ms.min(i64::MAX as u64) as i64,
            }),
            Step::Text(t) => ScriptStep::Text(TextDescriptor { text: t.text }),
        }
    }
}

/// A parsed script
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Script {
    #[serde(default)]
    pub name: String,
    /// Cursor position assumed before the first step
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_position: Option<Point>,
    pub steps: Vec<ScriptStep>,
}

impl Script {
    pub fn new(name: impl Into<String>, steps: Vec<ScriptStep>) -> Self {
        Self {
            name: name.into(),
            initial_position: None,
            steps,
        }
    }

    pub fn with_initial_position(mut self, position: Point) -> Self {
        self.initial_position = Some(position);
        self
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        serde_json::from_str(content)
            .map_err(|e| MouseControlError::Script(format!("Failed to parse script: {}", e)))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(MouseControlError::from)
            .with_context(|| format!("Failed to read script {}", path.display()))?;
        let mut script = Self::from_json_str(&content)?;
        if script.name.is_empty() {
            script.name = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
        }
        Ok(script)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Resolve every step without emitting anything
    ///
    /// Start points are chained the way a session plays the script: a click
    /// only moves the tracked cursor when `position_before_click` is set.
    /// Fails on the first invalid step, naming its index.
    pub fn resolve_all(&self, config: &PlaybackConfig) -> Result<Vec<Step>> {
        let mut last_position = self.initial_position;
        let mut resolved = Vec::with_capacity(self.steps.len());

        for (index, step) in self.steps.iter().enumerate() {
            let step = step
                .resolve(last_position, &config.screen)
                .with_context(|| format!("Step {} ({})", index, step.kind()))?;
            match &step {
                Step::Move(m) => last_position = Some(m.end),
                Step::Click(c) if config.position_before_click => last_position = Some(c.point),
                Step::Click(_) | Step::Text(_) => {}
            }
            resolved.push(step);
        }
        Ok(resolved)
    }

    /// Sum of move durations and click holds in milliseconds
    pub fn nominal_duration_ms(&self) -> u64 {
        self.steps
            .iter()
            .map(|step| match step {
                ScriptStep::Move(m) => m.duration_ms.max(0) as u64,
                ScriptStep::Click(c) => c.hold_ms.max(0) as u64,
                ScriptStep::Text(_) => 0,
            })
            .fold(0u64, u64::saturating_add)
    }
}
