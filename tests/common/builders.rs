//! Test data builders for creating test objects

use mousecontrol::script::{ClickDescriptor, MoveDescriptor, Script, ScriptStep};
use mousecontrol::{EasingKind, MouseButton, MoveStep, Point};

/// Builder for creating test MoveSteps
pub struct MoveStepBuilder {
    start: Point,
    end: Point,
    duration_ms: u64,
    easing: EasingKind,
    jitter: f64,
    seed: Option<u64>,
}

impl MoveStepBuilder {
    pub fn new() -> Self {
        Self {
            start: Point::new(0, 0),
            end: Point::new(100, 0),
            duration_ms: 100,
            easing: EasingKind::Linear,
            jitter: 0.0,
            seed: None,
        }
    }

    pub fn from(mut self, x: i32, y: i32) -> Self {
        self.start = Point::new(x, y);
        self
    }

    pub fn to(mut self, x: i32, y: i32) -> Self {
        self.end = Point::new(x, y);
        self
    }

    pub fn duration_ms(mut self, duration_ms: u64) -> Self {
        self.duration_ms = duration_ms;
        self
    }

    pub fn easing(mut self, easing: EasingKind) -> Self {
        self.easing = easing;
        self
    }

    pub fn jitter(mut self, jitter: f64) -> Self {
        self.jitter = jitter;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn build(self) -> MoveStep {
        let step = MoveStep::new(self.start, self.end, self.duration_ms)
            .with_easing(self.easing)
            .with_jitter(self.jitter);
        match self.seed {
            Some(seed) => step.with_seed(seed),
            None => step,
        }
    }
}

impl Default for MoveStepBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for scripts whose moves chain from the previous position
pub struct ScriptBuilder {
    name: String,
    initial_position: Option<Point>,
    steps: Vec<ScriptStep>,
}

impl ScriptBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            initial_position: Some(Point::new(0, 0)),
            steps: Vec::new(),
        }
    }

    pub fn starting_at(mut self, x: i32, y: i32) -> Self {
        self.initial_position = Some(Point::new(x, y));
        self
    }

    pub fn without_start(mut self) -> Self {
        self.initial_position = None;
        self
    }

    /// Move from wherever the cursor is
    pub fn move_to(mut self, x: i32, y: i32, duration_ms: i64) -> Self {
        self.steps.push(ScriptStep::Move(MoveDescriptor {
            from: None,
            to: Point::new(x, y),
            duration_ms,
            easing: EasingKind::Linear,
            jitter: 0.0,
            seed: None,
        }));
        self
    }

    pub fn click(mut self, x: i32, y: i32, button: MouseButton, hold_ms: i64) -> Self {
        self.steps.push(ScriptStep::Click(ClickDescriptor {
            at: Point::new(x, y),
            button,
            hold_ms,
        }));
        self
    }

    pub fn build(self) -> Script {
        let script = Script::new(self.name, self.steps);
        match self.initial_position {
            Some(position) => script.with_initial_position(position),
            None => script,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_step_builder() {
        let step = MoveStepBuilder::new()
            .from(10, 20)
            .to(30, 40)
            .duration_ms(250)
            .seed(9)
            .build();

        assert_eq!(step.start, Point::new(10, 20));
        assert_eq!(step.end, Point::new(30, 40));
        assert_eq!(step.duration_ms, 250);
        assert_eq!(step.seed, Some(9));
    }
}
