//! Trajectory generation
//!
//! Expands a [`MoveStep`] into a [`Trajectory`]: one [`TimedSample`] per
//! frame interval plus a final sample at exactly the move's duration.
//!
//! # Shape
//!
//! - [`EasingKind::Linear`] and [`EasingKind::EaseInOut`] follow the straight
//!   segment from start to end.
//! - [`EasingKind::BezierHuman`] follows a cubic Bezier bowed sideways by up
//!   to `jitter * distance`, with smoothstep speed.
//!
//! On top of the path, each interior sample receives Gaussian noise with a
//! standard deviation of `jitter * noise_scale_px`. After rounding to whole
//! pixels, progress along the start-to-end direction never decreases from
//! one sample to the next and never passes the end point. A sample that
//! would break this is projected back into range, and if rounding still
//! leaves it out of range it repeats its predecessor's position.
//!
//! # Reproducibility
//!
//! A step carrying a seed always expands to the same trajectory. Without a
//! seed, randomness comes from the OS.

mod path;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;

use crate::config::PlaybackConfig;
use crate::error::Result;
use crate::types::{MoveStep, Point, ScreenBounds, TimedSample, Trajectory};

use path::{round_point, MovePath};

/// Turns move steps into time-stamped trajectories
#[derive(Debug, Clone)]
pub struct TrajectoryGenerator {
    frame_interval_ms: u64,
    bounds: ScreenBounds,
    noise_scale_px: f64,
}

impl TrajectoryGenerator {
    pub fn new(config: &PlaybackConfig) -> Self {
        Self {
            frame_interval_ms: config.frame_interval_ms.max(1),
            bounds: config.screen,
            noise_scale_px: config.noise_scale_px,
        }
    }

    pub fn frame_interval_ms(&self) -> u64 {
        self.frame_interval_ms
    }

    pub fn bounds(&self) -> &ScreenBounds {
        &self.bounds
    }

    /// Sample offsets for a move of `duration_ms`: every frame interval
    /// below the duration, then the duration itself.
    pub fn sample_offsets(&self, duration_ms: u64) -> Vec<u64> {
        if duration_ms == 0 {
            return vec![0];
        }
        let mut offsets: Vec<u64> = (0..duration_ms)
            .step_by(self.frame_interval_ms as usize)
            .collect();
        offsets.push(duration_ms);
        offsets
    }

    /// Expand a move step into a trajectory
    ///
    /// Fails with [`crate::MouseControlError::InvalidStep`] for negative or
    /// non-finite jitter and for endpoints outside the screen.
    pub fn generate(&self, step: &MoveStep) -> Result<Trajectory> {
        step.validate(&self.bounds)?;

        if step.duration_ms == 0 {
            return Ok(Trajectory::from_samples(vec![TimedSample {
                position: step.end,
                offset_ms: 0,
            }]));
        }

        if step.start == step.end {
            return Ok(Trajectory::from_samples(vec![
                TimedSample {
                    position: step.start,
                    offset_ms: 0,
                },
                TimedSample {
                    position: step.start,
                    offset_ms: step.duration_ms,
                },
            ]));
        }

        let mut rng = match step.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let path = MovePath::new(step.start, step.end, step.easing, step.jitter, &mut rng);
        let sigma = step.jitter * self.noise_scale_px;
        let offsets = self.sample_offsets(step.duration_ms);
        let last = offsets.len() - 1;
        let duration = step.duration_ms as f64;

        let mut samples: Vec<TimedSample> = Vec::with_capacity(offsets.len());
        let limit = path.along(step.end);
        let mut prev = step.start;
        let mut prev_along = 0.0;

        for (i, &offset_ms) in offsets.iter().enumerate() {
            let position = if i == 0 {
                step.start
            } else if i == last {
                step.end
            } else {
                let progress = step.easing.progress(offset_ms as f64 / duration);
                let (mut x, mut y) = path.point_at(progress);
                if sigma > 0.0 {
                    x += rng.sample::<f64, _>(StandardNormal) * sigma;
                    y += rng.sample::<f64, _>(StandardNormal) * sigma;
                }
                let candidate = self.bounds.clamp(round_point((x, y)));
                self.keep_progress(&path, candidate, prev, prev_along, limit)
            };

            prev = position;
            prev_along = path.along(position);
            samples.push(TimedSample {
                position,
                offset_ms,
            });
        }

        tracing::trace!(
            "Generated {} samples from {} to {} over {}ms",
            samples.len(),
            step.start,
            step.end,
            step.duration_ms
        );

        Ok(Trajectory::from_samples(samples))
    }
}

impl TrajectoryGenerator {
    /// Bring `candidate` within `[prev_along, limit]` along the path
    fn keep_progress(
        &self,
        path: &MovePath,
        candidate: Point,
        prev: Point,
        prev_along: f64,
        limit: f64,
    ) -> Point {
        let in_range = |p: Point| {
            let along = path.along(p);
            along >= prev_along && along <= limit
        };
        if in_range(candidate) {
            return candidate;
        }

        let along = path.along(candidate).clamp(prev_along, limit);
        let projected = self
            .bounds
            .clamp(round_point(path.with_along(candidate, along)));
        if in_range(projected) {
            projected
        } else {
            prev
        }
    }
}

impl Default for TrajectoryGenerator {
    fn default() -> Self {
        Self::new(&PlaybackConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::EasingKind;

    fn generator() -> TrajectoryGenerator {
        TrajectoryGenerator::default()
    }

    #[test]
    fn test_linear_horizontal_move() {
        let step = MoveStep::new(Point::new(0, 0), Point::new(100, 0), 100);
        let trajectory = generator().generate(&step).unwrap();

        let offsets: Vec<u64> = trajectory.iter().map(|s| s.offset_ms).collect();
        let mut expected: Vec<u64> = (0..=96).step_by(8).collect();
        expected.push(100);
        assert_eq!(offsets, expected);

        let xs: Vec<i32> = trajectory.iter().map(|s| s.position.x).collect();
        assert!(xs.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(xs.first(), Some(&0));
        assert_eq!(xs.last(), Some(&100));
        assert!(trajectory.iter().all(|s| s.position.y == 0));
    }

    #[test]
    fn test_linear_midpoint() {
        let step = MoveStep::new(Point::new(10, 20), Point::new(110, 220), 96);
        let trajectory = generator().generate(&step).unwrap();
        let mid = trajectory.iter().find(|s| s.offset_ms == 48).unwrap();
        assert!((mid.position.x - 60).abs() <= 1);
        assert!((mid.position.y - 120).abs() <= 1);
    }

    #[test]
    fn test_zero_duration_single_sample() {
        let step = MoveStep::new(Point::new(5, 5), Point::new(50, 50), 0);
        let trajectory = generator().generate(&step).unwrap();
        assert_eq!(trajectory.len(), 1);
        assert_eq!(trajectory.samples()[0].offset_ms, 0);
        assert_eq!(trajectory.samples()[0].position, Point::new(50, 50));
    }

    #[test]
    fn test_hold_trajectory() {
        let step = MoveStep::new(Point::new(30, 40), Point::new(30, 40), 250).with_jitter(0.8);
        let trajectory = generator().generate(&step).unwrap();
        assert_eq!(trajectory.len(), 2);
        assert_eq!(trajectory.samples()[0].offset_ms, 0);
        assert_eq!(trajectory.samples()[1].offset_ms, 250);
        assert!(trajectory.iter().all(|s| s.position == Point::new(30, 40)));
    }

    #[test]
    fn test_short_move_has_two_samples() {
        let step = MoveStep::new(Point::new(0, 0), Point::new(10, 10), 5);
        let trajectory = generator().generate(&step).unwrap();
        let offsets: Vec<u64> = trajectory.iter().map(|s| s.offset_ms).collect();
        assert_eq!(offsets, vec![0, 5]);
    }

    #[test]
    fn test_seeded_generation_is_reproducible() {
        let step = MoveStep::new(Point::new(100, 100), Point::new(900, 600), 400)
            .with_easing(EasingKind::BezierHuman)
            .with_jitter(0.2)
            .with_seed(42);
        let a = generator().generate(&step).unwrap();
        let b = generator().generate(&step).unwrap();
        assert_eq!(a, b);

        let other_seed = generator().generate(&step.clone().with_seed(43)).unwrap();
        assert_ne!(a, other_seed);
    }

    #[test]
    fn test_noisy_progress_never_goes_backward() {
        let step = MoveStep::new(Point::new(0, 500), Point::new(40, 500), 800)
            .with_easing(EasingKind::EaseInOut)
            .with_jitter(3.0)
            .with_seed(5);
        let trajectory = generator().generate(&step).unwrap();
        let xs: Vec<i32> = trajectory.iter().map(|s| s.position.x).collect();
        assert!(xs.windows(2).all(|w| w[1] >= w[0]), "{:?}", xs);
        assert_eq!(trajectory.last().unwrap().position, Point::new(40, 500));
    }

    #[test]
    fn test_diagonal_jitter_keeps_progress() {
        let start = Point::new(100, 100);
        let end = Point::new(137, 171);
        let (dx, dy) = ((end.x - start.x) as f64, (end.y - start.y) as f64);
        let length = (dx * dx + dy * dy).sqrt();
        let along = |p: Point| ((p.x - start.x) as f64 * dx + (p.y - start.y) as f64 * dy) / length;

        for seed in 0..300 {
            let step = MoveStep::new(start, end, 600)
                .with_easing(EasingKind::EaseInOut)
                .with_jitter(2.0)
                .with_seed(seed);
            let trajectory = generator().generate(&step).unwrap();
            let progress: Vec<f64> = trajectory.iter().map(|s| along(s.position)).collect();
            assert!(
                progress.windows(2).all(|w| w[1] >= w[0] - 1e-9),
                "seed {}: {:?}",
                seed,
                progress
            );
            assert_eq!(trajectory.last().unwrap().position, end);
        }
    }

    #[test]
    fn test_samples_stay_on_screen() {
        let step = MoveStep::new(Point::new(0, 0), Point::new(1919, 0), 300)
            .with_easing(EasingKind::BezierHuman)
            .with_jitter(1.0)
            .with_seed(11);
        let generator = generator();
        let trajectory = generator.generate(&step).unwrap();
        assert!(trajectory.iter().all(|s| generator.bounds().contains(s.position)));
    }

    #[test]
    fn test_overlong_duration_rejected() {
        let step = MoveStep::new(Point::new(0, 0), Point::new(10, 10), i64::MAX as u64);
        assert!(generator().generate(&step).unwrap_err().is_invalid_step());
    }

    #[test]
    fn test_invalid_steps_rejected() {
        let generator = generator();
        let negative_jitter =
            MoveStep::new(Point::new(0, 0), Point::new(10, 10), 100).with_jitter(-1.0);
        assert!(generator.generate(&negative_jitter).unwrap_err().is_invalid_step());

        let off_screen = MoveStep::new(Point::new(-1, 0), Point::new(10, 10), 100);
        assert!(generator.generate(&off_screen).unwrap_err().is_invalid_step());
    }
}
