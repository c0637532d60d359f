//! Pacing, cancellation and pause behaviour of the event scheduler
//!
//! All tests run on a virtual clock, so timing assertions are exact.

mod common;

use common::builders::MoveStepBuilder;
use common::mock_helpers::LatencyDriver;
use mousecontrol::driver::{PlaybackDriver, RecordingDriver};
use mousecontrol::scheduler::{Clock, EventScheduler, ManualClock, PlaybackControl};
use mousecontrol::{MouseButton, Point, Result, TrajectoryGenerator};
use proptest::prelude::*;
use std::sync::Arc;
use std::time::Duration;

const FRAME: Duration = Duration::from_millis(8);

fn thousand_samples() -> mousecontrol::Trajectory {
    // 999 samples below 7992ms plus the final one
    let step = MoveStepBuilder::new()
        .from(0, 500)
        .to(1500, 500)
        .duration_ms(7992)
        .build();
    let trajectory = TrajectoryGenerator::default().generate(&step).unwrap();
    assert_eq!(trajectory.len(), 1000);
    trajectory
}

#[test]
fn test_variable_latency_does_not_accumulate() {
    let clock = Arc::new(ManualClock::new());
    let scheduler = EventScheduler::with_clock(clock.clone());
    let trajectory = thousand_samples();

    // Mostly cheap calls with a 15ms stall every tenth call
    let mut driver = LatencyDriver::new(clock.clone(), |i| {
        if i % 10 == 0 {
            Duration::from_millis(15)
        } else {
            Duration::from_millis((i % 5) as u64)
        }
    });

    let start = clock.now();
    let outcome = scheduler.play(&trajectory, &mut driver, start).unwrap();
    assert_eq!(outcome.stats().emitted, 1000);

    for (sample, at) in trajectory.iter().zip(&driver.calls) {
        let ideal = start + Duration::from_millis(sample.offset_ms);
        assert!(*at >= ideal, "emitted early at offset {}", sample.offset_ms);
    }

    let last_ideal = start + Duration::from_millis(trajectory.duration_ms());
    let last_actual = *driver.calls.last().unwrap();
    assert!(last_actual - last_ideal <= FRAME);
    assert!(outcome.stats().max_lateness <= Duration::from_millis(15));
}

#[test]
fn test_pause_shifts_remaining_targets() {
    struct PausingDriver {
        inner: RecordingDriver,
        control: Arc<PlaybackControl>,
        calls: usize,
    }
    impl PlaybackDriver for PausingDriver {
        fn emit_move(&mut self, point: Point) -> Result<()> {
            self.inner.emit_move(point)?;
            self.calls += 1;
            if self.calls == 4 {
                self.control.pause();
            }
            Ok(())
        }
        fn emit_button(&mut self, button: MouseButton, pressed: bool) -> Result<()> {
            self.inner.emit_button(button, pressed)
        }
    }

    let clock = Arc::new(ManualClock::new());
    let scheduler = EventScheduler::with_clock(clock.clone());
    let recording = RecordingDriver::with_clock(clock.clone());
    let log = recording.log();
    let mut driver = PausingDriver {
        inner: recording,
        control: scheduler.control().clone(),
        calls: 0,
    };

    let resumer = {
        let clock = clock.clone();
        let control = scheduler.control().clone();
        std::thread::spawn(move || {
            assert!(common::wait_for(|| control.is_paused()));
            std::thread::sleep(Duration::from_millis(20));
            clock.advance(Duration::from_millis(50));
            control.resume()
        })
    };

    let trajectory = TrajectoryGenerator::default()
        .generate(&MoveStepBuilder::new().build())
        .unwrap();
    let outcome = scheduler.play(&trajectory, &mut driver, clock.now()).unwrap();
    assert_eq!(resumer.join().unwrap(), Some(Duration::from_millis(50)));

    assert!(!outcome.is_cancelled());
    let times: Vec<u64> = log.relative_times().iter().map(|d| d.as_millis() as u64).collect();
    let offsets: Vec<u64> = trajectory.iter().map(|s| s.offset_ms).collect();
    assert_eq!(times[..4], offsets[..4]);
    for (time, offset) in times[4..].iter().zip(&offsets[4..]) {
        assert_eq!(*time, offset + 50);
    }
}

#[test]
fn test_pause_spanning_step_boundary_shifts_from_resume() {
    let clock = Arc::new(ManualClock::new());
    let scheduler = EventScheduler::with_clock(clock.clone());
    let control = scheduler.control().clone();
    let generator = TrajectoryGenerator::default();
    let first = generator
        .generate(&MoveStepBuilder::new().duration_ms(40).build())
        .unwrap();
    let second = generator
        .generate(&MoveStepBuilder::new().from(100, 0).to(200, 0).duration_ms(40).build())
        .unwrap();

    let mut driver = RecordingDriver::with_clock(clock.clone());
    let log = driver.log();
    scheduler.play(&first, &mut driver, clock.now()).unwrap();

    // Paused between the two moves, 30ms before the second one starts
    control.pause();
    clock.advance(Duration::from_millis(30));
    let start = clock.now();

    let resumer = {
        let clock = clock.clone();
        let control = control.clone();
        std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(20));
            clock.advance(Duration::from_millis(100));
            let resumed_at = clock.now();
            control.resume();
            resumed_at
        })
    };
    scheduler.play(&second, &mut driver, start).unwrap();
    let resumed_at = resumer.join().unwrap();

    let events = log.events();
    let second_times: Vec<Duration> = events[first.len()..]
        .iter()
        .map(|e| e.at - resumed_at)
        .collect();
    let offsets: Vec<Duration> = second
        .iter()
        .map(|s| Duration::from_millis(s.offset_ms))
        .collect();
    assert_eq!(second_times, offsets);
}

/// Cancels the shared control from inside its `n`th call
struct CancellingDriver {
    clock: Arc<ManualClock>,
    control: Arc<PlaybackControl>,
    cancel_on: usize,
    calls: usize,
    cancelled_at: Option<Duration>,
}

impl PlaybackDriver for CancellingDriver {
    fn emit_move(&mut self, _point: Point) -> Result<()> {
        self.calls += 1;
        if self.calls == self.cancel_on {
            self.cancelled_at = Some(self.clock.elapsed());
            self.control.cancel();
        }
        Ok(())
    }

    fn emit_button(&mut self, _button: MouseButton, _pressed: bool) -> Result<()> {
        Ok(())
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn cancelled_playback_emits_only_elapsed_samples(
        duration in 16u64..2000,
        fraction in 0.0f64..1.0,
    ) {
        let clock = Arc::new(ManualClock::new());
        let scheduler = EventScheduler::with_clock(clock.clone());
        let trajectory = TrajectoryGenerator::default()
            .generate(&MoveStepBuilder::new().duration_ms(duration).build())
            .unwrap();
        let cancel_on = 1 + ((trajectory.len() - 1) as f64 * fraction) as usize;

        let mut driver = CancellingDriver {
            clock: clock.clone(),
            control: scheduler.control().clone(),
            cancel_on,
            calls: 0,
            cancelled_at: None,
        };
        let start = clock.now();
        let outcome = scheduler.play(&trajectory, &mut driver, start).unwrap();

        let cancelled_at = driver.cancelled_at.unwrap();
        let elapsed_targets = trajectory
            .iter()
            .filter(|s| Duration::from_millis(s.offset_ms) <= cancelled_at)
            .count();

        prop_assert_eq!(driver.calls, cancel_on);
        prop_assert_eq!(outcome.stats().emitted, elapsed_targets);
        if cancel_on < trajectory.len() {
            prop_assert!(outcome.is_cancelled());
        }
    }
}
