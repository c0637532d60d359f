//! Mock driver helpers

use mousecontrol::driver::PlaybackDriver;
use mousecontrol::scheduler::{Clock, ManualClock};
use mousecontrol::{MouseButton, MouseControlError, Point, Result};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Driver whose calls take virtual time, recording when each call began
pub struct LatencyDriver {
    clock: Arc<ManualClock>,
    latency: Box<dyn FnMut(usize) -> Duration + Send>,
    pub calls: Vec<Instant>,
}

impl LatencyDriver {
    pub fn new(clock: Arc<ManualClock>, latency: impl FnMut(usize) -> Duration + Send + 'static) -> Self {
        Self {
            clock,
            latency: Box::new(latency),
            calls: Vec::new(),
        }
    }

    fn call(&mut self) {
        let index = self.calls.len();
        self.calls.push(self.clock.now());
        let cost = (self.latency)(index);
        self.clock.advance(cost);
    }
}

impl PlaybackDriver for LatencyDriver {
    fn emit_move(&mut self, _point: Point) -> Result<()> {
        self.call();
        Ok(())
    }

    fn emit_button(&mut self, _button: MouseButton, _pressed: bool) -> Result<()> {
        self.call();
        Ok(())
    }
}

/// Driver that fails if two calls ever overlap
#[derive(Clone, Default)]
pub struct OverlapDetector {
    in_flight: Arc<AtomicBool>,
    pub calls: Arc<AtomicUsize>,
    pub overlaps: Arc<AtomicUsize>,
}

impl OverlapDetector {
    fn call(&self) -> Result<()> {
        if self.in_flight.swap(true, Ordering::SeqCst) {
            self.overlaps.fetch_add(1, Ordering::SeqCst);
        }
        std::thread::sleep(Duration::from_micros(200));
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.in_flight.store(false, Ordering::SeqCst);
        Ok(())
    }
}

impl PlaybackDriver for OverlapDetector {
    fn emit_move(&mut self, _point: Point) -> Result<()> {
        self.call()
    }

    fn emit_button(&mut self, _button: MouseButton, _pressed: bool) -> Result<()> {
        self.call()
    }
}

/// Driver that fails on call number `fail_at` (zero-based)
pub struct FailingDriver {
    pub calls: usize,
    fail_at: usize,
}

impl FailingDriver {
    pub fn new(fail_at: usize) -> Self {
        Self { calls: 0, fail_at }
    }

    fn call(&mut self) -> Result<()> {
        let index = self.calls;
        self.calls += 1;
        if index == self.fail_at {
            Err(MouseControlError::Driver(format!("injected failure at call {}", index)))
        } else {
            Ok(())
        }
    }
}

impl PlaybackDriver for FailingDriver {
    fn emit_move(&mut self, _point: Point) -> Result<()> {
        self.call()
    }

    fn emit_button(&mut self, _button: MouseButton, _pressed: bool) -> Result<()> {
        self.call()
    }
}
