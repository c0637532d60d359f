//! In-memory drivers
//!
//! - [`RecordingDriver`] keeps every call with the time it happened, for
//!   tests and dry-runs.
//! - [`NoopDriver`] only counts calls.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use crate::error::Result;
use crate::scheduler::clock::{Clock, SystemClock};
use crate::types::{MouseButton, Point};

use super::driver_trait::PlaybackDriver;

/// One driver call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriverEvent {
    Move(Point),
    Button { button: MouseButton, pressed: bool },
    Text(String),
}

impl std::fmt::Display for DriverEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DriverEvent::Move(p) => write!(f, "move {}", p),
            DriverEvent::Button { button, pressed } => {
                write!(f, "{} {}", button, if *pressed { "down" } else { "up" })
            }
            DriverEvent::Text(text) => write!(f, "type {:?}", text),
        }
    }
}

/// A driver call and when it arrived
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedEvent {
    pub event: DriverEvent,
    pub at: Instant,
}

/// Shared handle to the events captured by a [`RecordingDriver`]
///
/// Stays readable after the driver has been handed to a session.
#[derive(Debug, Clone, Default)]
pub struct RecordingLog {
    events: Arc<Mutex<Vec<RecordedEvent>>>,
}

impl RecordingLog {
    fn lock(&self) -> MutexGuard<'_, Vec<RecordedEvent>> {
        self.events.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn push(&self, event: RecordedEvent) {
        self.lock().push(event);
    }

    /// Snapshot of every recorded event
    pub fn events(&self) -> Vec<RecordedEvent> {
        self.lock().clone()
    }

    /// Recorded calls without timestamps
    pub fn calls(&self) -> Vec<DriverEvent> {
        self.lock().iter().map(|e| e.event.clone()).collect()
    }

    /// Positions of every recorded move
    pub fn moves(&self) -> Vec<Point> {
        self.lock()
            .iter()
            .filter_map(|e| match e.event {
                DriverEvent::Move(p) => Some(p),
                _ => None,
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Time of each event relative to the first one
    pub fn relative_times(&self) -> Vec<Duration> {
        let events = self.lock();
        let Some(first) = events.first().map(|e| e.at) else {
            return Vec::new();
        };
        events.iter().map(|e| e.at.duration_since(first)).collect()
    }
}

/// Driver that records every call
pub struct RecordingDriver {
    log: RecordingLog,
    clock: Arc<dyn Clock>,
}

impl RecordingDriver {
    /// Record with wall-clock timestamps
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Record with timestamps from the given clock
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            log: RecordingLog::default(),
            clock,
        }
    }

    /// Handle to the captured events
    pub fn log(&self) -> RecordingLog {
        self.log.clone()
    }
}

impl Default for RecordingDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl PlaybackDriver for RecordingDriver {
    fn emit_move(&mut self, point: Point) -> Result<()> {
        self.log.push(RecordedEvent {
            event: DriverEvent::Move(point),
            at: self.clock.now(),
        });
        Ok(())
    }

    fn emit_button(&mut self, button: MouseButton, pressed: bool) -> Result<()> {
        self.log.push(RecordedEvent {
            event: DriverEvent::Button { button, pressed },
            at: self.clock.now(),
        });
        Ok(())
    }

    fn emit_text(&mut self, text: &str) -> Result<()> {
        self.log.push(RecordedEvent {
            event: DriverEvent::Text(text.to_string()),
            at: self.clock.now(),
        });
        Ok(())
    }
}

/// Driver that discards every call
#[derive(Debug, Default)]
pub struct NoopDriver {
    calls: Arc<AtomicU64>,
}

impl NoopDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared counter of calls received
    pub fn call_counter(&self) -> Arc<AtomicU64> {
        self.calls.clone()
    }
}

impl PlaybackDriver for NoopDriver {
    fn emit_move(&mut self, _point: Point) -> Result<()> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn emit_button(&mut self, _button: MouseButton, _pressed: bool) -> Result<()> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn emit_text(&mut self, _text: &str) -> Result<()> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}
