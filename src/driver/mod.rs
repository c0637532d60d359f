//! Playback drivers
//!
//! The driver is the only OS-facing boundary of the crate. The scheduler
//! pushes timed events into a [`PlaybackDriver`] and never depends on a
//! concrete variant.
//!
//! # Components
//!
//! - [`PlaybackDriver`] - Move and button contract, plus optional typed text
//! - [`EnigoDriver`] - Real pointer injection (feature `os-driver`)
//! - [`RecordingDriver`] - Captures every call with its timestamp
//! - [`NoopDriver`] - Discards every call
//! - [`SharedDriver`] - Serializes calls from any number of sessions
//!
//! # Serialization
//!
//! A physical pointer cannot take interleaved events. Sessions running in
//! parallel each hold a clone of the same [`SharedDriver`]; its mutex keeps
//! at most one emission in flight.

pub mod driver_trait;
#[cfg(feature = "os-driver")]
pub mod enigo_driver;
pub mod recording;

pub use driver_trait::{DriverStats, PlaybackDriver};
use driver_trait::CallKind;
#[cfg(feature = "os-driver")]
pub use enigo_driver::EnigoDriver;
pub use recording::{DriverEvent, NoopDriver, RecordedEvent, RecordingDriver, RecordingLog};

#[cfg(test)]
pub use driver_trait::MockPlaybackDriver;

use std::sync::{Arc, Mutex};
use std::time::Instant;

use crate::config::{DriverBackend, DriverConfig};
use crate::error::{MouseControlError, Result};
use crate::types::{MouseButton, Point};

struct SharedInner {
    driver: Box<dyn PlaybackDriver>,
    stats: DriverStats,
}

/// A driver shared between sessions
///
/// Cloning is cheap and every clone talks to the same underlying driver.
#[derive(Clone)]
pub struct SharedDriver {
    inner: Arc<Mutex<SharedInner>>,
}

impl SharedDriver {
    pub fn new(driver: impl PlaybackDriver + 'static) -> Self {
        Self::from_boxed(Box::new(driver))
    }

    pub fn from_boxed(driver: Box<dyn PlaybackDriver>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(SharedInner {
                driver,
                stats: DriverStats::default(),
            })),
        }
    }

    fn with_driver<F>(&self, kind: CallKind, f: F) -> Result<()>
    where
        F: FnOnce(&mut dyn PlaybackDriver) -> Result<()>,
    {
        let mut inner = self
            .inner
            .lock()
            .map_err(|_| MouseControlError::Driver("driver lock poisoned".to_string()))?;

        let started = Instant::now();
        let result = f(inner.driver.as_mut());
        let elapsed_us = started.elapsed().as_micros() as u64;
        inner.stats.record(kind, result.is_ok(), elapsed_us);
        result
    }

    /// Snapshot of call statistics
    pub fn stats(&self) -> DriverStats {
        self.inner
            .lock()
            .map(|inner| inner.stats)
            .unwrap_or_default()
    }
}

impl PlaybackDriver for SharedDriver {
    fn emit_move(&mut self, point: Point) -> Result<()> {
        self.with_driver(CallKind::Move, |driver| driver.emit_move(point))
    }

    fn emit_button(&mut self, button: MouseButton, pressed: bool) -> Result<()> {
        self.with_driver(CallKind::Button, |driver| driver.emit_button(button, pressed))
    }

    fn emit_text(&mut self, text: &str) -> Result<()> {
        self.with_driver(CallKind::Text, |driver| driver.emit_text(text))
    }
}

impl std::fmt::Debug for SharedDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedDriver").finish_non_exhaustive()
    }
}

/// Build the driver selected in the configuration
///
/// For [`DriverBackend::Recording`] the returned log gives access to the
/// captured events.
pub fn build_driver(config: &DriverConfig) -> Result<(SharedDriver, Option<RecordingLog>)> {
    match config.backend {
        DriverBackend::Os => {
            #[cfg(feature = "os-driver")]
            {
                Ok((SharedDriver::new(EnigoDriver::new()?), None))
            }
            #[cfg(not(feature = "os-driver"))]
            {
                Err(MouseControlError::Config(
                    "the os driver requires the `os-driver` feature".to_string(),
                ))
            }
        }
        DriverBackend::Recording => {
            let driver = RecordingDriver::new();
            let log = driver.log();
            Ok((SharedDriver::new(driver), Some(log)))
        }
        DriverBackend::Noop => Ok((SharedDriver::new(NoopDriver::new()), None)),
    }
}
