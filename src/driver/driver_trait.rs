//! PlaybackDriver trait for the OS-facing boundary
//!
//! Pointer playback needs exactly two operations, a move and a button
//! transition. Typed text is an optional third capability with a default
//! that reports it as unsupported.

use crate::error::{MouseControlError, Result};
use crate::types::{MouseButton, Point};

/// Sink for low-level pointer events
///
/// The scheduler only ever talks to this trait. Implementations must be
/// `Send` so a session can drive them from its playback thread; sharing a
/// driver between sessions goes through [`super::SharedDriver`].
///
/// # Example
///
/// ```ignore
/// fn click(driver: &mut dyn PlaybackDriver) -> Result<()> {
///     driver.emit_button(MouseButton::Left, true)?;
///     driver.emit_button(MouseButton::Left, false)
/// }
/// ```
#[cfg_attr(test, mockall::automock)]
pub trait PlaybackDriver: Send {
    /// Move the pointer to an absolute screen position
    fn emit_move(&mut self, point: Point) -> Result<()>;

    /// Press (`pressed == true`) or release a button
    fn emit_button(&mut self, button: MouseButton, pressed: bool) -> Result<()>;

    /// Type `text` at the current keyboard focus
    fn emit_text(&mut self, text: &str) -> Result<()> {
        let _ = text;
        Err(MouseControlError::Driver(
            "this driver cannot type text".to_string(),
        ))
    }
}

impl<D: PlaybackDriver + ?Sized> PlaybackDriver for Box<D> {
    fn emit_move(&mut self, point: Point) -> Result<()> {
        (**self).emit_move(point)
    }

    fn emit_button(&mut self, button: MouseButton, pressed: bool) -> Result<()> {
        (**self).emit_button(button, pressed)
    }

    fn emit_text(&mut self, text: &str) -> Result<()> {
        (**self).emit_text(text)
    }
}

/// Call counters of a [`super::SharedDriver`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DriverStats {
    /// Successful move calls
    pub moves: u64,
    /// Successful button calls
    pub button_events: u64,
    /// Successful text calls
    pub text_events: u64,
    /// Failed calls of any kind
    pub failures: u64,
    /// Longest time spent inside one call, in microseconds
    pub max_call_time_us: u64,
}

/// Kind of call being counted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CallKind {
    Move,
    Button,
    Text,
}

impl DriverStats {
    /// Total successful calls
    pub fn total_calls(&self) -> u64 {
        self.moves + self.button_events + self.text_events
    }

    pub(crate) fn record(&mut self, kind: CallKind, ok: bool, time_us: u64) {
        if !ok {
            self.failures += 1;
            return;
        }
        match kind {
            CallKind::Move => self.moves += 1,
            CallKind::Button => self.button_events += 1,
            CallKind::Text => self.text_events += 1,
        }
        self.max_call_time_us = self.max_call_time_us.max(time_us);
    }
}

impl std::fmt::Display for DriverStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} moves, {} button events, {} text events, {} failures, slowest call {}us",
            self.moves, self.button_events, self.text_events, self.failures, self.max_call_time_us
        )
    }
}
