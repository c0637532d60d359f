//! Real pointer injection through enigo
//!
//! Only built with the `os-driver` feature. On macOS the process needs the
//! Accessibility permission; on Linux an X11 session (or XWayland) is
//! required.

use enigo::{Button, Coordinate, Direction, Enigo, Keyboard, Mouse, Settings};

use crate::error::{MouseControlError, Result};
use crate::types::{MouseButton, Point, ScreenBounds};

use super::driver_trait::PlaybackDriver;

fn to_enigo_button(button: MouseButton) -> Button {
    match button {
        MouseButton::Left => Button::Left,
        MouseButton::Right => Button::Right,
        MouseButton::Middle => Button::Middle,
    }
}

/// Driver that moves the real system pointer
pub struct EnigoDriver {
    enigo: Enigo,
}

// SAFETY: the enigo handle is only ever touched through `&mut self`, and
// drivers shared between threads sit behind `SharedDriver`'s mutex.
unsafe impl Send for EnigoDriver {}

impl EnigoDriver {
    /// Connect to the platform input system
    pub fn new() -> Result<Self> {
        let enigo = Enigo::new(&Settings::default()).map_err(|e| {
            tracing::warn!(
                "Failed to create Enigo instance: {:?}. Pointer injection requires accessibility permissions.",
                e
            );
            MouseControlError::Driver(format!("Failed to initialize input injection: {:?}", e))
        })?;
        tracing::info!("Pointer injection initialized");
        Ok(Self { enigo })
    }

    /// Current pointer position
    pub fn location(&self) -> Result<Point> {
        let (x, y) = self
            .enigo
            .location()
            .map_err(|e| MouseControlError::Driver(format!("Failed to query pointer: {:?}", e)))?;
        Ok(Point::new(x, y))
    }

    /// Size of the main display
    pub fn display_bounds(&self) -> Result<ScreenBounds> {
        let (width, height) = self
            .enigo
            .main_display()
            .map_err(|e| MouseControlError::Driver(format!("Failed to query display: {:?}", e)))?;
        Ok(ScreenBounds::new(width.max(0) as u32, height.max(0) as u32))
    }
}

impl PlaybackDriver for EnigoDriver {
    fn emit_move(&mut self, point: Point) -> Result<()> {
        self.enigo
            .move_mouse(point.x, point.y, Coordinate::Abs)
            .map_err(|e| MouseControlError::Driver(format!("Failed to move pointer to {}: {:?}", point, e)))
    }

    fn emit_button(&mut self, button: MouseButton, pressed: bool) -> Result<()> {
        let direction = if pressed {
            Direction::Press
        } else {
            Direction::Release
        };
        self.enigo
            .button(to_enigo_button(button), direction)
            .map_err(|e| {
                MouseControlError::Driver(format!(
                    "Failed to {} {} button: {:?}",
                    if pressed { "press" } else { "release" },
                    button,
                    e
                ))
            })
    }

    fn emit_text(&mut self, text: &str) -> Result<()> {
        self.enigo
            .text(text)
            .map_err(|e| MouseControlError::Driver(format!("Failed to type text: {:?}", e)))
    }
}
