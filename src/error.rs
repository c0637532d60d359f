//! Error handling for mousecontrol
//!
//! This module defines the error taxonomy shared by the trajectory
//! generator, scheduler, drivers and session controller, and a Result alias
//! for use throughout the crate.
//!
//! Cancellation is deliberately absent: a cancelled playback is a normal
//! outcome ([`crate::scheduler::PlaybackOutcome::Cancelled`]), not an error.

use thiserror::Error;

/// Main error type for mousecontrol operations
#[derive(Error, Debug)]
pub enum MouseControlError {
    /// A move or click step has malformed geometry or timing.
    /// Raised before any event of that step is emitted.
    #[error("Invalid step: {0}")]
    InvalidStep(String),

    /// The underlying emission call failed. Never retried.
    #[error("Driver error: {0}")]
    Driver(String),

    /// A control operation was requested in a state that does not allow it
    #[error("Cannot {action} a session that is {state}")]
    InvalidTransition {
        action: &'static str,
        state: &'static str,
    },

    /// Errors related to script loading
    #[error("Script error: {0}")]
    Script(String),

    /// Errors related to configuration loading/saving
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<MouseControlError>,
    },
}

impl MouseControlError {
    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        MouseControlError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Shorthand for an [`MouseControlError::InvalidStep`]
    pub fn invalid_step(message: impl Into<String>) -> Self {
        MouseControlError::InvalidStep(message.into())
    }

    /// Returns the innermost error, skipping context wrappers
    pub fn root(&self) -> &MouseControlError {
        match self {
            MouseControlError::WithContext { source, .. } => source.root(),
            other => other,
        }
    }

    /// True if this error (or the error it wraps) is an invalid step
    pub fn is_invalid_step(&self) -> bool {
        matches!(self.root(), MouseControlError::InvalidStep(_))
    }

    /// True if this error (or the error it wraps) came from the driver
    pub fn is_driver(&self) -> bool {
        matches!(self.root(), MouseControlError::Driver(_))
    }
}

impl From<serde_json::Error> for MouseControlError {
    fn from(err: serde_json::Error) -> Self {
        MouseControlError::Serialization(err.to_string())
    }
}

/// Result type alias for mousecontrol operations
pub type Result<T> = std::result::Result<T, MouseControlError>;

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error result
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context lazily to an error result
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| e.with_context(f()))
    }
}
