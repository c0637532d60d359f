//! Session data types

use chrono::{DateTime, Utc};
use std::fmt;

use crate::error::MouseControlError;

/// Run state of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// Created, not started
    #[default]
    Idle,
    /// Playing steps
    Running,
    /// Timeline frozen
    Paused,
    /// Every step was played
    Completed,
    /// Stopped on request
    Cancelled,
    /// A step failed; later steps were not attempted
    Failed,
}

impl SessionState {
    /// Check if the session can no longer change state
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SessionState::Completed | SessionState::Cancelled | SessionState::Failed
        )
    }

    /// Check if the playback thread is live (running or paused)
    pub fn is_active(&self) -> bool {
        matches!(self, SessionState::Running | SessionState::Paused)
    }

    /// Display name for the state
    pub fn display_name(&self) -> &'static str {
        match self {
            SessionState::Idle => "Idle",
            SessionState::Running => "Running",
            SessionState::Paused => "Paused",
            SessionState::Completed => "Completed",
            SessionState::Cancelled => "Cancelled",
            SessionState::Failed => "Failed",
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Broad category of a step failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    InvalidStep,
    Driver,
    Other,
}

impl From<&MouseControlError> for FailureKind {
    fn from(error: &MouseControlError) -> Self {
        if error.is_invalid_step() {
            FailureKind::InvalidStep
        } else if error.is_driver() {
            FailureKind::Driver
        } else {
            FailureKind::Other
        }
    }
}

/// The error that ended (or raced with the end of) a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionFailure {
    /// Index of the step that failed
    pub step_index: usize,
    pub kind: FailureKind,
    pub message: String,
}

impl SessionFailure {
    pub fn new(step_index: usize, error: &MouseControlError) -> Self {
        Self {
            step_index,
            kind: FailureKind::from(error),
            message: error.to_string(),
        }
    }
}

impl fmt::Display for SessionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "step {}: {}", self.step_index, self.message)
    }
}

/// Snapshot returned by [`SessionController::status`](super::SessionController::status)
#[derive(Debug, Clone, PartialEq)]
pub struct SessionStatus {
    /// Script name
    pub name: String,
    pub state: SessionState,
    /// Index of the current step, or of the last step reached
    pub step_index: usize,
    pub total_steps: usize,
    /// Driver calls made so far
    pub events_emitted: usize,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub last_error: Option<SessionFailure>,
}

impl SessionStatus {
    pub fn new(name: impl Into<String>, total_steps: usize) -> Self {
        Self {
            name: name.into(),
            state: SessionState::Idle,
            step_index: 0,
            total_steps,
            events_emitted: 0,
            started_at: None,
            finished_at: None,
            last_error: None,
        }
    }

    /// Wall-clock run time, up to now while still running
    pub fn elapsed(&self) -> Option<chrono::Duration> {
        let started = self.started_at?;
        let end = self.finished_at.unwrap_or_else(Utc::now);
        Some(end - started)
    }
}

/// Notification published to subscribers of a session
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    StateChanged {
        from: SessionState,
        to: SessionState,
    },
    StepStarted {
        index: usize,
        kind: &'static str,
    },
    StepFinished {
        index: usize,
        /// Driver calls made by this step
        emitted: usize,
    },
    /// Final status, sent once when the playback thread exits
    Finished(SessionStatus),
}
