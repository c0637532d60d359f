//! Script sessions
//!
//! A session owns one script execution from start to a terminal state.
//!
//! # State machine
//!
//! ```text
//! Idle --start--> Running --(all steps)--> Completed
//!                  |  ^  \--(step error)--> Failed
//!            pause |  | resume
//!                  v  |
//!                 Paused
//! Running | Paused --cancel--> Cancelled
//! ```
//!
//! Control calls that do not match the current state return
//! [`MouseControlError::InvalidTransition`](crate::error::MouseControlError::InvalidTransition)
//! and change nothing.

pub mod controller;
mod runner;
pub mod types;

pub use controller::SessionController;
pub use types::{FailureKind, SessionEvent, SessionFailure, SessionState, SessionStatus};
