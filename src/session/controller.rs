//! Session controller
//!
//! Owns one script execution and exposes the control surface used by the
//! CLI: start, pause, resume, cancel and status.

use crossbeam_channel::{bounded, Receiver};
use std::sync::Arc;
use std::thread::JoinHandle;

use chrono::Utc;

use crate::config::PlaybackConfig;
use crate::driver::SharedDriver;
use crate::error::{MouseControlError, Result};
use crate::scheduler::{Clock, EventScheduler, PlaybackControl, SystemClock};
use crate::script::{Script, ScriptStep};
use crate::trajectory::TrajectoryGenerator;
use crate::types::{Point, Step};

use super::runner::{SessionRunner, SessionShared};
use super::types::{SessionEvent, SessionState, SessionStatus};

/// Capacity of each subscriber channel
const EVENT_CHANNEL_CAPACITY: usize = 1024;

/// Drives one script on its own playback thread
///
/// Several controllers may run at once against clones of the same
/// [`SharedDriver`]; they share nothing else.
///
/// Dropping a controller that is still running cancels it and waits for
/// its thread.
pub struct SessionController {
    shared: Arc<SessionShared>,
    runner: Option<SessionRunner>,
    handle: Option<JoinHandle<()>>,
}

impl SessionController {
    /// Create a session for `script` on the real clock
    pub fn new(script: Script, driver: SharedDriver, config: &PlaybackConfig) -> Self {
        Self::with_clock(script, driver, config, Arc::new(SystemClock))
    }

    /// Create a session for already resolved steps
    pub fn from_steps(
        name: impl Into<String>,
        steps: Vec<Step>,
        driver: SharedDriver,
        config: &PlaybackConfig,
    ) -> Self {
        let steps = steps.into_iter().map(ScriptStep::from).collect();
        Self::new(Script::new(name, steps), driver, config)
    }

    /// Create a session on a specific clock
    pub fn with_clock(
        script: Script,
        driver: SharedDriver,
        config: &PlaybackConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let control = Arc::new(PlaybackControl::new(clock.clone()));
        let scheduler = EventScheduler::new(clock, control.clone())
            .with_sleep_slice(config.frame_interval());
        let status = SessionStatus::new(script.name.clone(), script.steps.len());
        let shared = Arc::new(SessionShared::new(status, control));

        let runner = SessionRunner {
            shared: shared.clone(),
            steps: script.steps,
            driver,
            generator: TrajectoryGenerator::new(config),
            scheduler,
            position_before_click: config.position_before_click,
            last_position: script.initial_position,
        };

        Self {
            shared,
            runner: Some(runner),
            handle: None,
        }
    }

    /// Assume the cursor starts at `position`
    ///
    /// Only meaningful before [`start`](Self::start).
    pub fn with_initial_position(mut self, position: Point) -> Self {
        if let Some(runner) = self.runner.as_mut() {
            runner.last_position = Some(position);
        }
        self
    }

    /// Idle -> Running: spawn the playback thread
    pub fn start(&mut self) -> Result<()> {
        self.shared.transition(
            "start",
            &[SessionState::Idle],
            SessionState::Running,
            |status| status.started_at = Some(Utc::now()),
        )?;

        let runner = self.runner.take().ok_or(MouseControlError::InvalidTransition {
            action: "start",
            state: SessionState::Running.display_name(),
        })?;
        let name = self.shared.status().name.clone();

        let spawned = std::thread::Builder::new()
            .name(format!("session-{}", name))
            .spawn(move || runner.run());

        match spawned {
            Ok(handle) => {
                self.handle = Some(handle);
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Failed to spawn playback thread: {}", e);
                let mut status = self.shared.status();
                status.state = SessionState::Failed;
                status.finished_at = Some(Utc::now());
                Err(MouseControlError::Io(e).with_context("Failed to spawn playback thread"))
            }
        }
    }

    /// Running -> Paused: freeze the timeline
    pub fn pause(&self) -> Result<()> {
        let control = &self.shared.control;
        self.shared.transition(
            "pause",
            &[SessionState::Running],
            SessionState::Paused,
            |_| {
                control.pause();
            },
        )
    }

    /// Paused -> Running: shift every remaining target by the pause length
    pub fn resume(&self) -> Result<()> {
        let control = &self.shared.control;
        self.shared.transition(
            "resume",
            &[SessionState::Paused],
            SessionState::Running,
            |_| {
                if let Some(paused_for) = control.resume() {
                    tracing::debug!("Resumed after {:?}", paused_for);
                }
            },
        )
    }

    /// Running or Paused -> Cancelled
    pub fn cancel(&self) -> Result<()> {
        let control = &self.shared.control;
        self.shared.transition(
            "cancel",
            &[SessionState::Running, SessionState::Paused],
            SessionState::Cancelled,
            |status| {
                status.finished_at = Some(Utc::now());
                control.cancel();
            },
        )
    }

    /// Snapshot of state, step index and counters
    pub fn status(&self) -> SessionStatus {
        self.shared.status().clone()
    }

    pub fn state(&self) -> SessionState {
        self.shared.status().state
    }

    /// Receive lifecycle events from now on
    pub fn subscribe(&self) -> Receiver<SessionEvent> {
        let (tx, rx) = bounded(EVENT_CHANNEL_CAPACITY);
        self.shared.subscribe(tx);
        rx
    }

    /// Block until the playback thread exits and return the final status
    ///
    /// Returns the current status immediately if the session never started.
    pub fn wait(&mut self) -> SessionStatus {
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::warn!("Playback thread panicked");
                let mut status = self.shared.status();
                if !status.state.is_terminal() {
                    status.state = SessionState::Failed;
                    status.finished_at = Some(Utc::now());
                }
            }
        }
        self.status()
    }

    /// Start and wait for the end
    pub fn run_to_completion(&mut self) -> Result<SessionStatus> {
        self.start()?;
        Ok(self.wait())
    }
}

impl Drop for SessionController {
    fn drop(&mut self) {
        if self.handle.is_some() {
            if self.state().is_active() {
                tracing::debug!("Cancelling session on drop");
                let _ = self.cancel();
            }
            self.wait();
        }
    }
}

impl std::fmt::Debug for SessionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionController")
            .field("status", &self.status())
            .field("started", &self.runner.is_none())
            .finish()
    }
}
