//! Session playback thread
//!
//! The runner owns the resolved playback context of one session and walks
//! its steps in order on a dedicated thread. State shared with the
//! controller lives in [`SessionShared`]: every state transition happens
//! under its status mutex, so a control call and the runner finishing can
//! never both win.
//!
//! # Step handling
//!
//! - **Move**: resolved against the last known cursor position, expanded by
//!   the [`TrajectoryGenerator`] and paced by the [`EventScheduler`].
//! - **Click**: the scheduler click path. With `position_before_click` set,
//!   one positioning move goes first when the cursor is not known to be at
//!   the click point.
//! - **Text**: typed through the driver in a single call.
//!
//! The first failing step ends the session; later steps are not attempted.

use chrono::Utc;
use crossbeam_channel::Sender;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::driver::{PlaybackDriver, SharedDriver};
use crate::error::{MouseControlError, Result};
use crate::scheduler::{EventScheduler, PlaybackControl, PlaybackOutcome, PlaybackStats};
use crate::script::ScriptStep;
use crate::trajectory::TrajectoryGenerator;
use crate::types::{MouseButton, Point, ScreenBounds, TextStep, TimedSample, Trajectory};

use super::types::{SessionEvent, SessionFailure, SessionState, SessionStatus};

/// State shared between a controller and its playback thread
#[derive(Debug)]
pub(crate) struct SessionShared {
    status: Mutex<SessionStatus>,
    subscribers: Mutex<Vec<Sender<SessionEvent>>>,
    pub(crate) control: Arc<PlaybackControl>,
}

impl SessionShared {
    pub(crate) fn new(status: SessionStatus, control: Arc<PlaybackControl>) -> Self {
        Self {
            status: Mutex::new(status),
            subscribers: Mutex::new(Vec::new()),
            control,
        }
    }

    pub(crate) fn status(&self) -> MutexGuard<'_, SessionStatus> {
        self.status.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub(crate) fn subscribe(&self, sender: Sender<SessionEvent>) {
        self.subscribers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(sender);
    }

    /// Send to every live subscriber; full or closed channels are skipped
    pub(crate) fn publish(&self, event: SessionEvent) {
        let mut subscribers = self.subscribers.lock().unwrap_or_else(|e| e.into_inner());
        subscribers.retain(|tx| match tx.try_send(event.clone()) {
            Ok(()) => true,
            Err(crossbeam_channel::TrySendError::Full(_)) => {
                tracing::warn!("Session event subscriber is full, dropping event");
                true
            }
            Err(crossbeam_channel::TrySendError::Disconnected(_)) => false,
        });
    }

    /// Move from one of `allowed` to `to`, or report why not
    pub(crate) fn transition(
        &self,
        action: &'static str,
        allowed: &[SessionState],
        to: SessionState,
        apply: impl FnOnce(&mut SessionStatus),
    ) -> Result<()> {
        let from = {
            let mut status = self.status();
            let from = status.state;
            if !allowed.contains(&from) {
                return Err(MouseControlError::InvalidTransition {
                    action,
                    state: from.display_name(),
                });
            }
            status.state = to;
            apply(&mut status);
            from
        };
        tracing::info!("Session {} -> {}", from, to);
        self.publish(SessionEvent::StateChanged { from, to });
        Ok(())
    }

    fn count_emission(&self) {
        self.status().events_emitted += 1;
    }

    fn begin_step(&self, index: usize, kind: &'static str) {
        self.status().step_index = index;
        self.publish(SessionEvent::StepStarted { index, kind });
    }

    /// Record the failure; the state becomes Failed unless already terminal
    fn fail(&self, index: usize, error: &MouseControlError) {
        let failure = SessionFailure::new(index, error);
        let from = {
            let mut status = self.status();
            status.last_error = Some(failure);
            if status.state.is_terminal() {
                None
            } else {
                let from = status.state;
                status.state = SessionState::Failed;
                status.finished_at = Some(Utc::now());
                Some(from)
            }
        };
        if let Some(from) = from {
            self.publish(SessionEvent::StateChanged {
                from,
                to: SessionState::Failed,
            });
        }
    }

    /// Mark the session Completed unless something else ended it first
    fn complete(&self) {
        let from = {
            let mut status = self.status();
            if status.state.is_terminal() {
                None
            } else {
                let from = status.state;
                status.state = SessionState::Completed;
                status.finished_at = Some(Utc::now());
                Some(from)
            }
        };
        if let Some(from) = from {
            tracing::info!("Session {} -> {}", from, SessionState::Completed);
            self.publish(SessionEvent::StateChanged {
                from,
                to: SessionState::Completed,
            });
        }
    }
}

/// Driver wrapper that counts successful emissions into the session status
struct CountingDriver<'a> {
    driver: &'a mut SharedDriver,
    shared: &'a SessionShared,
}

impl PlaybackDriver for CountingDriver<'_> {
    fn emit_move(&mut self, point: Point) -> Result<()> {
        self.driver.emit_move(point)?;
        self.shared.count_emission();
        Ok(())
    }

    fn emit_button(&mut self, button: MouseButton, pressed: bool) -> Result<()> {
        self.driver.emit_button(button, pressed)?;
        self.shared.count_emission();
        Ok(())
    }

    fn emit_text(&mut self, text: &str) -> Result<()> {
        self.driver.emit_text(text)?;
        self.shared.count_emission();
        Ok(())
    }
}

/// Everything the playback thread needs, moved onto it at start
pub(crate) struct SessionRunner {
    pub(crate) shared: Arc<SessionShared>,
    pub(crate) steps: Vec<ScriptStep>,
    pub(crate) driver: SharedDriver,
    pub(crate) generator: TrajectoryGenerator,
    pub(crate) scheduler: EventScheduler,
    pub(crate) position_before_click: bool,
    pub(crate) last_position: Option<Point>,
}

impl SessionRunner {
    fn bounds(&self) -> ScreenBounds {
        *self.generator.bounds()
    }

    /// Main playback loop
    pub(crate) fn run(mut self) {
        let steps = std::mem::take(&mut self.steps);
        let mut totals = PlaybackStats::default();

        for (index, step) in steps.iter().enumerate() {
            if self.shared.control.is_cancelled() {
                break;
            }
            self.shared.begin_step(index, step.kind());
            tracing::debug!("Step {} ({}) started", index, step.kind());

            match self.run_step(step) {
                Ok(outcome) => {
                    let stats = outcome.stats();
                    totals.merge(stats);
                    self.shared.publish(SessionEvent::StepFinished {
                        index,
                        emitted: stats.emitted,
                    });
                    if outcome.is_cancelled() {
                        tracing::debug!("Step {} cancelled after {} events", index, stats.emitted);
                        break;
                    }
                    tracing::debug!(
                        "Step {} finished: {} events, max lateness {:?}",
                        index,
                        stats.emitted,
                        stats.max_lateness
                    );
                }
                Err(e) => {
                    tracing::warn!("Step {} ({}) failed: {}", index, step.kind(), e);
                    self.shared.fail(index, &e);
                    self.finish(totals);
                    return;
                }
            }
        }

        self.shared.complete();
        self.finish(totals);
    }

    fn finish(&self, totals: PlaybackStats) {
        let status = self.shared.status().clone();
        tracing::info!(
            "Session '{}' ended {} after {} events (max lateness {:?}, mean {:?})",
            status.name,
            status.state,
            status.events_emitted,
            totals.max_lateness,
            totals.mean_lateness()
        );
        tracing::debug!("Driver totals: {}", self.driver.stats());
        self.shared.publish(SessionEvent::Finished(status));
    }

    fn run_step(&mut self, step: &ScriptStep) -> Result<PlaybackOutcome> {
        match step {
            ScriptStep::Move(descriptor) => {
                let step = descriptor.resolve(self.last_position)?;
                let trajectory = self.generator.generate(&step)?;
                let outcome = self.play(&trajectory)?;
                if let Some(sample) = trajectory.last() {
                    if !outcome.is_cancelled() {
                        self.last_position = Some(sample.position);
                    }
                }
                Ok(outcome)
            }
            ScriptStep::Click(descriptor) => {
                let click = descriptor.resolve()?;
                click.validate(&self.bounds())?;

                let mut stats = PlaybackStats::default();
                if self.position_before_click && self.last_position != Some(click.point) {
                    let positioning = Trajectory::from_samples(vec![TimedSample {
                        position: click.point,
                        offset_ms: 0,
                    }]);
                    let outcome = self.play(&positioning)?;
                    stats.merge(outcome.stats());
                    if outcome.is_cancelled() {
                        return Ok(PlaybackOutcome::Cancelled(stats));
                    }
                    self.last_position = Some(click.point);
                }

                let mut driver = CountingDriver {
                    driver: &mut self.driver,
                    shared: &self.shared,
                };
                let outcome = self.scheduler.click(&click, &mut driver)?;
                stats.merge(outcome.stats());
                Ok(match outcome {
                    PlaybackOutcome::Completed(_) => PlaybackOutcome::Completed(stats),
                    PlaybackOutcome::Cancelled(_) => PlaybackOutcome::Cancelled(stats),
                })
            }
            ScriptStep::Text(descriptor) => {
                let text = TextStep::new(descriptor.text.clone());
                let mut driver = CountingDriver {
                    driver: &mut self.driver,
                    shared: &self.shared,
                };
                self.scheduler.type_text(&text, &mut driver)
            }
        }
    }

    fn play(&mut self, trajectory: &Trajectory) -> Result<PlaybackOutcome> {
        let start = self.scheduler.clock().now();
        let mut driver = CountingDriver {
            driver: &mut self.driver,
            shared: &self.shared,
        };
        self.scheduler.play(trajectory, &mut driver, start)
    }
}
