//! Event scheduling and pacing
//!
//! The [`EventScheduler`] turns a [`Trajectory`] into driver calls at the
//! right wall-clock times, and runs the press/hold/release sequence of a
//! click.
//!
//! # Pacing
//!
//! Every sample has an absolute target time, `start + offset` plus any time
//! spent paused since the call began. The scheduler sleeps until the target
//! and then emits. Because targets are absolute, an emission that overruns
//! its target by some amount shortens the next wait by the same amount
//! (never below zero): lag does not accumulate over a long trajectory.
//! Samples are never emitted before their target, never reordered and never
//! dropped.
//!
//! # Cancellation
//!
//! Cancellation is cooperative. It is checked after each wait, right
//! before an emission, so a cancelled playback emits exactly the samples
//! whose target had already passed. A click that has pressed its button
//! always releases it.

pub mod clock;
pub mod control;

pub use clock::{Clock, ManualClock, SystemClock};
pub use control::PlaybackControl;

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::driver::PlaybackDriver;
use crate::error::Result;
use crate::types::{ClickStep, TextStep, Trajectory};

/// Timing quality of one playback call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlaybackStats {
    /// Driver calls made
    pub emitted: usize,
    /// Largest delay between a target time and its emission
    pub max_lateness: Duration,
    /// Sum of all emission delays
    pub total_lateness: Duration,
}

impl PlaybackStats {
    pub fn mean_lateness(&self) -> Duration {
        if self.emitted == 0 {
            Duration::ZERO
        } else {
            self.total_lateness / self.emitted as u32
        }
    }

    /// Fold another call's stats into this one
    pub fn merge(&mut self, other: &PlaybackStats) {
        self.emitted += other.emitted;
        self.total_lateness += other.total_lateness;
        self.max_lateness = self.max_lateness.max(other.max_lateness);
    }

    fn record(&mut self, lateness: Duration) {
        self.emitted += 1;
        self.total_lateness += lateness;
        self.max_lateness = self.max_lateness.max(lateness);
    }
}

/// How a playback call ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackOutcome {
    /// Every event was emitted
    Completed(PlaybackStats),
    /// Stopped early; only the counted events were emitted
    Cancelled(PlaybackStats),
}

impl PlaybackOutcome {
    pub fn stats(&self) -> &PlaybackStats {
        match self {
            PlaybackOutcome::Completed(stats) | PlaybackOutcome::Cancelled(stats) => stats,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, PlaybackOutcome::Cancelled(_))
    }
}

const DEFAULT_SLEEP_SLICE: Duration = Duration::from_millis(crate::config::DEFAULT_FRAME_INTERVAL_MS);

enum Wait {
    Reached { lateness: Duration },
    Cancelled,
}

/// Emits trajectories and clicks on a clock
#[derive(Clone)]
pub struct EventScheduler {
    clock: Arc<dyn Clock>,
    control: Arc<PlaybackControl>,
    /// Longest single sleep, bounding how late a pause or cancel is seen
    sleep_slice: Duration,
}

impl std::fmt::Debug for EventScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventScheduler")
            .field("control", &self.control)
            .field("sleep_slice", &self.sleep_slice)
            .finish_non_exhaustive()
    }
}

impl EventScheduler {
    pub fn new(clock: Arc<dyn Clock>, control: Arc<PlaybackControl>) -> Self {
        Self {
            clock,
            control,
            sleep_slice: DEFAULT_SLEEP_SLICE,
        }
    }

    /// Bound each sleep, normally to the frame interval
    pub fn with_sleep_slice(mut self, slice: Duration) -> Self {
        if !slice.is_zero() {
            self.sleep_slice = slice;
        }
        self
    }

    /// Scheduler with its own pause/cancel control
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        let control = Arc::new(PlaybackControl::new(clock.clone()));
        Self::new(clock, control)
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    pub fn control(&self) -> &Arc<PlaybackControl> {
        &self.control
    }

    /// Block until `start + offset` (shifted by pauses since `pause_base`),
    /// honoring pause and cancel between sleeps
    fn wait_until(&self, start: Instant, offset: Duration, pause_base: Duration) -> Wait {
        loop {
            if self.control.is_cancelled() {
                return Wait::Cancelled;
            }
            if self.control.is_paused() {
                if !self.control.wait_while_paused() {
                    return Wait::Cancelled;
                }
                continue;
            }

            let shift = self.control.paused_total().saturating_sub(pause_base);
            let target = start + offset + shift;
            let now = self.clock.now();
            if now >= target {
                return Wait::Reached {
                    lateness: now - target,
                };
            }
            self.clock.sleep((target - now).min(self.sleep_slice));
        }
    }

    /// Emit every sample of `trajectory` at `start + offset`
    ///
    /// Returns [`PlaybackOutcome::Cancelled`] when the control is cancelled
    /// before the last sample. A driver error aborts immediately and is
    /// returned as is.
    pub fn play(
        &self,
        trajectory: &Trajectory,
        driver: &mut dyn PlaybackDriver,
        start: Instant,
    ) -> Result<PlaybackOutcome> {
        // Pausing before `start` must not shift the targets
        let pause_base = self.control.paused_before(start);
        let mut stats = PlaybackStats::default();

        for sample in trajectory {
            let offset = Duration::from_millis(sample.offset_ms);
            match self.wait_until(start, offset, pause_base) {
                Wait::Cancelled => {
                    tracing::debug!(
                        "Playback cancelled after {} of {} samples",
                        stats.emitted,
                        trajectory.len()
                    );
                    return Ok(PlaybackOutcome::Cancelled(stats));
                }
                Wait::Reached { lateness } => {
                    driver.emit_move(sample.position)?;
                    stats.record(lateness);
                    tracing::trace!(
                        "Emitted move to {} at +{}ms (late by {:?})",
                        sample.position,
                        sample.offset_ms,
                        lateness
                    );
                }
            }
        }

        tracing::debug!(
            "Played {} samples, max lateness {:?}, mean lateness {:?}",
            stats.emitted,
            stats.max_lateness,
            stats.mean_lateness()
        );
        Ok(PlaybackOutcome::Completed(stats))
    }

    /// Press, hold for `hold_ms`, release
    ///
    /// The hold is a plain blocking wait outside drift correction. Pause and
    /// cancel are only observed before the press.
    pub fn click(
        &self,
        click: &ClickStep,
        driver: &mut dyn PlaybackDriver,
    ) -> Result<PlaybackOutcome> {
        let mut stats = PlaybackStats::default();

        if self.control.is_cancelled() || !self.control.wait_while_paused() {
            return Ok(PlaybackOutcome::Cancelled(stats));
        }

        driver.emit_button(click.button, true)?;
        stats.record(Duration::ZERO);

        if click.hold_ms > 0 {
            self.clock.sleep(Duration::from_millis(click.hold_ms));
        }

        driver.emit_button(click.button, false)?;
        stats.record(Duration::ZERO);

        tracing::trace!(
            "Clicked {} button, held for {}ms",
            click.button,
            click.hold_ms
        );
        Ok(PlaybackOutcome::Completed(stats))
    }
}

impl EventScheduler {
    /// Type `text` through the driver's keyboard in one call
    ///
    /// Pause and cancel are observed before typing. Empty text emits nothing.
    pub fn type_text(
        &self,
        text: &TextStep,
        driver: &mut dyn PlaybackDriver,
    ) -> Result<PlaybackOutcome> {
        let mut stats = PlaybackStats::default();

        if self.control.is_cancelled() || !self.control.wait_while_paused() {
            return Ok(PlaybackOutcome::Cancelled(stats));
        }
        if text.text.is_empty() {
            return Ok(PlaybackOutcome::Completed(stats));
        }

        driver.emit_text(&text.text)?;
        stats.record(Duration::ZERO);
        tracing::trace!("Typed {} characters", text.text.chars().count());
        Ok(PlaybackOutcome::Completed(stats))
    }
}
