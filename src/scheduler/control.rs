//! Cross-thread pause and cancel signals for one playback timeline
//!
//! Paused time is kept in a single accumulator. Resuming adds the length of
//! the pause to it once; the scheduler adds the accumulator to every target
//! time it computes, so remaining samples shift forward without being
//! touched individually.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use super::clock::Clock;

#[derive(Debug, Default)]
struct PauseState {
    paused_since: Option<Instant>,
    accumulated: Duration,
}

/// Pause/cancel state shared by a session and its scheduler
pub struct PlaybackControl {
    clock: Arc<dyn Clock>,
    cancelled: AtomicBool,
    pause: Mutex<PauseState>,
    resumed: Condvar,
}

impl PlaybackControl {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            cancelled: AtomicBool::new(false),
            pause: Mutex::new(PauseState::default()),
            resumed: Condvar::new(),
        }
    }

    fn state(&self) -> MutexGuard<'_, PauseState> {
        self.pause.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Request cancellation and wake a paused scheduler
    pub fn cancel(&self) {
        let _state = self.state();
        self.cancelled.store(true, Ordering::SeqCst);
        self.resumed.notify_all();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Freeze the timeline. Returns false if it was already paused.
    pub fn pause(&self) -> bool {
        let mut state = self.state();
        if state.paused_since.is_some() {
            return false;
        }
        state.paused_since = Some(self.clock.now());
        true
    }

    /// Unfreeze the timeline, returning how long it was paused
    pub fn resume(&self) -> Option<Duration> {
        let mut state = self.state();
        let since = state.paused_since.take()?;
        let paused_for = self.clock.now().saturating_duration_since(since);
        state.accumulated += paused_for;
        self.resumed.notify_all();
        Some(paused_for)
    }

    pub fn is_paused(&self) -> bool {
        self.state().paused_since.is_some()
    }

    /// Total time spent paused, excluding a pause still in progress
    pub fn paused_total(&self) -> Duration {
        self.state().accumulated
    }

    /// Paused time up to `at`: the accumulator plus the part of a pause in
    /// progress that lies before `at`
    pub fn paused_before(&self, at: Instant) -> Duration {
        let state = self.state();
        let ongoing = state
            .paused_since
            .map(|since| at.saturating_duration_since(since))
            .unwrap_or_default();
        state.accumulated + ongoing
    }

    /// Block while paused. Returns false if cancelled.
    pub fn wait_while_paused(&self) -> bool {
        let mut state = self.state();
        while state.paused_since.is_some() && !self.is_cancelled() {
            state = self
                .resumed
                .wait(state)
                .unwrap_or_else(|e| e.into_inner());
        }
        !self.is_cancelled()
    }
}

impl std::fmt::Debug for PlaybackControl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackControl")
            .field("cancelled", &self.is_cancelled())
            .field("paused", &self.is_paused())
            .field("paused_total", &self.paused_total())
            .finish()
    }
}
