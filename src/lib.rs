//! # mousecontrol: Human-like Pointer Playback
//!
//! Turns scripted pointer intent ("move from A to B over 350ms, then
//! left-click") into a paced stream of low-level pointer events, and relays
//! live motion readings to the pointer.
//!
//! ## Architecture
//!
//! - **Trajectory**: expands a move into time-stamped positions with easing
//!   and optional jitter
//! - **Scheduler**: emits samples at absolute target times with drift
//!   compensation, pause and cooperative cancellation
//! - **Driver**: move and button calls, plus optional typed text, with OS,
//!   recording and no-op variants behind a shared, serializing handle
//! - **Session**: runs one script on its own thread with a
//!   start/pause/resume/cancel/status control surface
//! - **Motion**: gyro-style reading filter for live relaying
//!
//! ## Configuration
//!
//! Settings are read from `config.toml` in the platform config directory
//! under `dev.mousecontrol`:
//!
//! - **Linux**: `~/.config/dev.mousecontrol/`
//! - **macOS**: `~/Library/Application Support/dev.mousecontrol/`
//! - **Windows**: `%APPDATA%\dev.mousecontrol\`
//!
//! ## Example
//!
//! ```no_run
//! use mousecontrol::{
//!     config::AppConfig,
//!     driver::build_driver,
//!     script::Script,
//!     session::SessionController,
//! };
//!
//! fn main() -> mousecontrol::Result<()> {
//!     let config = AppConfig::load_or_default();
//!     let script = Script::load("open-menu.json")?;
//!     let (driver, _log) = build_driver(&config.driver)?;
//!
//!     let mut session = SessionController::new(script, driver, &config.playback);
//!     let status = session.run_to_completion()?;
//!     println!("{} after {} events", status.state, status.events_emitted);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod driver;
pub mod error;
pub mod motion;
pub mod scheduler;
pub mod script;
pub mod session;
pub mod trajectory;
pub mod types;

// Re-export commonly used types
pub use config::AppConfig;
pub use driver::{PlaybackDriver, SharedDriver};
pub use error::{MouseControlError, Result};
pub use scheduler::{EventScheduler, PlaybackOutcome};
pub use script::Script;
pub use session::{SessionController, SessionState, SessionStatus};
pub use trajectory::TrajectoryGenerator;
pub use types::{
    ClickStep, EasingKind, MouseButton, MoveStep, Point, ScreenBounds, Step, TextStep, Trajectory,
};
