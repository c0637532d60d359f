//! mousecontrol - Main Entry Point
//!
//! Plays pointer scripts, validates them, dry-runs them on a virtual clock,
//! or relays live motion readings from stdin.

use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand};
use mousecontrol::{
    config::{AppConfig, DriverBackend, LoggingConfig},
    driver::{build_driver, RecordingDriver, RecordingLog, SharedDriver},
    motion::{MotionFilter, MotionRelay},
    scheduler::ManualClock,
    script::Script,
    session::{SessionController, SessionEvent, SessionState},
    types::Point,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Human-like pointer playback
#[derive(Parser, Debug)]
#[command(name = "mousecontrol")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Driver backend, overriding the config file
    #[arg(short, long, global = true, value_enum)]
    driver: Option<DriverBackend>,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Play a script on the configured driver
    Play {
        /// Script file (JSON)
        script: PathBuf,
    },

    /// Validate every step of a script without emitting anything
    Check {
        /// Script file (JSON)
        script: PathBuf,
    },

    /// Play a script on a virtual clock and print the event stream
    DryRun {
        /// Script file (JSON)
        script: PathBuf,
    },

    /// Relay motion readings (JSON lines) from stdin to the driver
    Relay,
}

/// Console output plus an optional daily log file
///
/// The returned guard must live until exit so buffered lines are flushed.
fn init_logging(config: &LoggingConfig) -> Option<WorkerGuard> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.filter));

    let (file_layer, guard) = match &config.log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "mousecontrol.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .init();

    guard
}

fn load_config(path: Option<&Path>) -> anyhow::Result<AppConfig> {
    match path {
        Some(path) => AppConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => Ok(AppConfig::load_or_default()),
    }
}

fn load_script(path: &Path) -> anyhow::Result<Script> {
    Script::load(path).with_context(|| format!("failed to load script {}", path.display()))
}

/// Build the configured driver, reporting the cursor position when the
/// backend can read it
fn open_driver(
    config: &AppConfig,
) -> anyhow::Result<(SharedDriver, Option<RecordingLog>, Option<Point>)> {
    #[cfg(feature = "os-driver")]
    if config.driver.backend == DriverBackend::Os {
        let driver = mousecontrol::driver::EnigoDriver::new()?;
        match driver.display_bounds() {
            Ok(bounds) if bounds != config.playback.screen => tracing::warn!(
                "Configured screen {}x{} differs from the main display {}x{}",
                config.playback.screen.width,
                config.playback.screen.height,
                bounds.width,
                bounds.height
            ),
            Ok(_) => {}
            Err(e) => tracing::warn!("Could not read display size: {}", e),
        }
        let position = match driver.location() {
            Ok(point) => Some(point),
            Err(e) => {
                tracing::warn!("Could not read cursor position: {}", e);
                None
            }
        };
        return Ok((SharedDriver::new(driver), None, position));
    }

    let (driver, log) = build_driver(&config.driver)?;
    Ok((driver, log, None))
}

fn print_log(log: &RecordingLog) {
    for (event, at) in log.events().iter().zip(log.relative_times()) {
        println!("+{:>6}ms  {}", at.as_millis(), event.event);
    }
}

fn play(path: &Path, config: &AppConfig) -> anyhow::Result<()> {
    let script = load_script(path)?;

    let (driver, log, position) = open_driver(config)?;
    let mut session = SessionController::new(script, driver.clone(), &config.playback);
    if let Some(position) = position {
        session = session.with_initial_position(position);
    }

    let events = session.subscribe();
    session.start()?;
    for event in events.iter() {
        match event {
            SessionEvent::StepStarted { index, kind } => {
                tracing::info!("Step {} ({})", index, kind)
            }
            SessionEvent::Finished(_) => break,
            _ => {}
        }
    }
    let status = session.wait();

    if let Some(log) = log {
        print_log(&log);
    }
    println!("driver: {}", driver.stats());
    finish(status.state, status.events_emitted, status.last_error)
}

fn dry_run(path: &Path, config: &AppConfig) -> anyhow::Result<()> {
    let script = load_script(path)?;
    let clock = Arc::new(ManualClock::new());
    let driver = RecordingDriver::with_clock(clock.clone());
    let log = driver.log();

    let mut session =
        SessionController::with_clock(script, SharedDriver::new(driver), &config.playback, clock.clone());
    let status = session.run_to_completion()?;

    print_log(&log);
    println!("virtual duration: {}ms", clock.elapsed().as_millis());
    finish(status.state, status.events_emitted, status.last_error)
}

fn check(path: &Path, config: &AppConfig) -> anyhow::Result<()> {
    let script = load_script(path)?;
    let steps = script.resolve_all(&config.playback)?;
    println!(
        "'{}': {} steps OK, nominal duration {}ms",
        script.name,
        steps.len(),
        script.nominal_duration_ms()
    );
    Ok(())
}

fn relay(config: &AppConfig) -> anyhow::Result<()> {
    let (driver, log, position) = open_driver(config)?;
    let mut relay = MotionRelay::new(
        driver.clone(),
        MotionFilter::new(config.motion.clone()),
        config.playback.screen,
    );
    if let Some(position) = position {
        relay = relay.with_position(position);
    }

    tracing::info!("Relaying motion from stdin");
    let stdin = std::io::stdin();
    let stats = relay.run(stdin.lock())?;

    if let Some(log) = log {
        print_log(&log);
    }
    println!(
        "{} samples ({} rejected), {} moves, {} clicks",
        stats.samples, stats.rejected, stats.moves, stats.clicks
    );
    println!("driver: {}", driver.stats());
    Ok(())
}

fn finish(
    state: SessionState,
    emitted: usize,
    error: Option<mousecontrol::session::SessionFailure>,
) -> anyhow::Result<()> {
    println!("{} ({} events)", state, emitted);
    match (state, error) {
        (SessionState::Completed, _) => Ok(()),
        (_, Some(failure)) => Err(anyhow!("session {}: {}", state, failure)),
        (_, None) => Err(anyhow!("session {}", state)),
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = load_config(cli.config.as_deref())?;
    if let Some(backend) = cli.driver {
        config.driver.backend = backend;
    }

    let _guard = init_logging(&config.logging);
    tracing::info!("Starting mousecontrol ({:?})", cli.command);

    match &cli.command {
        Commands::Play { script } => play(script, &config),
        Commands::Check { script } => check(script, &config),
        Commands::DryRun { script } => dry_run(script, &config),
        Commands::Relay => relay(&config),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_play() {
        let cli = Cli::try_parse_from(["mousecontrol", "play", "demo.json", "--driver", "noop"]).unwrap();
        assert!(matches!(&cli.command, Commands::Play { script } if script == Path::new("demo.json")));
        assert_eq!(cli.driver, Some(DriverBackend::Noop));
    }

    #[test]
    fn test_parse_relay_needs_no_script() {
        let cli = Cli::try_parse_from(["mousecontrol", "relay", "--config", "c.toml"]).unwrap();
        assert!(matches!(cli.command, Commands::Relay));
        assert_eq!(cli.config, Some(PathBuf::from("c.toml")));
    }

    #[test]
    fn test_parse_dry_run_subcommand_name() {
        let cli = Cli::try_parse_from(["mousecontrol", "dry-run", "a.json"]).unwrap();
        assert!(matches!(cli.command, Commands::DryRun { .. }));
    }

    #[test]
    fn test_parse_errors() {
        assert!(Cli::try_parse_from(["mousecontrol"]).is_err());
        assert!(Cli::try_parse_from(["mousecontrol", "fly"]).is_err());
        assert!(Cli::try_parse_from(["mousecontrol", "play"]).is_err());
        assert!(Cli::try_parse_from(["mousecontrol", "play", "a.json", "--driver", "usb"]).is_err());
        assert!(Cli::try_parse_from(["mousecontrol", "check", "a.json", "b.json"]).is_err());
    }
}
