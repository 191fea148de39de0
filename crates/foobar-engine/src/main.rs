//! Terminal front-end for the Foobar Factory simulation.
//!
//! Loads `foobar-config.yaml`, applies environment and command-line
//! overrides, picks a pilot and plays decision rounds until the factory
//! owns the target number of robots.
//!
//! # Startup Sequence
//!
//! 1. Parse the command line
//! 2. Load configuration and apply overrides
//! 3. Initialize structured logging (tracing) on stderr, plus a JSON run
//!    log under `LOG_DIR` when one is configured
//! 4. Seed the random source
//! 5. Build the simulation, the pilot and the terminal callback
//! 6. Run the round loop
//! 7. Print and log the result

mod display;
mod error;
mod interactive;

use std::fs::{self, File};
use std::io::{self, IsTerminal as _};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::Context as _;
use clap::Parser;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

use foobar_core::config::{LoggingConfig, PilotKind, SimulationConfig};
use foobar_core::pacer::pacer_for;
use foobar_core::pilot::{DumbAutopilot, Pilot, SmartAutopilot};
use foobar_core::runner::{RunBounds, run_until_target};
use foobar_core::simulation::Simulation;

use crate::display::TerminalCallback;
use crate::error::EngineError;
use crate::interactive::InteractivePilot;

/// Run the foobar factory until it owns enough robots.
#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Cli {
    /// Path to the YAML configuration file.
    #[arg(short, long, default_value = "foobar-config.yaml")]
    config: PathBuf,

    /// Who runs the factory: smart, dumb or interactive.
    #[arg(short, long)]
    pilot: Option<PilotKind>,

    /// Number of robots to reach.
    #[arg(short, long)]
    target: Option<u32>,

    /// Real-time delay between ticks in milliseconds; 0 disables it.
    #[arg(short, long)]
    delay_ms: Option<u64>,

    /// Random seed for a reproducible run.
    #[arg(short, long)]
    seed: Option<u64>,

    /// Stop after this many ticks.
    #[arg(long)]
    max_ticks: Option<u64>,
}

impl Cli {
    /// Command-line values win over the file and the environment.
    fn apply(&self, config: &mut SimulationConfig) {
        if let Some(kind) = self.pilot {
            config.pilot.kind = kind;
        }
        if let Some(target) = self.target {
            config.simulation.target_workers = target;
        }
        if let Some(delay_ms) = self.delay_ms {
            config.world.tick_interval_ms = delay_ms;
        }
        if let Some(seed) = self.seed {
            config.world.seed = Some(seed);
        }
        if let Some(max_ticks) = self.max_ticks {
            config.simulation.max_ticks = max_ticks;
        }
    }
}

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration is invalid, the pilot fails, or the
/// simulation breaks an invariant.
fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = load_config(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;
    cli.apply(&mut config);
    config.validate().map_err(EngineError::from)?;

    let log_file = init_logging(&config.logging)?;

    info!(log_file = ?log_file, "foobar-engine starting");

    let seed = config.world.seed.unwrap_or_else(|| rand::rng().random());
    info!(
        seed,
        pilot = ?config.pilot.kind,
        initial_workers = config.factory.initial_workers,
        target_workers = config.simulation.target_workers,
        max_ticks = config.simulation.max_ticks,
        tick_interval_ms = config.world.tick_interval_ms,
        "Configuration loaded"
    );

    run(&config, seed).context("simulation failed")?;
    Ok(())
}

/// Load the configuration file, or defaults if it does not exist.
fn load_config(path: &Path) -> Result<SimulationConfig, EngineError> {
    if path.exists() {
        Ok(SimulationConfig::from_file(path)?)
    } else {
        let mut config = SimulationConfig::default();
        config.apply_env_overrides()?;
        Ok(config)
    }
}

/// Install the tracing subscriber: human-readable lines on stderr and, when
/// a log directory is configured, one JSON file per run. Returns the file's
/// path.
fn init_logging(config: &LoggingConfig) -> Result<Option<PathBuf>, EngineError> {
    let path = config.run_log_path(chrono::Utc::now().timestamp());
    let file_layer = match (&config.dir, &path) {
        (Some(dir), Some(path)) => {
            fs::create_dir_all(dir).map_err(|source| EngineError::LogFile {
                path: dir.clone(),
                source,
            })?;
            let file = File::create(path).map_err(|source| EngineError::LogFile {
                path: path.clone(),
                source,
            })?;
            Some(
                fmt::layer()
                    .json()
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
        }
        _ => None,
    };

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level)),
        )
        .with(fmt::layer().with_writer(io::stderr).with_target(true))
        .with(file_layer)
        .init();
    Ok(path)
}

fn run(config: &SimulationConfig, seed: u64) -> Result<(), EngineError> {
    let mut sim = Simulation::new(&config.factory, StdRng::seed_from_u64(seed))
        .with_pacer(pacer_for(config.world.tick_interval_ms));

    let mut pilot: Box<dyn Pilot> = match config.pilot.kind {
        PilotKind::Smart => Box::new(SmartAutopilot::new()),
        PilotKind::Dumb => Box::new(
            DumbAutopilot::new(config.simulation.target_workers)
                .with_initial_workers(config.factory.initial_workers),
        ),
        PilotKind::Interactive => Box::new(InteractivePilot::new(io::stdin().lock(), io::stdout())),
    };

    let mut callback =
        TerminalCallback::new(io::stdout()).with_clear_screen(io::stdout().is_terminal());
    let result = run_until_target(
        &mut sim,
        pilot.as_mut(),
        RunBounds::from(&config.simulation),
        &mut callback,
    )?;
    callback.finish(&result)?;

    info!(
        end_reason = ?result.end_reason,
        tick = result.final_snapshot.tick,
        robots = result.final_snapshot.worker_count(),
        rounds = result.rounds,
        rejected_batches = result.rejected_batches,
        "foobar-engine shutdown complete"
    );
    Ok(())
}
