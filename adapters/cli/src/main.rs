#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a decay cascade and prints its report.

mod config;

use std::{io, path::PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use decay_cascade_core::{CascadeConfig, CascadeOutcome, Clock, LayerReport};
use decay_cascade_engine::{CascadeController, NoPacing, Pacer, SimulatedTransition, ThreadPacer};
use decay_cascade_system_decay::{SeededClock, SystemClock};
use tracing_subscriber::EnvFilter;

/// Start of the simulated timeline used by seeded runs.
const SEEDED_START_MICROS: u64 = 1_700_000_000_000_000;

/// Runs the layered decay cascade and prints a human-readable report.
#[derive(Debug, Parser)]
#[command(name = "decay-cascade", version, about)]
pub(crate) struct Cli {
    /// TOML file with a `[cascade]` table overriding the defaults.
    #[arg(long, value_name = "PATH")]
    pub(crate) config: Option<PathBuf>,
    /// Number of layers in the schedule.
    #[arg(long)]
    pub(crate) layers: Option<u32>,
    /// Visit every n-th layer only.
    #[arg(long)]
    pub(crate) stride: Option<u32>,
    /// Energy at or below which the cascade converges.
    #[arg(long)]
    pub(crate) threshold: Option<f64>,
    /// Dispersion coefficient α.
    #[arg(long)]
    pub(crate) coefficient: Option<f64>,
    /// Replace the wall clock with a seeded clock for reproducible runs.
    #[arg(long)]
    pub(crate) seed: Option<u64>,
    /// Skip the pause between layers.
    #[arg(long)]
    pub(crate) no_pacing: bool,
}

/// Entry point for the decay cascade command-line interface.
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = config::resolve(&cli)?;
    tracing::info!(
        layers = config.layer_count,
        stride = config.stride,
        threshold = config.threshold,
        seeded = cli.seed.is_some(),
        "starting cascade"
    );

    let mut system_clock = SystemClock;
    let mut seeded_clock;
    let clock: &mut dyn Clock = match cli.seed {
        Some(seed) => {
            seeded_clock = SeededClock::new(seed, SEEDED_START_MICROS);
            &mut seeded_clock
        }
        None => &mut system_clock,
    };

    let (layers, outcome) = if cli.no_pacing {
        simulate(config.clone(), clock, NoPacing)?
    } else {
        simulate(config.clone(), clock, ThreadPacer)?
    };

    let stdout = io::stdout();
    decay_cascade_reporting::render_run(&mut stdout.lock(), &config, &layers, &outcome)
        .context("failed to print cascade report")?;
    Ok(())
}

fn simulate<C, P>(
    config: CascadeConfig,
    clock: C,
    pacer: P,
) -> Result<(Vec<LayerReport>, CascadeOutcome)>
where
    C: Clock,
    P: Pacer,
{
    let mut controller = CascadeController::new(config, clock, pacer, SimulatedTransition)
        .context("failed to construct cascade controller")?;
    let mut layers = Vec::new();
    let outcome = controller
        .run(&mut layers)
        .context("cascade aborted")?;
    Ok((layers, outcome))
}
