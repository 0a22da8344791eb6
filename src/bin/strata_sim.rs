//! Headless simulation runner
//!
//! Builds a procedural tier tree, runs it for a number of frames and
//! writes a JSON report with final statistics, history and summaries.

use std::path::PathBuf;
use std::time::Instant;

use clap::{Parser, ValueEnum};
use serde::Serialize;

use strata::core::types::TierId;
use strata::renormalization::BeliefCell;
use strata::simulation::{HistorySample, SimulationStats};
use strata::{ProceduralGenerator, Result, SimulationConfig, SimulationController, TierLadder, TierSummary};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Ladder {
    Astronomical,
    Habitat,
}

impl From<Ladder> for TierLadder {
    fn from(ladder: Ladder) -> Self {
        match ladder {
            Ladder::Astronomical => TierLadder::Astronomical,
            Ladder::Habitat => TierLadder::Habitat,
        }
    }
}

/// Strata headless runner
#[derive(Parser, Debug)]
#[command(name = "strata_sim")]
#[command(about = "Run a hierarchical renormalization simulation and report the result")]
struct Args {
    /// Tier ladder to generate
    #[arg(long, value_enum, default_value_t = Ladder::Astronomical)]
    ladder: Ladder,

    /// Levels in the generated tree (1 = root only)
    #[arg(long, default_value_t = 4)]
    depth: usize,

    /// Children per generated tier
    #[arg(long, default_value_t = 3)]
    branching: u32,

    /// Frames to simulate
    #[arg(long, default_value_t = 1000)]
    ticks: usize,

    /// PRNG seed; overrides the config file
    #[arg(long)]
    seed: Option<u64>,

    /// TOML config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Tier ids to zoom into for the first half of the run
    #[arg(long)]
    zoom: Vec<u32>,

    /// Where to write the JSON report
    #[arg(long, default_value = "strata_report.json")]
    output: PathBuf,
}

#[derive(Serialize)]
struct Report {
    seed: u64,
    ticks: u64,
    elapsed_ms: f64,
    stats: SimulationStats,
    events_recorded: u64,
    history: Vec<HistorySample>,
    summaries: Vec<TierSummary>,
    heatmap: Vec<BeliefCell>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("strata=info")),
        )
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => SimulationConfig::load(path)?,
        None => SimulationConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.controller.seed = seed;
    }
    let seed = config.controller.seed;

    let generator = ProceduralGenerator::new(args.ladder.into(), args.branching, seed);
    let mut sim = SimulationController::new(config, Box::new(generator), args.depth)?;

    for id in &args.zoom {
        sim.zoom_in(TierId(*id))?;
    }

    let start = Instant::now();
    sim.start();
    let half = args.ticks / 2;
    sim.run_frames(half, 1.0)?;
    for id in &args.zoom {
        sim.zoom_out(TierId(*id))?;
    }
    sim.run_frames(args.ticks - half, 1.0)?;
    sim.stop();
    let elapsed = start.elapsed();

    let stats = sim.stats().clone();
    tracing::info!(
        ticks = sim.tick(),
        population = stats.total_population,
        events = sim.events().total_recorded(),
        clamps = stats.clamp_hits,
        elapsed_ms = elapsed.as_secs_f64() * 1000.0,
        "run complete"
    );

    let report = Report {
        seed,
        ticks: sim.tick(),
        elapsed_ms: elapsed.as_secs_f64() * 1000.0,
        stats,
        events_recorded: sim.events().total_recorded(),
        history: sim.get_history().iter().copied().collect(),
        summaries: sim.get_all_tier_summaries(),
        heatmap: sim.get_belief_heatmap(),
    };

    std::fs::write(&args.output, serde_json::to_string_pretty(&report)?)?;
    tracing::info!(path = %args.output.display(), "report written");
    Ok(())
}
