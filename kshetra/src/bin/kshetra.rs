//! Kshetra command line driver.
//!
//! Builds an occupancy grid from a laser log, runs a belief estimator and
//! writes the requested outputs.
//!
//! ```text
//! kshetra 20 20 0.2 --lasers data/lasers.lsr --estimator metropolis \
//!     --iterations 200000 --seed 7 --marginals out/marginals.txt --heat-map out/heat.ppm
//! ```

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Parser;

use kshetra::config::KshetraConfig;
use kshetra::inference::{BeliefEstimator, DynEstimator, EstimatorKind, Proposal};
use kshetra::io::{load_laser_log, save_heat_map, save_laser_log, save_marginals};
use kshetra::OccupancyGrid;

/// Factor-graph occupancy grid estimation from laser measurements
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Grid width (meters)
    width: f64,

    /// Grid height (meters)
    height: f64,

    /// Cell size (meters)
    resolution: f64,

    /// Configuration file path (defaults to configs/config.yaml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Laser log to load (`x y theta range` per line)
    #[arg(short, long)]
    lasers: Option<PathBuf>,

    /// Belief estimator (overrides the config file)
    #[arg(short, long, value_enum)]
    estimator: Option<EstimatorKind>,

    /// Metropolis iterations
    #[arg(short, long)]
    iterations: Option<u64>,

    /// Metropolis seed (0 for random)
    #[arg(long)]
    seed: Option<u64>,

    /// Metropolis cell proposal
    #[arg(long, value_enum)]
    proposal: Option<Proposal>,

    /// Write marginals to this file
    #[arg(long)]
    marginals: Option<PathBuf>,

    /// Write the heat map (PPM) to this file
    #[arg(long)]
    heat_map: Option<PathBuf>,

    /// Write accepted beams to this file
    #[arg(long)]
    save_lasers: Option<PathBuf>,
}

fn load_config(args: &Args) -> Result<KshetraConfig, Box<dyn std::error::Error>> {
    let mut config = match &args.config {
        Some(path) => KshetraConfig::load(path)?,
        None => KshetraConfig::load_default()?,
    };

    // Positional geometry always wins
    config.grid.width = args.width;
    config.grid.height = args.height;
    config.grid.resolution = args.resolution;

    if let Some(kind) = args.estimator {
        config.estimator = kind;
    }
    if let Some(iterations) = args.iterations {
        config.metropolis.iterations = iterations;
    }
    if let Some(seed) = args.seed {
        config.metropolis.seed = seed;
    }
    if let Some(proposal) = args.proposal {
        config.metropolis.proposal = proposal;
    }

    Ok(config)
}

fn load_grid(
    config: &KshetraConfig,
    lasers: Option<&Path>,
) -> Result<OccupancyGrid, Box<dyn std::error::Error>> {
    let mut grid = OccupancyGrid::new(config.to_grid_config())?;
    log::info!(
        "Grid: {}x{} cells at {} m",
        grid.width(),
        grid.height(),
        config.grid.resolution
    );

    if let Some(path) = lasers {
        let beams = load_laser_log(path)?;
        let mut dropped = 0;
        for beam in &beams {
            if grid.add_laser(&beam.pose(), beam.range).is_none() {
                dropped += 1;
            }
        }
        if dropped > 0 {
            log::warn!(
                "{} of {} beams crossed no cell and were skipped",
                dropped,
                beams.len()
            );
        }
        log::info!("Added {} laser factors", grid.laser_count());
    }

    Ok(grid)
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(args)?;
    let grid = load_grid(&config, args.lasers.as_deref())?;

    if let Some(path) = &args.save_lasers {
        save_laser_log(path, &grid.beams())?;
    }
    if let Some(path) = &args.heat_map {
        save_heat_map(path, &grid)?;
    }

    log::info!(
        "Estimator: {} ({})",
        config.estimator,
        config.estimator.description()
    );
    let mut estimator =
        DynEstimator::new_with_config(config.estimator, config.to_estimator_config());

    let start = Instant::now();
    let marginals = estimator.estimate(&grid)?;
    log::info!("Estimation took {:.3} s", start.elapsed().as_secs_f64());

    let map = marginals.to_assignment(0.5);
    log::info!(
        "{} cells above 0.5, potential {:.4}",
        map.occupied_count(),
        grid.total_potential(&map)
    );

    if let Some(path) = &args.marginals {
        save_marginals(path, &marginals)?;
    }

    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(|buf, record| writeln!(buf, "[{}] {}", record.level(), record.args()))
        .init();

    let args = Args::parse();
    if let Err(e) = run(&args) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}
