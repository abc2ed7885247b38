//! Metropolis-Hastings sampling over the full grid.
//!
//! The chain walks a global assignment, starting with every cell free. Each
//! iteration proposes flipping one cell, scores the flip with the factors
//! touching that cell only, and accepts it with probability `min(1, exp(Δ))`:
//!
//! ```text
//! Δ = local_potential(c, x') - local_potential(c, x)
//! ```
//!
//! Both proposals pick the cell independently of the current state and a flip
//! is its own inverse, so the proposal is symmetric and the chain targets the
//! grid's joint distribution. The estimate of `p(c)` is the fraction of
//! iterations after which `c` was occupied.

use clap::ValueEnum;
use rand::distr::Distribution;
use rand::distr::weighted::WeightedIndex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::core::{Assignment, CellId};
use crate::error::{GridError, Result};
use crate::grid::OccupancyGrid;

use super::{BeliefEstimator, Marginals};

/// How the next cell to flip is chosen.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Proposal {
    /// Every cell equally likely.
    #[default]
    Uniform,

    /// Proportional to the cell's heat weight.
    ///
    /// Beam terminal cells are proposed more often than the rest.
    HeatWeighted,
}

impl std::fmt::Display for Proposal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Proposal::Uniform => write!(f, "uniform"),
            Proposal::HeatWeighted => write!(f, "heat-weighted"),
        }
    }
}

/// Configuration for Metropolis-Hastings sampling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetropolisConfig {
    /// Iterations for a full run.
    /// Default: 100000
    pub iterations: u64,

    /// Random seed for deterministic behavior (0 for random).
    pub seed: u64,

    /// Cell proposal strategy.
    pub proposal: Proposal,
}

impl Default for MetropolisConfig {
    fn default() -> Self {
        Self {
            iterations: 100_000,
            seed: 0,
            proposal: Proposal::Uniform,
        }
    }
}

/// Sampler lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SamplerState {
    /// No iteration run yet.
    Idle,
    /// Fewer than the configured iterations run.
    Sampling,
    /// Configured iteration count reached.
    Converged,
}

/// Chain diagnostics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct SamplerStats {
    pub iterations: u64,
    pub accepted: u64,
}

impl SamplerStats {
    /// Accepted moves over iterations, 0 before the first iteration.
    pub fn acceptance_rate(&self) -> f64 {
        if self.iterations == 0 {
            0.0
        } else {
            self.accepted as f64 / self.iterations as f64
        }
    }
}

/// Metropolis-Hastings chain bound to one grid.
///
/// Runs can be split: [`run`](Self::run) may be called repeatedly and
/// [`marginals`](Self::marginals) read between calls. Stopping early simply
/// yields estimates from fewer samples.
#[derive(Debug)]
pub struct MetropolisSampler<'g> {
    grid: &'g OccupancyGrid,
    config: MetropolisConfig,
    rng: StdRng,

    /// `None` for the uniform proposal.
    weighted: Option<WeightedIndex<f64>>,

    assignment: Assignment,
    state: SamplerState,
    stats: SamplerStats,

    /// Iterations after which each cell was occupied, excluding its current
    /// occupied streak.
    occupied_iterations: Vec<u64>,

    /// Iteration at which each cell's current occupied streak began.
    ///
    /// Only meaningful while the cell is occupied.
    occupied_since: Vec<u64>,
}

impl<'g> MetropolisSampler<'g> {
    /// Create a sampler with every cell free.
    ///
    /// Fails with [`GridError::InvalidConfig`] when the heat-weighted
    /// proposal cannot be built (no positive weight).
    pub fn new(grid: &'g OccupancyGrid, config: MetropolisConfig) -> Result<Self> {
        let rng = if config.seed == 0 {
            StdRng::from_os_rng()
        } else {
            StdRng::seed_from_u64(config.seed)
        };

        let weighted = match config.proposal {
            Proposal::Uniform => None,
            Proposal::HeatWeighted => Some(
                WeightedIndex::new(grid.heat_map().iter().copied()).map_err(|e| {
                    GridError::InvalidConfig(format!("heat-weighted proposal: {}", e))
                })?,
            ),
        };

        let cell_count = grid.cell_count();
        Ok(Self {
            grid,
            config,
            rng,
            weighted,
            assignment: grid.empty_assignment(),
            state: SamplerState::Idle,
            stats: SamplerStats::default(),
            occupied_iterations: vec![0; cell_count],
            occupied_since: vec![0; cell_count],
        })
    }

    pub fn state(&self) -> SamplerState {
        self.state
    }

    pub fn stats(&self) -> SamplerStats {
        self.stats
    }

    pub fn config(&self) -> &MetropolisConfig {
        &self.config
    }

    /// Current state of the chain.
    pub fn assignment(&self) -> &Assignment {
        &self.assignment
    }

    /// Run `iterations` more steps.
    pub fn run(&mut self, iterations: u64) {
        if iterations == 0 {
            return;
        }
        if self.state == SamplerState::Idle {
            self.state = SamplerState::Sampling;
        }

        let accepted_before = self.stats.accepted;
        for _ in 0..iterations {
            self.step();
        }

        log::debug!(
            "Metropolis: {} iterations, {} accepted in this run ({} total)",
            iterations,
            self.stats.accepted - accepted_before,
            self.stats.iterations
        );

        if self.stats.iterations >= self.config.iterations {
            self.state = SamplerState::Converged;
        }
    }

    /// Run until the configured iteration count is reached.
    pub fn run_to_completion(&mut self) {
        let remaining = self.config.iterations.saturating_sub(self.stats.iterations);
        self.run(remaining);
        self.state = SamplerState::Converged;
    }

    /// One proposal plus accept / reject.
    pub fn step(&mut self) {
        let cell = self.propose();

        let before = self.grid.local_potential(cell, &self.assignment);
        let value = self.assignment.flip(cell);
        let after = self.grid.local_potential(cell, &self.assignment);
        let delta = after - before;

        self.stats.iterations += 1;
        let t = self.stats.iterations;

        let accept = delta >= 0.0 || self.rng.random::<f64>() < delta.exp();
        if !accept {
            self.assignment.flip(cell);
            return;
        }

        self.stats.accepted += 1;
        let i = cell.index();
        if value.is_occupied() {
            self.occupied_since[i] = t;
        } else {
            self.occupied_iterations[i] += t - self.occupied_since[i];
        }
    }

    /// Occupied fraction per cell over the iterations run so far.
    ///
    /// All zeros before the first iteration (the chain starts all free).
    pub fn marginals(&self) -> Marginals {
        let t = self.stats.iterations;
        let mut marginals = Marginals::filled(self.grid.width(), self.grid.height(), 0.0);
        if t == 0 {
            return marginals;
        }

        for i in 0..self.grid.cell_count() {
            let cell = CellId(i);
            let mut count = self.occupied_iterations[i];
            if self.assignment.get(cell).is_occupied() {
                count += t - self.occupied_since[i] + 1;
            }
            marginals.set(cell, count as f64 / t as f64);
        }
        marginals
    }

    fn propose(&mut self) -> CellId {
        match &self.weighted {
            Some(dist) => CellId(dist.sample(&mut self.rng)),
            None => CellId(self.rng.random_range(0..self.grid.cell_count())),
        }
    }
}

/// [`BeliefEstimator`] running a fresh chain per call.
#[derive(Debug, Clone, Default)]
pub struct MetropolisEstimator {
    config: MetropolisConfig,
    last_stats: Option<SamplerStats>,
}

impl MetropolisEstimator {
    pub fn new(config: MetropolisConfig) -> Self {
        Self {
            config,
            last_stats: None,
        }
    }

    pub fn config(&self) -> &MetropolisConfig {
        &self.config
    }

    /// Diagnostics of the most recent run.
    pub fn last_stats(&self) -> Option<SamplerStats> {
        self.last_stats
    }
}

impl BeliefEstimator for MetropolisEstimator {
    fn estimate(&mut self, grid: &OccupancyGrid) -> Result<Marginals> {
        let mut sampler = MetropolisSampler::new(grid, self.config.clone())?;
        sampler.run_to_completion();

        let stats = sampler.stats();
        log::info!(
            "Metropolis ({} proposal): {} iterations, acceptance {:.1}%",
            self.config.proposal,
            stats.iterations,
            stats.acceptance_rate() * 100.0
        );
        self.last_stats = Some(stats);
        Ok(sampler.marginals())
    }
}
