//! Belief estimation over the occupancy grid.
//!
//! Every estimator turns an [`OccupancyGrid`] into per-cell [`Marginals`]
//! through the [`BeliefEstimator`] trait. [`DynEstimator`] selects one at
//! runtime from an [`EstimatorKind`].
//!
//! # Estimators
//!
//! - **Exact**: enumerates each cell's neighbourhood (small graphs only)
//! - **Metropolis**: Metropolis-Hastings chain over the whole grid
//! - **Independent**: per-cell log-odds, ignoring factor coupling
//!
//! # Example
//!
//! ```ignore
//! use kshetra::inference::{BeliefEstimator, DynEstimator, EstimatorKind};
//!
//! let mut estimator = DynEstimator::new(EstimatorKind::Metropolis);
//! let marginals = estimator.estimate(&grid)?;
//! println!("p(center) = {:?}", marginals.get(center));
//! ```

pub mod enumerator;
mod exact;
mod independent;
mod marginals;
mod metropolis;

pub use enumerator::{
    Assign, BinarySpace, CartesianProduct, SampleSpace, max_of, summary_of,
};
pub use exact::{ExactConfig, ExactLocalEstimator};
pub use independent::{IndependentCellEstimator, IndependentConfig};
pub use marginals::Marginals;
pub use metropolis::{
    MetropolisConfig, MetropolisEstimator, MetropolisSampler, Proposal, SamplerState,
    SamplerStats,
};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::grid::OccupancyGrid;

/// Produces per-cell occupancy probabilities for a grid.
pub trait BeliefEstimator {
    /// Estimate marginals. The grid is only read.
    fn estimate(&mut self, grid: &OccupancyGrid) -> Result<Marginals>;
}

/// Available belief estimators.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EstimatorKind {
    /// Neighbourhood enumeration.
    ///
    /// Exponential in the neighbourhood size; for short beams only.
    Exact,

    /// Metropolis-Hastings sampling.
    #[default]
    Metropolis,

    /// Independent per-cell log-odds.
    Independent,
}

impl std::fmt::Display for EstimatorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EstimatorKind::Exact => write!(f, "Exact"),
            EstimatorKind::Metropolis => write!(f, "Metropolis"),
            EstimatorKind::Independent => write!(f, "Independent"),
        }
    }
}

impl EstimatorKind {
    /// Get a short description of this estimator.
    pub fn description(&self) -> &'static str {
        match self {
            EstimatorKind::Exact => "Exact local marginals by enumeration",
            EstimatorKind::Metropolis => "Metropolis-Hastings sampling",
            EstimatorKind::Independent => "Independent per-cell log-odds",
        }
    }

    /// Returns all available estimators.
    pub fn all() -> &'static [EstimatorKind] {
        &[
            EstimatorKind::Exact,
            EstimatorKind::Metropolis,
            EstimatorKind::Independent,
        ]
    }
}

/// Configuration for all estimators.
///
/// Only the section matching the selected [`EstimatorKind`] is used.
#[derive(Debug, Clone, Default)]
pub struct DynEstimatorConfig {
    pub exact: ExactConfig,
    pub metropolis: MetropolisConfig,
    pub independent: IndependentConfig,
}

/// Runtime-selectable belief estimator.
#[derive(Debug, Clone)]
pub enum DynEstimator {
    Exact(ExactLocalEstimator),
    Metropolis(MetropolisEstimator),
    Independent(IndependentCellEstimator),
}

impl DynEstimator {
    /// Create an estimator with default configuration.
    pub fn new(kind: EstimatorKind) -> Self {
        Self::new_with_config(kind, DynEstimatorConfig::default())
    }

    /// Create an estimator with custom configuration.
    pub fn new_with_config(kind: EstimatorKind, config: DynEstimatorConfig) -> Self {
        match kind {
            EstimatorKind::Exact => DynEstimator::Exact(ExactLocalEstimator::new(config.exact)),
            EstimatorKind::Metropolis => {
                DynEstimator::Metropolis(MetropolisEstimator::new(config.metropolis))
            }
            EstimatorKind::Independent => {
                DynEstimator::Independent(IndependentCellEstimator::new(config.independent))
            }
        }
    }

    /// Get the estimator kind.
    pub fn kind(&self) -> EstimatorKind {
        match self {
            DynEstimator::Exact(_) => EstimatorKind::Exact,
            DynEstimator::Metropolis(_) => EstimatorKind::Metropolis,
            DynEstimator::Independent(_) => EstimatorKind::Independent,
        }
    }
}

impl BeliefEstimator for DynEstimator {
    fn estimate(&mut self, grid: &OccupancyGrid) -> Result<Marginals> {
        match self {
            DynEstimator::Exact(e) => e.estimate(grid),
            DynEstimator::Metropolis(e) => e.estimate(grid),
            DynEstimator::Independent(e) => e.estimate(grid),
        }
    }
}
