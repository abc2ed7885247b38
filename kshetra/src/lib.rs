//! # Kshetra
//!
//! Probabilistic 2D occupancy grid built as a factor graph.
//!
//! ## Overview
//!
//! Every grid cell is a binary variable (free / occupied). Laser beams become
//! sensor factors over the cells they cross, optional priors bias single
//! cells, and belief estimators turn the graph into per-cell occupancy
//! probabilities:
//!
//! - **Exact** - neighbourhood enumeration, for short beams
//! - **Metropolis** - Metropolis-Hastings sampling over the whole grid
//! - **Independent** - per-cell log-odds baseline
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use kshetra::{BeliefEstimator, DynEstimator, EstimatorKind, OccupancyGrid, Pose2D};
//!
//! let mut grid = OccupancyGrid::with_geometry(20.0, 20.0, 0.2)?;
//! grid.add_laser(&Pose2D::new(0.0, 0.0, 0.0), 4.5);
//!
//! let mut estimator = DynEstimator::new(EstimatorKind::Metropolis);
//! let marginals = estimator.estimate(&grid)?;
//! ```
//!
//! ## Coordinate System
//!
//! - X: right, Y: up, theta CCW from +X, all in meters / radians
//! - The grid is centered on the world origin; row 0 is the top (max Y)

// Core types
pub mod core;

pub mod error;

// Grid geometry, ray tracing, factor graph
pub mod grid;

// Factor potentials
pub mod factor;

// Belief estimation
pub mod inference;

// Unified configuration
pub mod config;

// Persistence (save/load)
pub mod io;

// Re-export commonly used types
pub use core::{Assignment, CellId, Occupancy, Pose2D};

pub use error::{GridError, Result};

pub use grid::{
    BeamRecord, GridConfig, GridIndexer, OccupancyGrid, OccupancyGridConfig, RayConfig, RayTrace,
    RayTracer,
};

pub use factor::{Factor, FactorId, PriorFactor, SensorFactor, SensorModel};

pub use inference::{
    BeliefEstimator, DynEstimator, DynEstimatorConfig, EstimatorKind, ExactLocalEstimator,
    IndependentCellEstimator, Marginals, MetropolisEstimator, MetropolisSampler, Proposal,
};

pub use config::{ConfigLoadError, KshetraConfig};

pub use io::PersistenceError;
