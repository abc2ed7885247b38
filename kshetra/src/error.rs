//! Error types for grid construction, factor insertion and inference.

use thiserror::Error;

use crate::core::CellId;

/// Errors raised by the grid, factor graph and estimators.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GridError {
    /// World point lies outside the grid.
    #[error("point ({x:.3}, {y:.3}) is outside the grid")]
    InvalidIndex { x: f64, y: f64 },

    /// Cell identifier beyond the grid's cell count.
    #[error("cell {cell} out of range (grid has {cell_count} cells)")]
    CellOutOfRange { cell: CellId, cell_count: usize },

    /// Prior probability not strictly inside (0, 1).
    #[error("prior probability {0} must lie strictly between 0 and 1")]
    InvalidProbability(f64),

    /// Enumerator advanced past its completion boundary without a reset.
    #[error("cartesian product advanced after exhaustion")]
    EnumerationExhausted,

    /// Grid geometry or estimator configuration is unusable.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Exact enumeration would visit too many joint assignments.
    #[error("neighborhood of cell {cell} has {size} variables (limit {limit})")]
    NeighborhoodTooLarge {
        cell: CellId,
        size: usize,
        limit: usize,
    },
}

/// Result alias for grid operations.
pub type Result<T> = std::result::Result<T, GridError>;
