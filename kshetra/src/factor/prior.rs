//! Per-cell prior factor.

use crate::core::{Assignment, CellId, Occupancy};
use crate::error::{GridError, Result};

use super::Factor;

/// Prior belief that one cell is occupied.
///
/// Holds the table `[1 - p, p]` indexed by occupancy value, evaluated as the
/// log of the matching entry.
#[derive(Debug, Clone, PartialEq)]
pub struct PriorFactor {
    cell: [CellId; 1],
    table: [f64; 2],
}

impl PriorFactor {
    /// Create a prior with occupancy probability `probability`.
    ///
    /// The probability must lie strictly inside (0, 1); the endpoints would
    /// turn the prior into a hard constraint with an infinite log-potential.
    pub fn new(cell: CellId, probability: f64) -> Result<Self> {
        if !(probability > 0.0 && probability < 1.0) {
            return Err(GridError::InvalidProbability(probability));
        }
        Ok(Self {
            cell: [cell],
            table: [1.0 - probability, probability],
        })
    }

    /// The constrained cell.
    pub fn cell(&self) -> CellId {
        self.cell[0]
    }

    /// Prior occupancy probability.
    pub fn probability(&self) -> f64 {
        self.table[1]
    }

    /// Table entry for `value`.
    pub fn table_value(&self, value: Occupancy) -> f64 {
        self.table[value.value() as usize]
    }
}

impl Factor for PriorFactor {
    fn cells(&self) -> &[CellId] {
        &self.cell
    }

    fn evaluate(&self, assignment: &Assignment) -> f64 {
        self.table_value(assignment.get(self.cell())).ln()
    }
}
