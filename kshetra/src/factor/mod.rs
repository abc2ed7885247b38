//! Factors over binary cell occupancy.
//!
//! A factor maps an [`Assignment`] restricted to its cells to a
//! log-potential. The grid's energy for an assignment is the sum of all factor
//! values, so higher is more likely.
//!
//! - [`PriorFactor`]: a per-cell `[1 - p, p]` table
//! - [`SensorFactor`]: one laser beam over the cells it crossed

mod prior;
mod sensor;

pub use prior::PriorFactor;
pub use sensor::{SensorFactor, SensorModel};

use crate::core::{Assignment, CellId};

/// A potential over a fixed set of cells.
pub trait Factor {
    /// Cells this factor depends on.
    fn cells(&self) -> &[CellId];

    /// Log-potential of `assignment`.
    ///
    /// Cells absent from the assignment read as free.
    fn evaluate(&self, assignment: &Assignment) -> f64;

    /// Potential in probability space, `exp(evaluate)`.
    fn probability_value(&self, assignment: &Assignment) -> f64 {
        self.evaluate(assignment).exp()
    }
}

/// Position of a factor inside the occupancy grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FactorId {
    /// Index into the prior factors.
    Prior(usize),
    /// Index into the sensor (laser) factors.
    Sensor(usize),
}
