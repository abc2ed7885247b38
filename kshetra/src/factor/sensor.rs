//! Laser beam sensor factor.
//!
//! # Model
//!
//! A beam that stopped at its last cell says two things: the cells it flew
//! through were empty, and the last cell holds the obstacle that reflected it.
//!
//! ```text
//! φ(x) = occlusion(x) + terminal(x)
//!
//! occlusion = 0                   all pass-through cells free
//!           = occluded_log_potential   otherwise
//! terminal  = 0                   last cell occupied
//!           = miss_log_potential       last cell free
//! ```
//!
//! Both penalties are negative, so the "free-before, occupied-at-end"
//! configuration is the unique maximum (φ = 0) and the beam prefers, in order:
//! hit > miss > occluded hit > occluded miss. The terminal term is independent
//! of the occlusion term, so marking the terminal cell occupied always raises
//! φ by `-miss_log_potential`.

use serde::{Deserialize, Serialize};

use crate::core::{Assignment, CellId, Occupancy, Pose2D};
use crate::error::{GridError, Result};

use super::Factor;

/// Log-potential scale of the beam model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorModel {
    /// Added when the terminal cell is free (beam reflected off nothing).
    ///
    /// Negative. Default: -ln 4
    pub miss_log_potential: f64,

    /// Added when any pass-through cell is occupied (beam went through a wall).
    ///
    /// Negative. Default: -2 ln 4
    pub occluded_log_potential: f64,
}

impl Default for SensorModel {
    fn default() -> Self {
        Self {
            miss_log_potential: -1.3863,
            occluded_log_potential: -2.7726,
        }
    }
}

impl SensorModel {
    /// Both penalties must be finite and strictly negative.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("miss_log_potential", self.miss_log_potential),
            ("occluded_log_potential", self.occluded_log_potential),
        ] {
            if !value.is_finite() || value >= 0.0 {
                return Err(GridError::InvalidConfig(format!(
                    "{} must be negative, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

/// Constraint over the cells crossed by one laser beam.
///
/// Immutable once built. The pose and range are kept for export only.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorFactor {
    cells: Vec<CellId>,
    pose: Pose2D,
    range: f64,
    model: SensorModel,
}

impl SensorFactor {
    /// Create a factor over `cells` (traversal order, terminal cell last).
    ///
    /// Returns `None` for an empty cell list: a beam that crossed no cell
    /// carries no constraint.
    pub fn new(cells: Vec<CellId>, pose: Pose2D, range: f64, model: SensorModel) -> Option<Self> {
        if cells.is_empty() {
            return None;
        }
        Some(Self {
            cells,
            pose,
            range,
            model,
        })
    }

    /// Cell where the beam ended.
    pub fn terminal(&self) -> CellId {
        // Non-empty by construction
        self.cells[self.cells.len() - 1]
    }

    /// Cells the beam flew through before the terminal cell.
    pub fn pass_through(&self) -> &[CellId] {
        &self.cells[..self.cells.len() - 1]
    }

    /// Originating sensor pose.
    pub fn pose(&self) -> &Pose2D {
        &self.pose
    }

    /// Measured range.
    pub fn range(&self) -> f64 {
        self.range
    }

    /// Whether `assignment` is the beam's preferred configuration.
    pub fn is_consistent(&self, assignment: &Assignment) -> bool {
        !self.is_occluded(assignment) && assignment.get(self.terminal()).is_occupied()
    }

    fn is_occluded(&self, assignment: &Assignment) -> bool {
        self.pass_through()
            .iter()
            .any(|&cell| assignment.get(cell) == Occupancy::Occupied)
    }
}

impl Factor for SensorFactor {
    fn cells(&self) -> &[CellId] {
        &self.cells
    }

    fn evaluate(&self, assignment: &Assignment) -> f64 {
        let mut value = 0.0;
        if self.is_occluded(assignment) {
            value += self.model.occluded_log_potential;
        }
        if !assignment.get(self.terminal()).is_occupied() {
            value += self.model.miss_log_potential;
        }
        value
    }
}
