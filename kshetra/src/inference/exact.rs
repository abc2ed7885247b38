//! Exact local marginals by neighbourhood enumeration.
//!
//! For each cell `c` with neighbourhood `N(c)` (cells sharing a factor with
//! `c`), every assignment of `N(c) \ {c}` is enumerated with `c` held at each
//! value:
//!
//! ```text
//! S(v) = Σ_{x_N} exp(local_potential(c, x_N ∪ {c = v}))
//! p(c) = S(1) / (S(0) + S(1))
//! ```
//!
//! Cells outside the neighbourhood read as free. Cost is `2^|N(c)|` factor
//! evaluations per cell, so neighbourhoods above `max_neighborhood` are
//! rejected instead of enumerated. `estimate` leaves such cells at 0.5.

use serde::{Deserialize, Serialize};

use crate::core::{Assignment, CellId, Occupancy};
use crate::error::{GridError, Result};
use crate::grid::OccupancyGrid;

use super::enumerator::{BinarySpace, max_of, summary_of};
use super::{BeliefEstimator, Marginals};

/// Configuration for [`ExactLocalEstimator`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExactConfig {
    /// Largest neighbourhood (pivot excluded) that will be enumerated.
    ///
    /// Default: 16 (65536 assignments per pivot value)
    pub max_neighborhood: usize,
}

impl Default for ExactConfig {
    fn default() -> Self {
        Self {
            max_neighborhood: 16,
        }
    }
}

/// Per-cell exact marginals over the local neighbourhood.
#[derive(Debug, Clone, Default)]
pub struct ExactLocalEstimator {
    config: ExactConfig,
}

impl ExactLocalEstimator {
    pub fn new(config: ExactConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExactConfig {
        &self.config
    }

    /// Occupancy probability of a single cell.
    pub fn cell_marginal(&self, grid: &OccupancyGrid, cell: CellId) -> Result<f64> {
        let neighborhood = self.neighborhood(grid, cell)?;

        // Shift by the best log-potential so exp() cannot underflow to 0/0
        let best_free = self.best(grid, cell, &neighborhood, Occupancy::Free)?;
        let best_occupied = self.best(grid, cell, &neighborhood, Occupancy::Occupied)?;
        let shift = best_free.max(best_occupied);

        let free = self.summary(grid, cell, &neighborhood, Occupancy::Free, shift)?;
        let occupied = self.summary(grid, cell, &neighborhood, Occupancy::Occupied, shift)?;

        Ok(occupied / (free + occupied))
    }

    /// Max-marginal decoding: each cell takes the value whose best
    /// neighbourhood assignment scores higher. Ties decode as free.
    pub fn map_assignment(&self, grid: &OccupancyGrid) -> Result<Assignment> {
        let mut assignment = Assignment::with_capacity(grid.cell_count());
        for cell in (0..grid.cell_count()).map(CellId) {
            let neighborhood = self.neighborhood(grid, cell)?;
            let free = self.best(grid, cell, &neighborhood, Occupancy::Free)?;
            let occupied = self.best(grid, cell, &neighborhood, Occupancy::Occupied)?;
            assignment.set(cell, Occupancy::from(occupied > free));
        }
        Ok(assignment)
    }

    fn neighborhood(&self, grid: &OccupancyGrid, cell: CellId) -> Result<Vec<CellId>> {
        let neighborhood = grid.dependent_cells(cell);
        let size = neighborhood.len().saturating_sub(1);
        if size > self.config.max_neighborhood {
            return Err(GridError::NeighborhoodTooLarge {
                cell,
                size,
                limit: self.config.max_neighborhood,
            });
        }
        Ok(neighborhood)
    }

    fn best(
        &self,
        grid: &OccupancyGrid,
        cell: CellId,
        neighborhood: &[CellId],
        value: Occupancy,
    ) -> Result<f64> {
        max_of(
            |a: &Assignment| grid.local_potential(cell, a),
            neighborhood,
            &BinarySpace,
            &cell,
            value,
        )
    }

    fn summary(
        &self,
        grid: &OccupancyGrid,
        cell: CellId,
        neighborhood: &[CellId],
        value: Occupancy,
        shift: f64,
    ) -> Result<f64> {
        summary_of(
            |a: &Assignment| (grid.local_potential(cell, a) - shift).exp(),
            neighborhood,
            &BinarySpace,
            &cell,
            value,
        )
    }
}

impl BeliefEstimator for ExactLocalEstimator {
    fn estimate(&mut self, grid: &OccupancyGrid) -> Result<Marginals> {
        let mut marginals = Marginals::filled(grid.width(), grid.height(), 0.5);
        let mut enumerated = 0usize;
        let mut skipped = 0usize;

        for cell in (0..grid.cell_count()).map(CellId) {
            if grid.factors_of(cell).is_empty() {
                continue;
            }
            match self.cell_marginal(grid, cell) {
                Ok(p) => {
                    marginals.set(cell, p);
                    enumerated += 1;
                }
                // Left at 0.5
                Err(GridError::NeighborhoodTooLarge { size, .. }) => {
                    log::debug!("Skipping cell {}: {} neighbours", cell, size);
                    skipped += 1;
                }
                Err(e) => return Err(e),
            }
        }

        log::info!(
            "Exact estimation: {} of {} cells constrained",
            enumerated,
            grid.cell_count()
        );
        if skipped > 0 {
            log::warn!(
                "Exact estimation skipped {} cells with more than {} neighbours",
                skipped,
                self.config.max_neighborhood
            );
        }
        Ok(marginals)
    }
}
