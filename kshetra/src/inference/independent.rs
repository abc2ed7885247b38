//! Independent-cell log-odds baseline.
//!
//! Treats every cell as independent and accumulates evidence per beam:
//!
//! ```text
//! energy(c) += log_odds_free                      for every cell the beam crosses
//! energy(t) += log_odds_occupied - log_odds_free  for the beam's terminal cell
//! energy(c) += logit(p)                           for every prior on c
//! ```
//!
//! The marginal is `sigmoid(energy)`; the MAP assignment marks cells with
//! non-negative energy occupied.

use serde::{Deserialize, Serialize};

use crate::core::math::{log_odds, probability};
use crate::core::{Assignment, CellId, Occupancy};
use crate::error::Result;
use crate::factor::Factor;
use crate::grid::OccupancyGrid;

use super::{BeliefEstimator, Marginals};

/// Log-odds increments for the independent-cell estimator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndependentConfig {
    /// Evidence added to a beam's terminal cell. Default: ln 4
    pub log_odds_occupied: f64,

    /// Evidence added to every cell a beam crosses. Default: -ln 4
    pub log_odds_free: f64,
}

impl Default for IndependentConfig {
    fn default() -> Self {
        Self {
            log_odds_occupied: 1.3863,
            log_odds_free: -1.3863,
        }
    }
}

/// Per-cell log-odds accumulation, ignoring factor coupling.
#[derive(Debug, Clone, Default)]
pub struct IndependentCellEstimator {
    config: IndependentConfig,
    last_map_potential: Option<f64>,
}

impl IndependentCellEstimator {
    pub fn new(config: IndependentConfig) -> Self {
        Self {
            config,
            last_map_potential: None,
        }
    }

    pub fn config(&self) -> &IndependentConfig {
        &self.config
    }

    /// Accumulated log-odds per cell, row-major.
    pub fn energies(&self, grid: &OccupancyGrid) -> Vec<f64> {
        let mut energy = vec![0.0; grid.cell_count()];

        for prior in grid.priors() {
            energy[prior.cell().index()] += log_odds(prior.probability());
        }

        for factor in grid.sensor_factors() {
            for &cell in factor.cells() {
                energy[cell.index()] += self.config.log_odds_free;
            }
            energy[factor.terminal().index()] +=
                self.config.log_odds_occupied - self.config.log_odds_free;
        }

        energy
    }

    /// Cells with non-negative energy occupied, the rest free.
    pub fn map_assignment(&self, grid: &OccupancyGrid) -> Assignment {
        self.energies(grid)
            .iter()
            .enumerate()
            .map(|(i, &e)| (CellId(i), Occupancy::from(e >= 0.0)))
            .collect()
    }

    /// Grid potential of the MAP assignment from the latest estimate.
    pub fn last_map_potential(&self) -> Option<f64> {
        self.last_map_potential
    }
}

impl BeliefEstimator for IndependentCellEstimator {
    fn estimate(&mut self, grid: &OccupancyGrid) -> Result<Marginals> {
        let energy = self.energies(grid);

        let map: Assignment = energy
            .iter()
            .enumerate()
            .map(|(i, &e)| (CellId(i), Occupancy::from(e >= 0.0)))
            .collect();
        let potential = grid.total_potential(&map);
        log::info!(
            "Independent cells: MAP has {} occupied cells, potential {:.4}",
            map.occupied_count(),
            potential
        );
        self.last_map_potential = Some(potential);

        let values = energy.into_iter().map(probability).collect();
        Marginals::new(grid.width(), grid.height(), values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Pose2D;
    use approx::assert_relative_eq;

    #[test]
    fn test_beam_energies() {
        let mut grid = OccupancyGrid::with_geometry(4.0, 4.0, 1.0).unwrap();
        grid.add_laser(&Pose2D::identity(), 1.5);

        let estimator = IndependentCellEstimator::default();
        let energy = estimator.energies(&grid);

        assert_relative_eq!(energy[10], -1.3863);
        assert_relative_eq!(energy[11], 1.3863);
        assert_relative_eq!(energy[0], 0.0);
    }

    #[test]
    fn test_terminal_energy_uses_terminal_cell() {
        // Terminal far from index 0 so a positional mix-up would show
        let mut grid = OccupancyGrid::with_geometry(20.0, 20.0, 0.2).unwrap();
        grid.add_laser(&Pose2D::identity(), 4.5);

        let energy = IndependentCellEstimator::default().energies(&grid);
        assert!(energy[5072] > 0.0);
        assert!(energy[5050] < 0.0);
        assert_relative_eq!(energy[22], 0.0);
    }

    #[test]
    fn test_marginals_and_map() {
        let mut grid = OccupancyGrid::with_geometry(4.0, 4.0, 1.0).unwrap();
        grid.add_laser(&Pose2D::identity(), 1.5);
        grid.add_laser(&Pose2D::identity(), 1.5);
        grid.add_prior(CellId(10), 0.9).unwrap();

        let mut estimator = IndependentCellEstimator::default();
        let marginals = estimator.estimate(&grid).unwrap();

        assert_relative_eq!(
            marginals.get(CellId(11)).unwrap(),
            probability(2.0 * 1.3863),
            epsilon = 1e-12
        );
        // Two misses outweigh the prior
        assert!(marginals.get(CellId(10)).unwrap() < 0.5);

        let map = estimator.map_assignment(&grid);
        assert!(map.get(CellId(11)).is_occupied());
        assert!(!map.get(CellId(10)).is_occupied());
        assert!(estimator.last_map_potential().is_some());
    }

    #[test]
    fn test_prior_only() {
        let mut grid = OccupancyGrid::with_geometry(4.0, 4.0, 1.0).unwrap();
        grid.add_prior(CellId(5), 0.25).unwrap();

        let marginals = IndependentCellEstimator::default().estimate(&grid).unwrap();
        assert_relative_eq!(marginals.get(CellId(5)).unwrap(), 0.25, epsilon = 1e-12);
    }
}
