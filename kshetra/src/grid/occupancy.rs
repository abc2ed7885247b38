//! Factor-graph occupancy grid.
//!
//! Every cell is a binary variable. Laser beams become [`SensorFactor`]s over
//! the cells they cross, optional [`PriorFactor`]s bias single cells. The
//! grid's energy for an assignment is the sum of all factor log-potentials:
//!
//! ```text
//! E(x) = Σ prior_i(x) + Σ sensor_j(x)
//! ```
//!
//! The graph is append-only: factors are never removed or changed once added,
//! so estimators can hold a shared reference while they run.

use serde::{Deserialize, Serialize};

use crate::core::{Assignment, CellId, Occupancy, Pose2D};
use crate::error::{GridError, Result};
use crate::factor::{Factor, FactorId, PriorFactor, SensorFactor, SensorModel};

use super::{GridIndexer, OccupancyGridConfig, RayTracer};

/// Heat weight of a cell no beam ended in.
pub const DEFAULT_HEAT: f64 = 1.0;

/// One accepted laser measurement, as exported to persistence.
///
/// `heading` is the beam pose's normalized angle in `(-π, π]`, not
/// necessarily the value the pose was built from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BeamRecord {
    pub x: f64,
    pub y: f64,
    pub heading: f64,
    pub range: f64,
}

impl BeamRecord {
    /// Beam pose.
    pub fn pose(&self) -> Pose2D {
        Pose2D::new(self.x, self.y, self.heading)
    }
}

/// 2D occupancy grid backed by a factor graph.
#[derive(Debug, Clone)]
pub struct OccupancyGrid {
    config: OccupancyGridConfig,

    indexer: GridIndexer,

    tracer: RayTracer,

    /// Prior factors in insertion order.
    priors: Vec<PriorFactor>,

    /// Sensor factors in insertion order.
    lasers: Vec<SensorFactor>,

    /// Factors touching each cell.
    ///
    /// Row-major, one entry per cell.
    cell_factors: Vec<Vec<FactorId>>,

    /// Heuristic per-cell weight, raised on beam terminal cells.
    heat_map: Vec<f64>,
}

impl OccupancyGrid {
    /// Create an empty grid.
    ///
    /// Fails with [`GridError::InvalidConfig`] for non-positive geometry or
    /// an unusable sensor model.
    pub fn new(config: OccupancyGridConfig) -> Result<Self> {
        config.validate()?;
        let indexer = GridIndexer::new(&config.grid)?;
        let tracer = RayTracer::from_config(&config.ray);
        let cell_count = indexer.cell_count();

        log::debug!(
            "Occupancy grid {}x{} cells at {} m",
            indexer.width(),
            indexer.height(),
            indexer.resolution()
        );

        Ok(Self {
            config,
            indexer,
            tracer,
            priors: Vec::new(),
            lasers: Vec::new(),
            cell_factors: vec![Vec::new(); cell_count],
            heat_map: vec![DEFAULT_HEAT; cell_count],
        })
    }

    /// Create a grid with default ray and sensor settings.
    pub fn with_geometry(width: f64, height: f64, resolution: f64) -> Result<Self> {
        Self::new(OccupancyGridConfig::with_geometry(width, height, resolution))
    }

    /// Get the configuration.
    pub fn config(&self) -> &OccupancyGridConfig {
        &self.config
    }

    /// Grid geometry.
    pub fn indexer(&self) -> &GridIndexer {
        &self.indexer
    }

    /// Width in cells.
    pub fn width(&self) -> usize {
        self.indexer.width()
    }

    /// Height in cells.
    pub fn height(&self) -> usize {
        self.indexer.height()
    }

    /// Total number of cells.
    pub fn cell_count(&self) -> usize {
        self.indexer.cell_count()
    }

    /// Cell holding world point `(x, y)`.
    pub fn cell_at(&self, x: f64, y: f64) -> Result<CellId> {
        self.indexer.cell_at(x, y)
    }

    /// Sensor model used for new beams.
    pub fn sensor_model(&self) -> &SensorModel {
        &self.config.sensor
    }

    // =========================================================================
    // FACTOR INSERTION
    // =========================================================================

    /// Add a prior that `cell` is occupied with probability `probability`.
    pub fn add_prior(&mut self, cell: CellId, probability: f64) -> Result<FactorId> {
        self.check_cell(cell)?;
        let factor = PriorFactor::new(cell, probability)?;

        let id = FactorId::Prior(self.priors.len());
        self.cell_factors[cell.index()].push(id);
        self.priors.push(factor);
        Ok(id)
    }

    /// Add a laser measurement taken from `pose` with range `range`.
    ///
    /// Traces the beam, raises the heat weight of its terminal cell and
    /// appends a sensor factor over the crossed cells. Returns `None` when the
    /// beam crossed no cell of the grid (nothing is added).
    pub fn add_laser(&mut self, pose: &Pose2D, range: f64) -> Option<FactorId> {
        let trace = self.tracer.trace(&self.indexer, pose, range);
        let terminal = trace.terminal()?;

        let factor = SensorFactor::new(trace.cells, *pose, range, self.config.sensor)?;
        let id = FactorId::Sensor(self.lasers.len());

        // Cells repeat only non-consecutively (never in practice for a
        // straight beam); register each once.
        let mut registered: Vec<CellId> = Vec::with_capacity(factor.cells().len());
        for &cell in factor.cells() {
            if !registered.contains(&cell) {
                self.cell_factors[cell.index()].push(id);
                registered.push(cell);
            }
        }

        self.heat_map[terminal.index()] = self.config.ray.hit_heat;
        self.lasers.push(factor);
        Some(id)
    }

    /// Add every beam of a scan taken at `pose`.
    ///
    /// Beam `i` points along `pose.theta + angles[i]`. Returns the number of
    /// sensor factors added.
    pub fn add_scan(&mut self, pose: &Pose2D, ranges: &[f64], angles: &[f64]) -> usize {
        if ranges.len() != angles.len() {
            log::warn!(
                "Scan has {} ranges but {} angles, using the first {}",
                ranges.len(),
                angles.len(),
                ranges.len().min(angles.len())
            );
        }

        let mut added = 0;
        for (&range, &angle) in ranges.iter().zip(angles) {
            if self.add_laser(&pose.rotated(angle), range).is_some() {
                added += 1;
            } else {
                log::debug!(
                    "Dropped beam at ({:.2}, {:.2}) angle {:.3} range {:.3}",
                    pose.x,
                    pose.y,
                    angle,
                    range
                );
            }
        }
        added
    }

    // =========================================================================
    // FACTOR ACCESS
    // =========================================================================

    /// Total number of factors.
    pub fn factor_count(&self) -> usize {
        self.priors.len() + self.lasers.len()
    }

    pub fn prior_count(&self) -> usize {
        self.priors.len()
    }

    /// Number of sensor (laser) factors.
    pub fn laser_count(&self) -> usize {
        self.lasers.len()
    }

    pub fn priors(&self) -> &[PriorFactor] {
        &self.priors
    }

    /// Sensor factors in insertion order.
    pub fn sensor_factors(&self) -> &[SensorFactor] {
        &self.lasers
    }

    /// Sensor factor `index`, if it exists.
    pub fn sensor_factor(&self, index: usize) -> Option<&SensorFactor> {
        self.lasers.get(index)
    }

    /// Look up a factor by id.
    pub fn factor(&self, id: FactorId) -> Option<&dyn Factor> {
        match id {
            FactorId::Prior(i) => self.priors.get(i).map(|f| f as &dyn Factor),
            FactorId::Sensor(i) => self.lasers.get(i).map(|f| f as &dyn Factor),
        }
    }

    /// Factors touching `cell` (empty for out-of-range cells).
    pub fn factors_of(&self, cell: CellId) -> &[FactorId] {
        self.cell_factors
            .get(cell.index())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Cells sharing at least one factor with `cell`, `cell` included.
    ///
    /// Sorted ascending, no duplicates.
    pub fn dependent_cells(&self, cell: CellId) -> Vec<CellId> {
        let mut cells = vec![cell];
        for &id in self.factors_of(cell) {
            if let Some(factor) = self.factor(id) {
                cells.extend_from_slice(factor.cells());
            }
        }
        cells.sort_unstable();
        cells.dedup();
        cells
    }

    /// Beam records of every accepted laser, in insertion order.
    pub fn beams(&self) -> Vec<BeamRecord> {
        self.lasers
            .iter()
            .map(|f| BeamRecord {
                x: f.pose().x,
                y: f.pose().y,
                heading: f.pose().theta,
                range: f.range(),
            })
            .collect()
    }

    // =========================================================================
    // ENERGY
    // =========================================================================

    /// Assignment mapping every cell to free.
    pub fn empty_assignment(&self) -> Assignment {
        (0..self.cell_count())
            .map(|i| (CellId(i), Occupancy::Free))
            .collect()
    }

    /// Sum of every factor's log-potential.
    pub fn total_potential(&self, assignment: &Assignment) -> f64 {
        let priors: f64 = self.priors.iter().map(|f| f.evaluate(assignment)).sum();
        priors + self.sensor_potential(assignment)
    }

    /// Sum of the sensor factors only.
    pub fn sensor_potential(&self, assignment: &Assignment) -> f64 {
        self.lasers.iter().map(|f| f.evaluate(assignment)).sum()
    }

    /// Value of sensor factor `index`.
    pub fn laser_factor_value(&self, index: usize, assignment: &Assignment) -> Option<f64> {
        self.lasers.get(index).map(|f| f.evaluate(assignment))
    }

    /// Sum of the factors touching `cell`.
    ///
    /// Differences of this value between two assignments that only differ at
    /// `cell` equal the difference of [`total_potential`](Self::total_potential).
    pub fn local_potential(&self, cell: CellId, assignment: &Assignment) -> f64 {
        self.factors_of(cell)
            .iter()
            .filter_map(|&id| self.factor(id))
            .map(|f| f.evaluate(assignment))
            .sum()
    }

    // =========================================================================
    // HEAT MAP
    // =========================================================================

    /// Per-cell heat weights, row-major.
    pub fn heat_map(&self) -> &[f64] {
        &self.heat_map
    }

    /// Heat weight of `cell`.
    pub fn heat_weight(&self, cell: CellId) -> Option<f64> {
        self.heat_map.get(cell.index()).copied()
    }

    fn check_cell(&self, cell: CellId) -> Result<()> {
        if self.indexer.contains(cell) {
            Ok(())
        } else {
            Err(GridError::CellOutOfRange {
                cell,
                cell_count: self.cell_count(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn create_test_grid() -> OccupancyGrid {
        OccupancyGrid::with_geometry(20.0, 20.0, 0.2).unwrap()
    }

    #[test]
    fn test_grid_creation() {
        let grid = create_test_grid();
        assert_eq!(grid.cell_count(), 10_000);
        assert_eq!(grid.factor_count(), 0);
        assert!(grid.heat_map().iter().all(|&h| h == DEFAULT_HEAT));
    }

    #[test]
    fn test_invalid_geometry_is_fatal() {
        assert!(matches!(
            OccupancyGrid::with_geometry(20.0, 0.0, 0.2),
            Err(GridError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_add_prior() {
        let mut grid = create_test_grid();
        let id = grid.add_prior(CellId(0), 0.7).unwrap();

        assert_eq!(id, FactorId::Prior(0));
        assert_eq!(grid.factor_count(), 1);
        assert_eq!(grid.factors_of(CellId(0)), &[FactorId::Prior(0)]);
    }

    #[test]
    fn test_add_prior_rejects_bad_input() {
        let mut grid = create_test_grid();
        assert!(matches!(
            grid.add_prior(CellId(0), 1.0),
            Err(GridError::InvalidProbability(_))
        ));
        assert!(matches!(
            grid.add_prior(CellId(10_000), 0.5),
            Err(GridError::CellOutOfRange { .. })
        ));
        assert_eq!(grid.factor_count(), 0);
    }

    #[test]
    fn test_add_laser() {
        let mut grid = create_test_grid();
        grid.add_prior(CellId(0), 0.7).unwrap();

        let id = grid.add_laser(&Pose2D::identity(), 4.5);
        assert_eq!(id, Some(FactorId::Sensor(0)));
        assert_eq!(grid.factor_count(), 2);

        let factor = grid.sensor_factor(0).unwrap();
        assert_eq!(factor.cells().len(), 23);
        assert_eq!(factor.terminal(), CellId(5072));

        assert_eq!(grid.heat_weight(CellId(5072)), Some(4.0));
        for &cell in factor.pass_through() {
            assert_eq!(grid.heat_weight(cell), Some(DEFAULT_HEAT));
        }
        let hot = grid.heat_map().iter().filter(|&&h| h > DEFAULT_HEAT).count();
        assert_eq!(hot, 1);
    }

    #[test]
    fn test_add_laser_outside_grid_is_noop() {
        let mut grid = create_test_grid();
        assert!(grid.add_laser(&Pose2D::new(100.0, 0.0, 0.0), 2.0).is_none());
        assert!(grid.add_laser(&Pose2D::identity(), 0.0).is_none());
        assert_eq!(grid.factor_count(), 0);
        assert!(grid.beams().is_empty());
    }

    #[test]
    fn test_lasers_accumulate() {
        let mut grid = create_test_grid();
        for _ in 0..3 {
            grid.add_laser(&Pose2D::identity(), 1.0);
        }
        assert_eq!(grid.laser_count(), 3);
        assert_eq!(grid.factors_of(CellId(5050)).len(), 3);
    }

    #[test]
    fn test_add_scan() {
        let mut grid = create_test_grid();
        let angles = [0.0, std::f64::consts::FRAC_PI_2, 0.3];
        let ranges = [1.0, 1.0, 0.0];

        let added = grid.add_scan(&Pose2D::new(1.0, 1.0, 0.0), &ranges, &angles);
        assert_eq!(added, 2);

        let beams = grid.beams();
        assert_relative_eq!(beams[1].heading, std::f64::consts::FRAC_PI_2);
        assert_relative_eq!(beams[1].x, 1.0);
        assert_relative_eq!(beams[0].range, 1.0);
    }

    #[test]
    fn test_beam_heading_is_normalized() {
        let mut grid = create_test_grid();
        grid.add_laser(&Pose2D::new(0.0, 0.0, 4.0), 1.0);

        let beam = grid.beams()[0];
        assert_relative_eq!(beam.heading, 4.0 - 2.0 * std::f64::consts::PI, epsilon = 1e-12);
        assert_eq!(beam.pose(), *grid.sensor_factor(0).unwrap().pose());
    }

    #[test]
    fn test_empty_assignment_potential() {
        let mut grid = create_test_grid();
        grid.add_laser(&Pose2D::identity(), 1.0);

        let empty = grid.empty_assignment();
        assert_eq!(empty.len(), 10_000);
        assert_eq!(empty.occupied_count(), 0);
        assert_relative_eq!(
            grid.total_potential(&empty),
            grid.sensor_model().miss_log_potential
        );
    }

    #[test]
    fn test_total_potential_sums_factors() {
        let mut grid = create_test_grid();
        grid.add_prior(CellId(5054), 0.8).unwrap();
        grid.add_laser(&Pose2D::identity(), 1.0);

        let mut assignment = Assignment::new();
        assignment.set(CellId(5054), Occupancy::Occupied);

        assert_relative_eq!(grid.sensor_potential(&assignment), 0.0);
        assert_relative_eq!(grid.total_potential(&assignment), 0.8f64.ln(), epsilon = 1e-12);
        assert_relative_eq!(grid.laser_factor_value(0, &assignment).unwrap(), 0.0);
        assert!(grid.laser_factor_value(1, &assignment).is_none());
    }

    #[test]
    fn test_local_potential_delta_matches_total() {
        let mut grid = create_test_grid();
        grid.add_prior(CellId(5052), 0.3).unwrap();
        grid.add_laser(&Pose2D::identity(), 1.0);
        grid.add_laser(&Pose2D::new(0.45, -0.5, std::f64::consts::FRAC_PI_2), 1.0);

        let mut assignment = grid.empty_assignment();
        for cell in grid.dependent_cells(CellId(5052)) {
            let before_total = grid.total_potential(&assignment);
            let before_local = grid.local_potential(cell, &assignment);
            assignment.flip(cell);
            let delta_total = grid.total_potential(&assignment) - before_total;
            let delta_local = grid.local_potential(cell, &assignment) - before_local;
            assert_relative_eq!(delta_total, delta_local, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_dependent_cells() {
        let mut grid = create_test_grid();
        grid.add_laser(&Pose2D::identity(), 0.6);

        // Cells 5050, 5051, 5052
        let deps = grid.dependent_cells(CellId(5051));
        assert_eq!(deps, vec![CellId(5050), CellId(5051), CellId(5052)]);

        // Isolated cell depends only on itself
        assert_eq!(grid.dependent_cells(CellId(0)), vec![CellId(0)]);
    }

    #[test]
    fn test_terminal_flip_increases_energy() {
        let mut grid = create_test_grid();
        grid.add_laser(&Pose2D::identity(), 4.5);
        let terminal = grid.sensor_factor(0).unwrap().terminal();

        let mut assignment = grid.empty_assignment();
        let before = grid.laser_factor_value(0, &assignment).unwrap();
        assignment.set(terminal, Occupancy::Occupied);
        let after = grid.laser_factor_value(0, &assignment).unwrap();
        assert!(after > before);
    }
}
