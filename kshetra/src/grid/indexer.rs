//! World coordinates to cell identifiers and back.
//!
//! # Layout
//!
//! ```text
//!            col 0 ........ col W-1
//!   row 0    +-------------------+   +y
//!            |                   |    ^
//!            |         o         |    |
//!            |      (0, 0)       |    +--> +x
//!   row H-1  +-------------------+
//! ```
//!
//! The world origin sits at cell `(H/2, W/2)`. World coordinates are scaled by
//! `1 / resolution` and truncated toward zero, so the cells touching the axes
//! are shared by both signs of a coordinate (`-0.1` and `0.1` land in the same
//! column at 0.2 resolution). Increasing world `y` moves toward row 0.

use crate::core::CellId;
use crate::error::{GridError, Result};

use super::GridConfig;

/// Floor tolerance for `extent / resolution`, so 20 / 0.2 yields 100 cells.
const CELL_COUNT_EPSILON: f64 = 1e-9;

/// Largest grid accepted, in cells (8192 x 8192).
pub const MAX_CELLS: usize = 1 << 26;

/// Grid geometry: owns width, height and resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct GridIndexer {
    /// Width in cells.
    width: usize,
    /// Height in cells.
    height: usize,
    /// Cell size in meters.
    resolution: f64,
}

impl GridIndexer {
    /// Build the indexer for a validated geometry.
    pub fn new(config: &GridConfig) -> Result<Self> {
        config.validate()?;

        let width = cells_along(config.width, config.resolution);
        let height = cells_along(config.height, config.resolution);
        if width == 0 || height == 0 {
            return Err(GridError::InvalidConfig(format!(
                "grid {}x{} at resolution {} has no cells",
                config.width, config.height, config.resolution
            )));
        }
        match width.checked_mul(height) {
            Some(count) if count <= MAX_CELLS => {}
            _ => {
                return Err(GridError::InvalidConfig(format!(
                    "grid {}x{} at resolution {} exceeds {} cells",
                    config.width, config.height, config.resolution, MAX_CELLS
                )));
            }
        }

        Ok(Self {
            width,
            height,
            resolution: config.resolution,
        })
    }

    /// Width in cells.
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in cells.
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Cell size in meters.
    #[inline]
    pub fn resolution(&self) -> f64 {
        self.resolution
    }

    /// Total number of cells.
    #[inline]
    pub fn cell_count(&self) -> usize {
        self.width * self.height
    }

    /// Whether `cell` indexes into this grid.
    #[inline]
    pub fn contains(&self, cell: CellId) -> bool {
        cell.index() < self.cell_count()
    }

    /// World-space box `(min_x, min_y, max_x, max_y)` enclosing every point
    /// that maps to a cell, padded by one resolution on each side.
    pub fn world_bounds(&self) -> (f64, f64, f64, f64) {
        let r = self.resolution;
        let half_w = (self.width / 2) as f64;
        let half_h = (self.height / 2) as f64;
        (
            -(half_w + 2.0) * r,
            -(self.height as f64 - half_h + 1.0) * r,
            (self.width as f64 - half_w + 1.0) * r,
            (half_h + 2.0) * r,
        )
    }

    /// Cell holding world point `(x, y)`.
    ///
    /// Returns [`GridError::InvalidIndex`] when the point falls outside the
    /// grid. Rows and columns are checked separately so an overflowing column
    /// never wraps onto the next row.
    pub fn cell_at(&self, x: f64, y: f64) -> Result<CellId> {
        let gx = (x / self.resolution).trunc();
        let gy = (y / self.resolution).trunc();

        let col = gx + (self.width / 2) as f64;
        let row = (self.height / 2) as f64 - gy;

        if !(col >= 0.0 && row >= 0.0 && col < self.width as f64 && row < self.height as f64) {
            return Err(GridError::InvalidIndex { x, y });
        }

        Ok(CellId(row as usize * self.width + col as usize))
    }

    /// Row and column of `cell`.
    pub fn row_col(&self, cell: CellId) -> Result<(usize, usize)> {
        self.check(cell)?;
        Ok((cell.index() / self.width, cell.index() % self.width))
    }

    /// World point at the middle of the region that maps to `cell`.
    ///
    /// The axis cells cover two resolutions (one on each side of zero), so
    /// their center lies on the axis.
    pub fn cell_center(&self, cell: CellId) -> Result<(f64, f64)> {
        let (row, col) = self.row_col(cell)?;
        let gx = col as f64 - (self.width / 2) as f64;
        let gy = (self.height / 2) as f64 - row as f64;
        Ok((
            axis_center(gx) * self.resolution,
            axis_center(gy) * self.resolution,
        ))
    }

    fn check(&self, cell: CellId) -> Result<()> {
        if self.contains(cell) {
            Ok(())
        } else {
            Err(GridError::CellOutOfRange {
                cell,
                cell_count: self.cell_count(),
            })
        }
    }
}

fn cells_along(extent: f64, resolution: f64) -> usize {
    (extent / resolution + CELL_COUNT_EPSILON).floor() as usize
}

/// Center of the truncation interval for grid coordinate `g`.
fn axis_center(g: f64) -> f64 {
    if g > 0.0 {
        g + 0.5
    } else if g < 0.0 {
        g - 0.5
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn indexer(width: f64, height: f64, resolution: f64) -> GridIndexer {
        GridIndexer::new(&GridConfig::new(width, height, resolution)).unwrap()
    }

    #[test]
    fn test_cell_count() {
        let idx = indexer(20.0, 20.0, 0.2);
        assert_eq!(idx.width(), 100);
        assert_eq!(idx.height(), 100);
        assert_eq!(idx.cell_count(), 10_000);
    }

    #[test]
    fn test_fractional_extent_truncated() {
        let idx = indexer(1.05, 0.5, 0.1);
        assert_eq!(idx.width(), 10);
        assert_eq!(idx.height(), 5);
    }

    #[test]
    fn test_origin_maps_to_center() {
        let idx = indexer(20.0, 20.0, 0.2);
        assert_eq!(idx.cell_at(0.0, 0.0).unwrap(), CellId(50 * 100 + 50));
        assert_eq!(idx.row_col(CellId(5050)).unwrap(), (50, 50));
    }

    #[test]
    fn test_truncation_toward_zero() {
        let idx = indexer(20.0, 20.0, 0.2);
        let center = idx.cell_at(0.0, 0.0).unwrap();

        // Both sides of each axis collapse into the center cell
        assert_eq!(idx.cell_at(0.15, 0.15).unwrap(), center);
        assert_eq!(idx.cell_at(-0.15, -0.15).unwrap(), center);

        assert_eq!(idx.cell_at(0.25, 0.0).unwrap(), CellId(5051));
        assert_eq!(idx.cell_at(-0.25, 0.0).unwrap(), CellId(5049));
    }

    #[test]
    fn test_y_axis_points_to_row_zero() {
        let idx = indexer(20.0, 20.0, 0.2);
        let (row_up, _) = idx.row_col(idx.cell_at(0.0, 1.0).unwrap()).unwrap();
        let (row_down, _) = idx.row_col(idx.cell_at(0.0, -1.0).unwrap()).unwrap();
        assert_eq!(row_up, 45);
        assert_eq!(row_down, 55);
    }

    #[test]
    fn test_out_of_bounds_is_invalid_index() {
        let idx = indexer(20.0, 20.0, 0.2);
        assert!(matches!(
            idx.cell_at(10.5, 0.0),
            Err(GridError::InvalidIndex { .. })
        ));
        assert!(idx.cell_at(0.0, -10.5).is_err());
        assert!(idx.cell_at(-10.5, 0.0).is_err());
        // Column overflow must not wrap onto the next row
        assert!(idx.cell_at(10.1, 3.0).is_err());
        assert!(idx.cell_at(9.9, 0.0).is_ok());
    }

    #[test]
    fn test_cell_center_round_trip() {
        let idx = indexer(10.0, 10.0, 0.5);
        for cell in (0..idx.cell_count()).map(CellId) {
            let (x, y) = idx.cell_center(cell).unwrap();
            assert_eq!(idx.cell_at(x, y).unwrap(), cell);
        }
    }

    #[test]
    fn test_cell_center_of_axis_cell() {
        let idx = indexer(4.0, 4.0, 1.0);
        let (x, y) = idx.cell_center(idx.cell_at(0.3, -0.7).unwrap()).unwrap();
        assert_relative_eq!(x, 0.0);
        assert_relative_eq!(y, 0.0);
    }

    #[test]
    fn test_cell_out_of_range() {
        let idx = indexer(2.0, 2.0, 1.0);
        assert!(matches!(
            idx.cell_center(CellId(4)),
            Err(GridError::CellOutOfRange { cell_count: 4, .. })
        ));
    }

    #[test]
    fn test_invalid_geometry() {
        assert!(GridIndexer::new(&GridConfig::new(-1.0, 1.0, 0.1)).is_err());
    }

    #[test]
    fn test_huge_geometry_rejected() {
        // Cell counts that overflow usize or exceed MAX_CELLS
        for (extent, resolution) in [(1e10, 1e-3), (1e300, 1e-300), (1000.0, 0.01)] {
            assert!(matches!(
                GridIndexer::new(&GridConfig::new(extent, extent, resolution)),
                Err(GridError::InvalidConfig(_))
            ));
        }
        assert!(GridIndexer::new(&GridConfig::new(81.92, 81.92, 0.01)).is_ok());
    }

    #[test]
    fn test_world_bounds_enclose_cells() {
        for (w, h, r) in [(20.0, 20.0, 0.2), (5.0, 3.0, 1.0), (1.05, 0.5, 0.1)] {
            let idx = indexer(w, h, r);
            let (min_x, min_y, max_x, max_y) = idx.world_bounds();
            for cell in (0..idx.cell_count()).map(CellId) {
                let (x, y) = idx.cell_center(cell).unwrap();
                assert!(x - 1.5 * r > min_x && x + 1.5 * r < max_x);
                assert!(y - 1.5 * r > min_y && y + 1.5 * r < max_y);
            }
            assert!(idx.cell_at(min_x, 0.0).is_err());
            assert!(idx.cell_at(max_x, 0.0).is_err());
            assert!(idx.cell_at(0.0, min_y).is_err());
            assert!(idx.cell_at(0.0, max_y).is_err());
        }
    }
}
