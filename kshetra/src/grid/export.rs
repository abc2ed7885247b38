//! Export functionality for the occupancy grid.

use super::OccupancyGrid;
use super::occupancy::DEFAULT_HEAT;

/// RGB for a cell some beam ended in.
pub const HIT_COLOR: [u8; 3] = [255, 0, 0];

/// RGB for every other cell.
pub const BACKGROUND_COLOR: [u8; 3] = [0, 0, 255];

impl OccupancyGrid {
    /// Export the heat map as RGB image data.
    ///
    /// Returns (width, height, pixels), row-major with row 0 at the top.
    /// Terminal cells are red, the rest blue.
    pub fn to_heat_rgb(&self) -> (usize, usize, Vec<[u8; 3]>) {
        let hit_heat = self.config().ray.hit_heat;
        let pixels = self
            .heat_map()
            .iter()
            .map(|&h| {
                if h >= hit_heat {
                    HIT_COLOR
                } else {
                    BACKGROUND_COLOR
                }
            })
            .collect();

        (self.width(), self.height(), pixels)
    }

    /// Count cells by heat: (untouched, struck).
    pub fn count_cells(&self) -> (usize, usize) {
        let struck = self
            .heat_map()
            .iter()
            .filter(|&&h| h > DEFAULT_HEAT)
            .count();
        (self.cell_count() - struck, struck)
    }
}
