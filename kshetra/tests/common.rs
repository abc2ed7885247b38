//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::f64::consts::PI;

use kshetra::{CellId, OccupancyGrid, Pose2D};

/// Enable log output for a test run (`RUST_LOG=debug cargo test`).
pub fn init_logging() {
    env_logger::builder().is_test(true).try_init().ok();
}

/// Ranges and beam angles of an `n`-beam scan taken at the center of an
/// axis-aligned square room with walls at `±half_size`.
pub fn room_scan(half_size: f64, n: usize) -> (Vec<f64>, Vec<f64>) {
    let mut ranges = Vec::with_capacity(n);
    let mut angles = Vec::with_capacity(n);

    for i in 0..n {
        let angle = i as f64 * 2.0 * PI / n as f64 - PI;
        let (sin_a, cos_a) = angle.sin_cos();

        let to_x_wall = if cos_a.abs() > 1e-9 {
            half_size / cos_a.abs()
        } else {
            f64::INFINITY
        };
        let to_y_wall = if sin_a.abs() > 1e-9 {
            half_size / sin_a.abs()
        } else {
            f64::INFINITY
        };

        angles.push(angle);
        ranges.push(to_x_wall.min(to_y_wall));
    }

    (ranges, angles)
}

/// 4x4 grid at 1 m holding two beams that share no cell.
///
/// Beam A: cells 10 -> 11 (terminal 11).
/// Beam B: cells 6 -> 5 (terminal 5).
pub fn two_beam_grid() -> OccupancyGrid {
    let mut grid = OccupancyGrid::with_geometry(4.0, 4.0, 1.0).unwrap();
    grid.add_laser(&Pose2D::identity(), 1.5);
    grid.add_laser(&Pose2D::new(0.0, 1.5, PI), 1.5);
    grid
}

/// Terminal cells of every sensor factor.
pub fn terminal_cells(grid: &OccupancyGrid) -> Vec<CellId> {
    grid.sensor_factors().iter().map(|f| f.terminal()).collect()
}
