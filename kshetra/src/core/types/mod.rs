//! Core data types shared by the grid, factors and estimators.

mod cell;
mod pose;

pub use cell::{Assignment, CellId, Occupancy};
pub use pose::Pose2D;
