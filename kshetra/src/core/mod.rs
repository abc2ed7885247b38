//! Core types and math utilities.

pub mod math;
pub mod types;

pub use types::{Assignment, CellId, Occupancy, Pose2D};
