//! Grid geometry, ray tracing and the factor-graph occupancy grid.
//!
//! - [`GridIndexer`]: world point to cell id
//! - [`RayTracer`]: cells crossed by a beam
//! - [`OccupancyGrid`]: cells as binary variables, beams and priors as factors

mod config;
mod export;
mod indexer;
mod occupancy;
mod ray_tracer;

pub use config::{GridConfig, OccupancyGridConfig, RayConfig};
pub use export::{BACKGROUND_COLOR, HIT_COLOR};
pub use indexer::{GridIndexer, MAX_CELLS};
pub use occupancy::{BeamRecord, DEFAULT_HEAT, OccupancyGrid};
pub use ray_tracer::{RayTrace, RayTracer};
