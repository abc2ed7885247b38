//! Grid geometry and ray tracing configuration.

use serde::{Deserialize, Serialize};

use crate::error::{GridError, Result};
use crate::factor::SensorModel;

use super::DEFAULT_HEAT;

/// Grid geometry.
///
/// All values share one physical unit (meters). The grid is centered on the
/// world origin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Grid extent along X.
    pub width: f64,

    /// Grid extent along Y.
    pub height: f64,

    /// Cell size.
    ///
    /// Should evenly divide width and height; fractional cell counts are
    /// truncated.
    pub resolution: f64,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            width: 20.0,
            height: 20.0,
            resolution: 0.2,
        }
    }
}

impl GridConfig {
    /// Create a grid configuration.
    pub fn new(width: f64, height: f64, resolution: f64) -> Self {
        Self {
            width,
            height,
            resolution,
        }
    }

    /// Reject geometry that cannot produce a usable grid.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("width", self.width),
            ("height", self.height),
            ("resolution", self.resolution),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(GridError::InvalidConfig(format!(
                    "{} must be positive, got {}",
                    name, value
                )));
            }
        }
        if self.resolution > self.width || self.resolution > self.height {
            return Err(GridError::InvalidConfig(format!(
                "resolution {} exceeds grid extent {}x{}",
                self.resolution, self.width, self.height
            )));
        }
        Ok(())
    }
}

/// Ray tracing configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RayConfig {
    /// Samples per cell length along a beam.
    ///
    /// 8 keeps diagonal beams from skipping cells.
    pub steps_per_cell: u32,

    /// Heat weight written to a beam's terminal cell.
    pub hit_heat: f64,
}

impl Default for RayConfig {
    fn default() -> Self {
        Self {
            steps_per_cell: 8,
            hit_heat: 4.0,
        }
    }
}

impl RayConfig {
    pub fn validate(&self) -> Result<()> {
        if self.steps_per_cell == 0 {
            return Err(GridError::InvalidConfig(
                "steps_per_cell must be at least 1".to_string(),
            ));
        }
        if !(self.hit_heat.is_finite() && self.hit_heat > DEFAULT_HEAT) {
            return Err(GridError::InvalidConfig(format!(
                "hit_heat must be finite and above {}, got {}",
                DEFAULT_HEAT, self.hit_heat
            )));
        }
        Ok(())
    }
}

/// Configuration for the factor-graph occupancy grid.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OccupancyGridConfig {
    /// Grid geometry.
    #[serde(default)]
    pub grid: GridConfig,

    /// Beam sampling.
    #[serde(default)]
    pub ray: RayConfig,

    /// Sensor factor scale.
    #[serde(default)]
    pub sensor: SensorModel,
}

impl OccupancyGridConfig {
    /// Default configuration with the given geometry.
    pub fn with_geometry(width: f64, height: f64, resolution: f64) -> Self {
        Self {
            grid: GridConfig::new(width, height, resolution),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.grid.validate()?;
        self.ray.validate()?;
        self.sensor.validate()
    }
}
