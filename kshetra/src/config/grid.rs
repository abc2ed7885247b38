//! Grid configuration section.

use serde::{Deserialize, Serialize};

use crate::grid::GridConfig;

use super::defaults;

/// Grid configuration section
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GridSection {
    /// Grid extent along X (meters)
    #[serde(default = "defaults::extent")]
    pub width: f64,

    /// Grid extent along Y (meters)
    #[serde(default = "defaults::extent")]
    pub height: f64,

    /// Cell size (meters)
    #[serde(default = "defaults::resolution")]
    pub resolution: f64,
}

impl Default for GridSection {
    fn default() -> Self {
        Self {
            width: defaults::extent(),
            height: defaults::extent(),
            resolution: defaults::resolution(),
        }
    }
}

impl GridSection {
    /// Convert to GridConfig
    pub fn to_grid_config(&self) -> GridConfig {
        GridConfig::new(self.width, self.height, self.resolution)
    }
}
