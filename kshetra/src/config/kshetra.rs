//! Main KshetraConfig and conversion methods.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::factor::SensorModel;
use crate::grid::{OccupancyGridConfig, RayConfig};
use crate::inference::{
    DynEstimatorConfig, EstimatorKind, ExactConfig, IndependentConfig, MetropolisConfig,
};

use super::error::ConfigLoadError;
use super::grid::GridSection;

/// Full Kshetra configuration loaded from YAML
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct KshetraConfig {
    /// Grid geometry
    #[serde(default)]
    pub grid: GridSection,

    /// Beam sampling
    #[serde(default)]
    pub ray: RayConfig,

    /// Sensor factor scale
    #[serde(default)]
    pub sensor: SensorModel,

    /// Estimator used when none is given on the command line
    #[serde(default)]
    pub estimator: EstimatorKind,

    /// Exact local enumeration
    #[serde(default)]
    pub exact: ExactConfig,

    /// Metropolis-Hastings sampling
    #[serde(default)]
    pub metropolis: MetropolisConfig,

    /// Independent-cell baseline
    #[serde(default)]
    pub independent: IndependentConfig,
}

impl KshetraConfig {
    /// Load configuration from a YAML file
    pub fn load(path: &Path) -> Result<Self, ConfigLoadError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    /// Load from default config path (configs/config.yaml)
    pub fn load_default() -> Result<Self, ConfigLoadError> {
        let path = Path::new("configs/config.yaml");
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigLoadError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Convert to OccupancyGridConfig
    pub fn to_grid_config(&self) -> OccupancyGridConfig {
        OccupancyGridConfig {
            grid: self.grid.to_grid_config(),
            ray: self.ray.clone(),
            sensor: self.sensor,
        }
    }

    /// Estimator settings for every kind
    pub fn to_estimator_config(&self) -> DynEstimatorConfig {
        DynEstimatorConfig {
            exact: self.exact.clone(),
            metropolis: self.metropolis.clone(),
            independent: self.independent.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::Proposal;

    #[test]
    fn test_default_config() {
        let config = KshetraConfig::default();
        assert_eq!(config.grid.resolution, 0.2);
        assert_eq!(config.ray.steps_per_cell, 8);
        assert_eq!(config.estimator, EstimatorKind::Metropolis);
        assert!(config.to_grid_config().validate().is_ok());
    }

    #[test]
    fn test_yaml_roundtrip() {
        let config = KshetraConfig::default();
        let yaml = serde_yaml::to_string(&config).unwrap();
        let parsed = KshetraConfig::from_yaml(&yaml).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let yaml = r#"
grid:
  width: 5.0
metropolis:
  iterations: 500
  seed: 17
  proposal: heat_weighted
"#;
        let config = KshetraConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.grid.width, 5.0);
        assert_eq!(config.grid.height, 20.0);
        assert_eq!(config.metropolis.iterations, 500);
        assert_eq!(config.metropolis.proposal, Proposal::HeatWeighted);
        assert_eq!(config.exact.max_neighborhood, 16);
        assert_eq!(config.sensor, SensorModel::default());
    }

    #[test]
    fn test_invalid_yaml() {
        assert!(matches!(
            KshetraConfig::from_yaml("grid: [1, 2"),
            Err(ConfigLoadError::Parse(_))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        assert!(matches!(
            KshetraConfig::load(Path::new("/nonexistent/kshetra.yaml")),
            Err(ConfigLoadError::Io(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "estimator: exact\nexact:\n  max_neighborhood: 8\n").unwrap();

        let config = KshetraConfig::load(&path).unwrap();
        assert_eq!(config.estimator, EstimatorKind::Exact);
        assert_eq!(config.to_estimator_config().exact.max_neighborhood, 8);
    }
}
