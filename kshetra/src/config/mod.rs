//! Unified configuration loading for Kshetra.
//!
//! Loads all configuration from a single YAML file with sensible defaults.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use kshetra::config::KshetraConfig;
//!
//! // Load from default path (configs/config.yaml)
//! let config = KshetraConfig::load_default()?;
//!
//! let grid = OccupancyGrid::new(config.to_grid_config())?;
//! let estimator = DynEstimator::new_with_config(config.estimator, config.to_estimator_config());
//! ```
//!
//! ## Configuration Sections
//!
//! | Section | Description |
//! |---------|-------------|
//! | [`GridSection`] | Grid extent and resolution |
//! | `ray` | Beam sampling density, terminal heat |
//! | `sensor` | Sensor factor log-potentials |
//! | `exact` / `metropolis` / `independent` | Estimator settings |

mod defaults;
mod error;
mod grid;
mod kshetra;

pub use error::ConfigLoadError;
pub use grid::GridSection;
pub use kshetra::KshetraConfig;
