//! Container configuration.

use crate::error::ConfigError;
use serde::Deserialize;
use std::path::Path;

fn default_autowire() -> bool {
  true
}

fn default_max_depth() -> usize {
  128
}

/// Tunables for a [`Container`](crate::Container).
///
/// Usually built in code, but can also be read from YAML:
///
/// ```
/// use fibre_autowire::ContainerConfig;
///
/// let config = ContainerConfig::from_yaml_str("autowire: false\nmax_depth: 16\n").unwrap();
/// assert!(!config.autowire);
/// assert_eq!(config.max_depth, 16);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ContainerConfig {
  /// Whether unbound concrete types are built by autowiring their constructors.
  #[serde(default = "default_autowire")]
  pub autowire: bool,

  /// How many nested resolutions a single request may go through.
  #[serde(default = "default_max_depth")]
  pub max_depth: usize,
}

impl Default for ContainerConfig {
  fn default() -> Self {
    Self {
      autowire: default_autowire(),
      max_depth: default_max_depth(),
    }
  }
}

impl ContainerConfig {
  pub fn from_yaml_str(source: &str) -> Result<Self, ConfigError> {
    let config: ContainerConfig = serde_yaml::from_str(source)?;
    config.validate()
  }

  pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
    let source = std::fs::read_to_string(path)?;
    Self::from_yaml_str(&source)
  }

  fn validate(self) -> Result<Self, ConfigError> {
    if self.max_depth == 0 {
      return Err(ConfigError::InvalidValue {
        field: "max_depth".to_string(),
        message: "must be at least 1".to_string(),
      });
    }
    Ok(self)
  }
}
