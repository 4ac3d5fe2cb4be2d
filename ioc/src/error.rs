use crate::key::InjectionKey;
use std::fmt;
use std::panic::Location;
use thiserror::Error;

/// The error type for every fallible container operation.
///
/// All variants that stem from a resolution carry the [`DependencyChain`]
/// that was active when the failure happened.
#[derive(Debug, Clone, Error)]
pub enum ContainerError {
  #[error("Cannot autowire {key} because it is a circular dependency:\n{chain}")]
  CircularDependencyEncountered {
    key: InjectionKey,
    chain: DependencyChain,
  },

  #[error("Could not autowire {owner}({parameter}) because {ty} cannot be resolved\n{chain}")]
  DependencyCouldNotBeAutowired {
    owner: String,
    parameter: String,
    ty: String,
    chain: DependencyChain,
  },

  #[error("Could not instantiate {target}: {reason}\n{chain}")]
  DependencyCouldNotBeInstantiated {
    target: String,
    reason: String,
    chain: DependencyChain,
  },

  #[error("Could not resolve tagged dependency {key}, did you forget to register it?\n{chain}")]
  TaggedDependencyCouldNotBeResolved {
    key: InjectionKey,
    chain: DependencyChain,
  },

  #[error("[{name}] cannot be invoked through the container.")]
  InvokedCallableWasInvalid { name: String },
}

impl ContainerError {
  pub fn chain(&self) -> Option<&DependencyChain> {
    match self {
      ContainerError::CircularDependencyEncountered { chain, .. }
      | ContainerError::DependencyCouldNotBeAutowired { chain, .. }
      | ContainerError::DependencyCouldNotBeInstantiated { chain, .. }
      | ContainerError::TaggedDependencyCouldNotBeResolved { chain, .. } => Some(chain),
      ContainerError::InvokedCallableWasInvalid { .. } => None,
    }
  }

  pub(crate) fn is_circular(&self) -> bool {
    matches!(self, ContainerError::CircularDependencyEncountered { .. })
  }
}

/// A specialized `Result` type for container operations.
pub type Result<T, E = ContainerError> = std::result::Result<T, E>;

/// One rendered edge of a dependency chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainLink {
  /// The key being resolved at this step, if the step resolves a key.
  pub key: Option<InjectionKey>,
  /// What the step was doing, e.g. `UserService::new(db: Database)`.
  pub detail: String,
}

/// The path of in-flight resolutions leading to a failure.
#[derive(Debug, Clone, Default)]
pub struct DependencyChain {
  pub(crate) links: Vec<ChainLink>,
  pub(crate) target: Option<String>,
  pub(crate) location: Option<&'static Location<'static>>,
}

impl DependencyChain {
  pub fn links(&self) -> &[ChainLink] {
    &self.links
  }

  /// The dependency the chain ends in.
  pub fn target(&self) -> Option<&str> {
    self.target.as_deref()
  }

  /// Where the outermost resolution was requested.
  pub fn location(&self) -> Option<&'static Location<'static>> {
    self.location
  }
}

impl fmt::Display for DependencyChain {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let mut lines: Vec<&str> = self.links.iter().map(|link| link.detail.as_str()).collect();
    if let Some(target) = &self.target {
      lines.push(target);
    }
    let last = lines.len().saturating_sub(1);
    for (idx, line) in lines.iter().enumerate() {
      let branch = if idx == last {
        "└──"
      } else if idx == 0 {
        "┌──"
      } else {
        "├──"
      };
      writeln!(f, "\t{} {}", branch, line)?;
    }
    if let Some(location) = self.location {
      write!(f, "\tat {}:{}:{}", location.file(), location.line(), location.column())?;
    }
    Ok(())
  }
}

/// Errors raised while loading a [`ContainerConfig`](crate::ContainerConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("Failed to read configuration file: {0}")]
  Read(#[from] std::io::Error),

  #[error("Failed to parse configuration: {0}")]
  Parse(#[from] serde_yaml::Error),

  #[error("Invalid configuration value for '{field}': {message}")]
  InvalidValue { field: String, message: String },
}
