//! The process-wide container slot used by bootstrap code and `resolve!`.

use crate::container::Container;
use crate::core::current_chain;
use crate::error::{ContainerError, Result};
use crate::instance::{Args, Instance};
use crate::invoke::Callable;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::panic::Location;

// Empty until bootstrap code installs a container.
static INSTANCE: Lazy<RwLock<Option<Container>>> = Lazy::new(|| RwLock::new(None));

impl Container {
  /// Installs `container` as the current instance, replacing any previous one.
  ///
  /// ```
  /// use fibre_autowire::Container;
  ///
  /// let container = Container::new();
  /// container.singleton_instance(String::from("shared"));
  /// Container::set_instance(container);
  ///
  /// let current = Container::instance().unwrap();
  /// assert_eq!(*current.get_trait::<String>().unwrap(), "shared");
  /// ```
  pub fn set_instance(container: Container) {
    tracing::debug!(container = container.id(), "installing current container");
    *INSTANCE.write() = Some(container);
  }

  /// The current instance, if one was installed.
  pub fn instance() -> Option<Container> {
    INSTANCE.read().clone()
  }

  pub fn clear_instance() -> Option<Container> {
    INSTANCE.write().take()
  }
}

/// Invokes `callable` through the current container instance.
#[track_caller]
pub fn invoke(callable: &Callable, args: &Args) -> Result<Instance> {
  let location = Location::caller();
  match Container::instance() {
    Some(container) => container.invoke(callable, args),
    None => Err(ContainerError::DependencyCouldNotBeInstantiated {
      target: callable.name().to_owned(),
      reason: "no container instance has been set".to_string(),
      chain: current_chain(0, callable.name(), Some(location)),
    }),
  }
}
