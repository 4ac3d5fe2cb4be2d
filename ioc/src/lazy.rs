//! Dependencies that are resolved on first use.

use crate::container::{Container, ContainerInner};
use crate::core::current_chain;
use crate::error::{ContainerError, DependencyChain, Result};
use crate::instance::{Args, Instance};
use crate::key::InjectionKey;
use crate::reflect::ClassRef;
use once_cell::sync::OnceCell;
use std::any::Any;
use std::fmt;
use std::ops::Deref;
use std::panic::Location;
use std::sync::{Arc, Weak};

/// The erased state shared by every clone of a lazy handle.
pub(crate) struct LazyInstance {
  key: InjectionKey,
  class: Option<ClassRef>,
  container: Weak<ContainerInner>,
  location: &'static Location<'static>,
  cell: OnceCell<Instance>,
}

impl LazyInstance {
  pub(crate) fn new(
    container: &Container,
    key: InjectionKey,
    class: Option<ClassRef>,
    location: &'static Location<'static>,
  ) -> Self {
    Self {
      key,
      class,
      container: container.downgrade(),
      location,
      cell: OnceCell::new(),
    }
  }

  /// A handle whose value is already known.
  pub(crate) fn resolved(instance: Instance) -> Self {
    let key = InjectionKey::from_parts(instance.ty(), None);
    Self {
      key,
      class: None,
      container: Weak::new(),
      location: Location::caller(),
      cell: OnceCell::with_value(instance),
    }
  }

  /// The active chain of the owning container, ending in this handle's key.
  fn chain(&self) -> DependencyChain {
    let container = Container::upgrade(&self.container).map_or(0, |container| container.id());
    current_chain(container, self.key.to_string(), Some(self.location))
  }

  pub(crate) fn resolve(&self) -> Result<&Instance> {
    self.cell.get_or_try_init(|| {
      let container = Container::upgrade(&self.container).ok_or_else(|| {
        ContainerError::DependencyCouldNotBeInstantiated {
          target: self.key.to_string(),
          reason: "the container behind this lazy dependency was dropped".to_string(),
          chain: current_chain(0, self.key.to_string(), Some(self.location)),
        }
      })?;
      tracing::debug!(key = %self.key, "resolving lazy dependency");
      container.resolve(&self.key, self.class.as_ref(), &Args::new(), self.location)
    })
  }
}

/// A handle to a dependency that is resolved on first access.
///
/// Creating the handle never resolves anything. The first call to
/// [`try_get`](Lazy::try_get), [`get`](Lazy::get) or a deref resolves the
/// dependency exactly once; later accesses reuse the cached instance. Clones
/// share the same resolution.
///
/// ```
/// use fibre_autowire::{Autowire, Blueprint, Container};
///
/// struct Expensive;
/// impl Autowire for Expensive {
///   fn blueprint() -> Blueprint<Self> {
///     Blueprint::new(|_| Ok(Expensive))
///   }
/// }
///
/// let container = Container::new();
/// let lazy = container.lazy::<Expensive>();
/// assert!(!lazy.is_resolved());
/// let _value: &Expensive = &lazy;
/// assert!(lazy.is_resolved());
/// ```
pub struct Lazy<T: ?Sized> {
  inner: Arc<LazyInstance>,
  typed: OnceCell<Arc<T>>,
}

impl<T: ?Sized + Any + Send + Sync> Lazy<T> {
  pub(crate) fn from_inner(inner: Arc<LazyInstance>) -> Self {
    Self {
      inner,
      typed: OnceCell::new(),
    }
  }

  /// The key this handle resolves.
  pub fn key(&self) -> &InjectionKey {
    &self.inner.key
  }

  pub fn is_resolved(&self) -> bool {
    self.inner.cell.get().is_some()
  }

  /// Resolves the dependency if needed and returns it.
  pub fn try_get(&self) -> Result<&Arc<T>> {
    self.typed.get_or_try_init(|| {
      let instance = self.inner.resolve()?;
      instance.downcast::<T>().ok_or_else(|| ContainerError::DependencyCouldNotBeInstantiated {
        target: self.inner.key.to_string(),
        reason: format!(
          "lazy dependency resolved to a {}, not a {}",
          instance.ty().name(),
          std::any::type_name::<T>()
        ),
        chain: self.inner.chain(),
      })
    })
  }

  /// Resolves the dependency if needed and returns it.
  ///
  /// # Panics
  ///
  /// Panics if the dependency cannot be resolved. Use [`try_get`](Lazy::try_get)
  /// to handle the error instead.
  pub fn get(&self) -> &Arc<T> {
    match self.try_get() {
      Ok(value) => value,
      Err(err) => panic!("Failed to resolve lazy dependency: {}", err),
    }
  }
}

impl<T: ?Sized + Any + Send + Sync> Deref for Lazy<T> {
  type Target = T;

  fn deref(&self) -> &T {
    self.get()
  }
}

impl<T: ?Sized> Clone for Lazy<T> {
  fn clone(&self) -> Self {
    Self {
      inner: self.inner.clone(),
      typed: self.typed.clone(),
    }
  }
}

impl<T: ?Sized> fmt::Debug for Lazy<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Lazy")
      .field("key", &self.inner.key)
      .field("resolved", &self.inner.cell.get().is_some())
      .finish()
  }
}
