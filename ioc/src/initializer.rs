//! Pluggable producers consulted when no binding exists for a key.

use crate::container::Container;
use crate::error::Result;
use crate::instance::Instance;
use crate::key::{InjectionKey, Tag};
use std::any::Any;
use std::sync::Arc;

/// Something that can build instances for one or more keys.
///
/// Initializers are probed in registration order; the first one whose
/// [`declares`](Initializer::declares) returns `true` for the requested key
/// builds it. Declarations may be static or conditional.
///
/// ```
/// use fibre_autowire::{Container, Initializer, InjectionKey, Instance, Result};
///
/// struct Banner;
///
/// impl Initializer for Banner {
///   fn declares(&self, key: &InjectionKey) -> bool {
///     *key == InjectionKey::tagged::<String>("banner")
///   }
///
///   fn initialize(&self, _: &Container, _: &InjectionKey) -> Result<Instance> {
///     Ok(Instance::from_value(String::from("Welcome!")))
///   }
/// }
///
/// let container = Container::new();
/// container.add_initializer(Banner);
/// let banner = container.get_trait_tagged::<String>("banner").unwrap();
/// assert_eq!(*banner, "Welcome!");
/// ```
pub trait Initializer: Send + Sync + 'static {
  /// True if this initializer can produce `key`.
  fn declares(&self, key: &InjectionKey) -> bool;

  /// Builds an instance for `key`. The instance must be stored as `key`'s type.
  fn initialize(&self, container: &Container, key: &InjectionKey) -> Result<Instance>;

  /// Singleton initializers have their output cached under the requested key.
  fn is_singleton(&self) -> bool {
    false
  }

  fn name(&self) -> &str {
    std::any::type_name::<Self>()
  }
}

type Produce = Box<dyn Fn(&Container, &InjectionKey) -> Result<Instance> + Send + Sync>;

/// A closure-backed initializer for a single type.
///
/// ```
/// use fibre_autowire::{Container, FnInitializer};
///
/// struct Clock {
///   zone: &'static str,
/// }
///
/// let container = Container::new();
/// container.add_initializer(
///   FnInitializer::for_type(|_| Ok(Clock { zone: "UTC" }))
///     .named("ClockInitializer")
///     .singleton(),
/// );
///
/// let first = container.get_trait::<Clock>().unwrap();
/// let second = container.get_trait::<Clock>().unwrap();
/// assert_eq!(first.zone, "UTC");
/// assert!(std::sync::Arc::ptr_eq(&first, &second));
/// ```
pub struct FnInitializer {
  name: String,
  key: InjectionKey,
  singleton: bool,
  produce: Produce,
}

impl FnInitializer {
  pub fn for_type<T: Any + Send + Sync>(
    factory: impl Fn(&Container) -> Result<T> + Send + Sync + 'static,
  ) -> Self {
    Self {
      name: format!("FnInitializer<{}>", std::any::type_name::<T>()),
      key: InjectionKey::new::<T>(),
      singleton: false,
      produce: Box::new(move |container: &Container, _: &InjectionKey| factory(container).map(Instance::from_value)),
    }
  }

  pub fn for_trait<I: ?Sized + Any + Send + Sync>(
    factory: impl Fn(&Container) -> Result<Arc<I>> + Send + Sync + 'static,
  ) -> Self {
    Self {
      name: format!("FnInitializer<{}>", std::any::type_name::<I>()),
      key: InjectionKey::new::<I>(),
      singleton: false,
      produce: Box::new(move |container: &Container, _: &InjectionKey| factory(container).map(Instance::new)),
    }
  }

  /// Restricts the initializer to the tagged variant of its type.
  pub fn tagged(mut self, tag: impl Into<Tag>) -> Self {
    self.key = self.key.with_tag(Some(tag.into()));
    self
  }

  pub fn named(mut self, name: &str) -> Self {
    self.name = name.to_owned();
    self
  }

  pub fn singleton(mut self) -> Self {
    self.singleton = true;
    self
  }
}

impl Initializer for FnInitializer {
  fn declares(&self, key: &InjectionKey) -> bool {
    self.key == *key
  }

  fn initialize(&self, container: &Container, key: &InjectionKey) -> Result<Instance> {
    (self.produce)(container, key)
  }

  fn is_singleton(&self) -> bool {
    self.singleton
  }

  fn name(&self) -> &str {
    &self.name
  }
}
