//! Type-erased instances and explicitly supplied arguments.

use crate::key::TypeKey;
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A resolved value of any type, including trait objects.
///
/// Internally this is an `Arc<T>` boxed behind `dyn Any`, so cloning is cheap
/// and `downcast` hands back the very same `Arc<T>` that was stored.
#[derive(Clone)]
pub struct Instance {
  ty: TypeKey,
  value: Arc<dyn Any + Send + Sync>,
}

impl Instance {
  /// Wraps an already shared value. Works for `T = dyn Trait`.
  pub fn new<T: ?Sized + Any + Send + Sync>(value: Arc<T>) -> Self {
    Self {
      ty: TypeKey::of::<T>(),
      value: Arc::new(value),
    }
  }

  /// Wraps an owned value.
  pub fn from_value<T: Any + Send + Sync>(value: T) -> Self {
    Self::new(Arc::new(value))
  }

  /// The type this instance was stored as.
  pub fn ty(&self) -> TypeKey {
    self.ty
  }

  pub fn is<T: ?Sized + Any>(&self) -> bool {
    self.ty == TypeKey::of::<T>()
  }

  pub fn downcast<T: ?Sized + Any + Send + Sync>(&self) -> Option<Arc<T>> {
    self.value.downcast_ref::<Arc<T>>().cloned()
  }

  /// Clones the inner value out.
  pub fn value<T: Any + Send + Sync + Clone>(&self) -> Option<T> {
    self.downcast::<T>().map(|arc| (*arc).clone())
  }

  /// True if `other` is a clone of this instance.
  pub fn ptr_eq(&self, other: &Instance) -> bool {
    Arc::ptr_eq(&self.value, &other.value)
  }
}

impl fmt::Debug for Instance {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "Instance({})", self.ty.name())
  }
}

/// Explicit arguments handed to a resolution or invocation.
///
/// Named arguments are matched against parameter names. Positional arguments
/// carry no name and are matched to the first parameter whose declared type
/// they satisfy.
#[derive(Clone, Default)]
pub struct Args {
  named: HashMap<String, Instance>,
  positional: Vec<Instance>,
}

impl Args {
  pub fn new() -> Self {
    Self::default()
  }

  /// Adds a named argument.
  pub fn with<T: Any + Send + Sync>(mut self, name: &str, value: T) -> Self {
    self.named.insert(name.to_owned(), Instance::from_value(value));
    self
  }

  /// Adds a named argument that is already an `Instance` or a shared value.
  pub fn with_instance(mut self, name: &str, value: Instance) -> Self {
    self.named.insert(name.to_owned(), value);
    self
  }

  /// Adds a positional argument.
  pub fn push<T: Any + Send + Sync>(mut self, value: T) -> Self {
    self.positional.push(Instance::from_value(value));
    self
  }

  pub fn push_instance(mut self, value: Instance) -> Self {
    self.positional.push(value);
    self
  }

  pub fn named(&self, name: &str) -> Option<&Instance> {
    self.named.get(name)
  }

  pub fn positional(&self) -> &[Instance] {
    &self.positional
  }

  pub fn is_empty(&self) -> bool {
    self.named.is_empty() && self.positional.is_empty()
  }
}

impl fmt::Debug for Args {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Args")
      .field("named", &self.named)
      .field("positional", &self.positional)
      .finish()
  }
}
