//! Resolution: bindings, then initializers, then constructor autowiring.

use crate::container::Container;
use crate::core::{ResolutionGuard, Strategy, Subject};
use crate::error::{ContainerError, Result};
use crate::instance::{Args, Instance};
use crate::key::{InjectionKey, Tag};
use crate::lazy::LazyInstance;
use crate::reflect::{Argument, Arguments, Autowire, Builtin, ClassRef, ClassReflector, Param, TypeSpec};
use std::any::Any;
use std::panic::Location;
use std::sync::Arc;
use tracing::{debug, trace};

impl Container {
  // --- Resolution ---

  /// Resolves `T`, autowiring it if nothing is registered for it.
  #[track_caller]
  pub fn get<T: Autowire>(&self) -> Result<Arc<T>> {
    self.get_typed(InjectionKey::new::<T>(), Some(ClassRef::of::<T>()), &Args::new(), Location::caller())
  }

  /// Resolves the tagged variant of `T`. Tagged keys are never autowired.
  #[track_caller]
  pub fn get_tagged<T: Autowire>(&self, tag: impl Into<Tag>) -> Result<Arc<T>> {
    self.get_typed(
      InjectionKey::tagged::<T>(tag),
      Some(ClassRef::of::<T>()),
      &Args::new(),
      Location::caller(),
    )
  }

  /// Resolves `T` with explicit arguments. Named arguments replace the
  /// constructor parameter of the same name; positional ones fill the first
  /// parameter whose type they match. Factories receive the arguments as-is.
  #[track_caller]
  pub fn get_with<T: Autowire>(&self, args: &Args) -> Result<Arc<T>> {
    self.get_typed(InjectionKey::new::<T>(), Some(ClassRef::of::<T>()), args, Location::caller())
  }

  /// Resolves a type that can only come from a binding or an initializer,
  /// such as a trait object.
  #[track_caller]
  pub fn get_trait<I: ?Sized + Any + Send + Sync>(&self) -> Result<Arc<I>> {
    self.get_typed(InjectionKey::new::<I>(), None, &Args::new(), Location::caller())
  }

  #[track_caller]
  pub fn get_trait_tagged<I: ?Sized + Any + Send + Sync>(&self, tag: impl Into<Tag>) -> Result<Arc<I>> {
    self.get_typed(InjectionKey::tagged::<I>(tag), None, &Args::new(), Location::caller())
  }

  /// Resolves an arbitrary key to an erased instance.
  #[track_caller]
  pub fn get_key(&self, key: &InjectionKey, class: Option<ClassRef>, args: &Args) -> Result<Instance> {
    self.resolve(key, class.as_ref(), args, Location::caller())
  }

  fn get_typed<T: ?Sized + Any + Send + Sync>(
    &self,
    key: InjectionKey,
    class: Option<ClassRef>,
    args: &Args,
    location: &'static Location<'static>,
  ) -> Result<Arc<T>> {
    let instance = self.resolve(&key, class.as_ref(), args, location)?;
    instance.downcast::<T>().ok_or_else(|| mismatch(self, &key, &instance))
  }

  pub(crate) fn resolve(
    &self,
    key: &InjectionKey,
    class: Option<&ClassRef>,
    args: &Args,
    location: &'static Location<'static>,
  ) -> Result<Instance> {
    self.resolve_preferring(key, class, args, &[], location)
  }

  /// Resolves `key`, preferring an initializer that also declares every key
  /// in `also` when several would match.
  fn resolve_preferring(
    &self,
    key: &InjectionKey,
    class: Option<&ClassRef>,
    args: &Args,
    also: &[InjectionKey],
    location: &'static Location<'static>,
  ) -> Result<Instance> {
    let guard = ResolutionGuard::enter(self, Subject::Key(key.clone()), location)?;
    trace!(key = %key, "resolving dependency");

    if let Some(provider) = self.provider(key) {
      guard.set_strategy(Strategy::Factory);
      trace!(key = %key, singleton = provider.is_singleton(), "using registered binding");
      let instance = provider.provide(self, key, args)?;
      return self.checked(&guard, key, instance);
    }

    let initializer = if also.is_empty() {
      self.find_initializer(key, &[])
    } else {
      self
        .find_initializer(key, also)
        .or_else(|| self.find_initializer(key, &[]))
    };
    if let Some(initializer) = initializer {
      guard.set_strategy(Strategy::Initializer(initializer.name().to_owned()));
      debug!(key = %key, initializer = initializer.name(), "using initializer");
      let initialize = || {
        let instance = initializer.initialize(self, key)?;
        self.checked(&guard, key, instance)
      };
      return if initializer.is_singleton() {
        self.singleton_once(key, initialize)
      } else {
        initialize()
      };
    }

    if key.tag().is_some() {
      return Err(ContainerError::TaggedDependencyCouldNotBeResolved {
        key: key.clone(),
        chain: guard.chain(key.to_string()),
      });
    }

    match class {
      Some(class) if self.config().autowire => {
        let reflector = class.reflector();
        self.autowire(&guard, key, &reflector, args, location)
      }
      Some(_) => Err(ContainerError::DependencyCouldNotBeInstantiated {
        target: key.to_string(),
        reason: "it is not registered and autowiring is disabled".to_string(),
        chain: guard.chain(key.to_string()),
      }),
      None => Err(ContainerError::DependencyCouldNotBeInstantiated {
        target: key.to_string(),
        reason: "it has no binding or initializer and cannot be autowired".to_string(),
        chain: guard.chain(key.to_string()),
      }),
    }
  }

  /// Rejects instances not stored as the requested type.
  fn checked(&self, guard: &ResolutionGuard, key: &InjectionKey, instance: Instance) -> Result<Instance> {
    if instance.ty() == key.ty() {
      Ok(instance)
    } else {
      Err(ContainerError::DependencyCouldNotBeInstantiated {
        target: key.to_string(),
        reason: format!("the binding produced a {}", instance.ty().name()),
        chain: guard.chain(key.to_string()),
      })
    }
  }

  fn autowire(
    &self,
    guard: &ResolutionGuard,
    key: &InjectionKey,
    reflector: &ClassReflector,
    args: &Args,
    location: &'static Location<'static>,
  ) -> Result<Instance> {
    guard.set_strategy(Strategy::Autowire);
    debug!(key = %key, singleton = reflector.is_singleton(), "autowiring constructor");

    if reflector.is_singleton() {
      self.singleton_once(key, || self.construct(guard, key, reflector, args, location))
    } else {
      self.construct(guard, key, reflector, args, location)
    }
  }

  fn construct(
    &self,
    guard: &ResolutionGuard,
    key: &InjectionKey,
    reflector: &ClassReflector,
    args: &Args,
    location: &'static Location<'static>,
  ) -> Result<Instance> {
    let owner = format!("{}::new", reflector.key().short_name());
    let mut positional = args.positional().to_vec();
    let mut arguments = Arguments::new(key.to_string(), self);
    for param in reflector.params() {
      guard.set_parameter(param.to_string());
      let argument = self.autowire_parameter(&owner, param, args, &mut positional, false, location)?;
      arguments.insert(param.name(), argument);
    }
    guard.clear_parameter();

    let instance = reflector.construct(&arguments)?;

    for property in reflector.properties() {
      guard.set_parameter(property.param.to_string());
      trace!(key = %key, property = property.param.name(), "injecting property");
      let argument = self.autowire_parameter(&owner, &property.param, &Args::new(), &mut Vec::new(), false, location)?;
      (property.assign)(self, &instance, argument)?;
    }
    guard.clear_parameter();

    Ok(instance)
  }

  /// Finds a value for one parameter of a constructor or callable.
  ///
  /// With `transform`, a named argument whose type does not fit a class or
  /// interface parameter is used to build a value of the declared type.
  pub(crate) fn autowire_parameter(
    &self,
    owner: &str,
    param: &Param,
    args: &Args,
    positional: &mut Vec<Instance>,
    transform: bool,
    location: &'static Location<'static>,
  ) -> Result<Argument> {
    if let Some(value) = args.named(param.name()) {
      if transform && !param.ty().is_builtin() && !param.ty().accepts(value) {
        return self.transform(param, value, location);
      }
      trace!(parameter = param.name(), "using named argument");
      return Ok(Argument::Value(value.clone()));
    }

    if let Some(idx) = positional.iter().position(|value| param.ty().accepts(value)) {
      trace!(parameter = param.name(), "using positional argument");
      return Ok(Argument::Value(positional.remove(idx)));
    }

    if let TypeSpec::Builtin(builtin) = param.ty() {
      return self.autowire_builtin(owner, param, *builtin, location);
    }

    if param.is_lazy() {
      if let Some(member) = param.ty().members().first() {
        if let Some(key) = param.key_for(member) {
          trace!(parameter = param.name(), key = %key, "deferring lazy parameter");
          let lazy = LazyInstance::new(self, key, member.class_ref().copied(), location);
          return Ok(Argument::Lazy(Arc::new(lazy)));
        }
      }
    }

    let mut last_error = None;
    for (key, class, also) in candidates(param) {
      match self.resolve_preferring(&key, class.as_ref(), &Args::new(), &also, location) {
        Ok(instance) => return Ok(Argument::Value(instance)),
        Err(err) if err.is_circular() => return Err(err),
        Err(err) => {
          debug!(parameter = param.name(), candidate = %key, "candidate could not be resolved");
          last_error = Some(err);
        }
      }
    }

    if let Some(default) = param.default_value() {
      return Ok(Argument::Value(default.clone()));
    }
    if param.is_nullable() {
      return Ok(Argument::Null);
    }
    Err(last_error.unwrap_or_else(|| self.not_autowirable(owner, param, param.ty().to_string())))
  }

  fn autowire_builtin(
    &self,
    owner: &str,
    param: &Param,
    builtin: Builtin,
    location: &'static Location<'static>,
  ) -> Result<Argument> {
    let key = InjectionKey::from_parts(builtin.key(), param.tag_value().cloned());
    if self.has_key(&key) || self.find_initializer(&key, &[]).is_some() {
      trace!(parameter = param.name(), key = %key, "resolving builtin through the container");
      return self.resolve(&key, None, &Args::new(), location).map(Argument::Value);
    }
    if let Some(default) = param.default_value() {
      return Ok(Argument::Value(default.clone()));
    }
    if builtin == Builtin::Array {
      return Ok(Argument::Value(Instance::from_value(crate::reflect::Array::new())));
    }
    if param.is_nullable() {
      return Ok(Argument::Null);
    }
    Err(self.not_autowirable(owner, param, builtin.name().to_string()))
  }

  fn transform(&self, param: &Param, value: &Instance, location: &'static Location<'static>) -> Result<Argument> {
    let member = param.ty().members().first().cloned();
    let key = member.as_ref().and_then(|member| param.key_for(member));
    match (member, key) {
      (Some(member), Some(key)) => {
        debug!(parameter = param.name(), from = value.ty().name(), to = %key, "transforming argument");
        let args = Args::new().push_instance(value.clone());
        self
          .resolve(&key, member.class_ref(), &args, location)
          .map(Argument::Value)
      }
      _ => Ok(Argument::Value(value.clone())),
    }
  }

  fn not_autowirable(&self, owner: &str, param: &Param, ty: String) -> ContainerError {
    ContainerError::DependencyCouldNotBeAutowired {
      owner: owner.to_owned(),
      parameter: param.to_string(),
      chain: crate::core::current_chain(self.id(), ty.clone(), None),
      ty,
    }
  }
}

/// The keys to try for a non-builtin parameter, in order. Intersection
/// parameters try their first member, preferring initializers that declare
/// every member.
fn candidates(param: &Param) -> Vec<(InjectionKey, Option<ClassRef>, Vec<InjectionKey>)> {
  match param.ty() {
    TypeSpec::Intersection(members) => {
      let keys: Vec<InjectionKey> = members.iter().filter_map(|member| param.key_for(member)).collect();
      match (members.first(), keys.split_first()) {
        (Some(first), Some((key, rest))) => vec![(key.clone(), first.class_ref().copied(), rest.to_vec())],
        _ => Vec::new(),
      }
    }
    ty => ty
      .members()
      .iter()
      .filter_map(|member| {
        param
          .key_for(member)
          .map(|key| (key, member.class_ref().copied(), Vec::new()))
      })
      .collect(),
  }
}

fn mismatch(container: &Container, key: &InjectionKey, instance: &Instance) -> ContainerError {
  ContainerError::DependencyCouldNotBeInstantiated {
    target: key.to_string(),
    reason: format!("resolved a {}", instance.ty().name()),
    chain: crate::core::current_chain(container.id(), key.to_string(), None),
  }
}
