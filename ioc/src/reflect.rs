//! Type metadata the container autowires from.
//!
//! Rust has no runtime reflection, so every autowirable type describes itself
//! once through [`Autowire::blueprint`]. The description is erased into a
//! [`ClassReflector`] and memoised in a process-wide table keyed by `TypeId`;
//! types are static for the life of the program, so entries are never evicted.

use crate::container::Container;
use crate::core::current_chain;
use crate::error::{ContainerError, Result};
use crate::instance::Instance;
use crate::key::{InjectionKey, Tag, TypeKey};
use crate::lazy::{Lazy, LazyInstance};
use dashmap::DashMap;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// The value type of the builtin `array` type.
pub type Array = Vec<serde_json::Value>;

static REFLECTORS: once_cell::sync::Lazy<DashMap<TypeId, Arc<ClassReflector>>> =
  once_cell::sync::Lazy::new(DashMap::new);

/// A type the container can construct by resolving its constructor parameters.
///
/// ```
/// use fibre_autowire::{Autowire, Blueprint, Container, Param};
/// use std::sync::Arc;
///
/// struct Database;
/// impl Autowire for Database {
///   fn blueprint() -> Blueprint<Self> {
///     Blueprint::new(|_| Ok(Database))
///   }
/// }
///
/// struct Repository {
///   db: Arc<Database>,
/// }
/// impl Autowire for Repository {
///   fn blueprint() -> Blueprint<Self> {
///     Blueprint::new(|args| Ok(Repository { db: args.get("db")? }))
///       .param(Param::of::<Database>("db"))
///   }
/// }
///
/// let container = Container::new();
/// let repository = container.get::<Repository>().unwrap();
/// let _db: &Database = &repository.db;
/// ```
pub trait Autowire: Any + Send + Sync + Sized {
  fn blueprint() -> Blueprint<Self>;
}

/// Returns the memoised reflector for `T`, building it on first use.
pub fn reflect<T: Autowire>() -> Arc<ClassReflector> {
  let id = TypeId::of::<T>();
  if let Some(reflector) = REFLECTORS.get(&id) {
    return reflector.value().clone();
  }
  // Built outside the map lock so a blueprint may reflect other types.
  let reflector = Arc::new(T::blueprint().into_reflector());
  REFLECTORS.entry(id).or_insert(reflector).value().clone()
}

/// The builtin scalar and collection types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Builtin {
  String,
  Bool,
  Int,
  Float,
  Array,
}

impl Builtin {
  /// The Rust type values of this builtin are stored as.
  pub fn key(&self) -> TypeKey {
    match self {
      Builtin::String => TypeKey::of::<String>(),
      Builtin::Bool => TypeKey::of::<bool>(),
      Builtin::Int => TypeKey::of::<i64>(),
      Builtin::Float => TypeKey::of::<f64>(),
      Builtin::Array => TypeKey::of::<Array>(),
    }
  }

  pub fn name(&self) -> &'static str {
    match self {
      Builtin::String => "string",
      Builtin::Bool => "bool",
      Builtin::Int => "int",
      Builtin::Float => "float",
      Builtin::Array => "array",
    }
  }
}

/// A reference to an autowirable type: its key plus a way to reflect it.
#[derive(Clone, Copy)]
pub struct ClassRef {
  key: TypeKey,
  reflect: fn() -> Arc<ClassReflector>,
}

impl ClassRef {
  pub fn of<T: Autowire>() -> Self {
    Self {
      key: TypeKey::of::<T>(),
      reflect: reflect::<T>,
    }
  }

  pub fn key(&self) -> TypeKey {
    self.key
  }

  pub fn reflector(&self) -> Arc<ClassReflector> {
    (self.reflect)()
  }
}

impl fmt::Debug for ClassRef {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "ClassRef({})", self.key.name())
  }
}

/// The declared type of a parameter or property.
#[derive(Debug, Clone)]
pub enum TypeSpec {
  /// A concrete type that can be autowired.
  Class(ClassRef),
  /// A type that only a binding or initializer can provide, usually `dyn Trait`.
  Interface(TypeKey),
  Builtin(Builtin),
  /// Any one of the listed types, tried in order.
  Union(Vec<TypeSpec>),
  /// All of the listed types at once.
  Intersection(Vec<TypeSpec>),
}

impl TypeSpec {
  pub fn class<T: Autowire>() -> Self {
    TypeSpec::Class(ClassRef::of::<T>())
  }

  pub fn interface<I: ?Sized + Any>() -> Self {
    TypeSpec::Interface(TypeKey::of::<I>())
  }

  /// The type key of a single (non-composite) type.
  pub fn key(&self) -> Option<TypeKey> {
    match self {
      TypeSpec::Class(class) => Some(class.key()),
      TypeSpec::Interface(key) => Some(*key),
      TypeSpec::Builtin(builtin) => Some(builtin.key()),
      TypeSpec::Union(_) | TypeSpec::Intersection(_) => None,
    }
  }

  pub(crate) fn class_ref(&self) -> Option<&ClassRef> {
    match self {
      TypeSpec::Class(class) => Some(class),
      _ => None,
    }
  }

  pub fn is_builtin(&self) -> bool {
    matches!(self, TypeSpec::Builtin(_))
  }

  /// The individual types a composite type is made of, in declared order.
  pub fn members(&self) -> &[TypeSpec] {
    match self {
      TypeSpec::Union(members) | TypeSpec::Intersection(members) => members,
      single => std::slice::from_ref(single),
    }
  }

  /// True if `instance` can be passed where this type is expected.
  pub fn accepts(&self, instance: &Instance) -> bool {
    match self {
      TypeSpec::Union(members) => members.iter().any(|member| member.accepts(instance)),
      TypeSpec::Intersection(members) => members.iter().any(|member| member.accepts(instance)),
      single => single.key() == Some(instance.ty()),
    }
  }
}

impl fmt::Display for TypeSpec {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      TypeSpec::Class(class) => f.write_str(class.key().short_name()),
      TypeSpec::Interface(key) => f.write_str(key.short_name()),
      TypeSpec::Builtin(builtin) => f.write_str(builtin.name()),
      TypeSpec::Union(members) | TypeSpec::Intersection(members) => {
        let separator = if matches!(self, TypeSpec::Union(_)) { "|" } else { "&" };
        for (idx, member) in members.iter().enumerate() {
          if idx > 0 {
            f.write_str(separator)?;
          }
          write!(f, "{}", member)?;
        }
        Ok(())
      }
    }
  }
}

/// A constructor or callable parameter.
#[derive(Debug, Clone)]
pub struct Param {
  pub(crate) name: String,
  pub(crate) ty: TypeSpec,
  pub(crate) nullable: bool,
  pub(crate) default: Option<Instance>,
  pub(crate) tag: Option<Tag>,
  pub(crate) lazy: bool,
}

impl Param {
  pub fn new(name: &str, ty: TypeSpec) -> Self {
    Self {
      name: name.to_owned(),
      ty,
      nullable: false,
      default: None,
      tag: None,
      lazy: false,
    }
  }

  pub fn of<T: Autowire>(name: &str) -> Self {
    Self::new(name, TypeSpec::class::<T>())
  }

  pub fn interface<I: ?Sized + Any>(name: &str) -> Self {
    Self::new(name, TypeSpec::interface::<I>())
  }

  pub fn string(name: &str) -> Self {
    Self::new(name, TypeSpec::Builtin(Builtin::String))
  }

  pub fn bool(name: &str) -> Self {
    Self::new(name, TypeSpec::Builtin(Builtin::Bool))
  }

  pub fn int(name: &str) -> Self {
    Self::new(name, TypeSpec::Builtin(Builtin::Int))
  }

  pub fn float(name: &str) -> Self {
    Self::new(name, TypeSpec::Builtin(Builtin::Float))
  }

  pub fn array(name: &str) -> Self {
    Self::new(name, TypeSpec::Builtin(Builtin::Array))
  }

  pub fn union(name: &str, members: Vec<TypeSpec>) -> Self {
    Self::new(name, TypeSpec::Union(members))
  }

  pub fn intersection(name: &str, members: Vec<TypeSpec>) -> Self {
    Self::new(name, TypeSpec::Intersection(members))
  }

  /// Resolves to null instead of failing when nothing can be resolved.
  pub fn nullable(mut self) -> Self {
    self.nullable = true;
    self
  }

  /// The value used when nothing can be resolved.
  pub fn with_default<T: Any + Send + Sync>(mut self, value: T) -> Self {
    self.default = Some(Instance::from_value(value));
    self
  }

  /// Resolves the tagged variant of the declared type.
  pub fn tag(mut self, tag: impl Into<Tag>) -> Self {
    self.tag = Some(tag.into());
    self
  }

  /// Passes a [`Lazy`] handle instead of resolving up front.
  pub fn lazy(mut self) -> Self {
    self.lazy = true;
    self
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn ty(&self) -> &TypeSpec {
    &self.ty
  }

  pub fn is_nullable(&self) -> bool {
    self.nullable
  }

  pub fn default_value(&self) -> Option<&Instance> {
    self.default.as_ref()
  }

  pub fn tag_value(&self) -> Option<&Tag> {
    self.tag.as_ref()
  }

  pub fn is_lazy(&self) -> bool {
    self.lazy
  }

  pub(crate) fn key_for(&self, member: &TypeSpec) -> Option<InjectionKey> {
    member
      .key()
      .map(|ty| InjectionKey::from_parts(ty, self.tag.clone()))
  }
}

impl fmt::Display for Param {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let nullable = if self.nullable { "?" } else { "" };
    write!(f, "{}: {}{}", self.name, nullable, self.ty)
  }
}

/// A named, ordered parameter list.
#[derive(Debug, Clone)]
pub struct Signature {
  name: String,
  params: Vec<Param>,
}

impl Signature {
  pub fn new(name: &str) -> Self {
    Self {
      name: name.to_owned(),
      params: Vec::new(),
    }
  }

  pub fn param(mut self, param: Param) -> Self {
    self.params.push(param);
    self
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn params(&self) -> &[Param] {
    &self.params
  }
}

impl fmt::Display for Signature {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}(", self.name)?;
    for (idx, param) in self.params.iter().enumerate() {
      if idx > 0 {
        f.write_str(", ")?;
      }
      write!(f, "{}", param)?;
    }
    f.write_str(")")
  }
}

/// A resolved parameter value.
#[derive(Clone)]
pub(crate) enum Argument {
  Value(Instance),
  Null,
  Lazy(Arc<LazyInstance>),
}

/// The resolved arguments a constructor or callable body reads from.
pub struct Arguments {
  owner: String,
  container: usize,
  values: HashMap<String, Argument>,
}

impl Arguments {
  pub(crate) fn new(owner: impl Into<String>, container: &Container) -> Self {
    Self {
      owner: owner.into(),
      container: container.id(),
      values: HashMap::new(),
    }
  }

  pub(crate) fn insert(&mut self, name: &str, argument: Argument) {
    self.values.insert(name.to_owned(), argument);
  }

  fn error(&self, reason: String) -> ContainerError {
    ContainerError::DependencyCouldNotBeInstantiated {
      target: self.owner.clone(),
      chain: current_chain(self.container, self.owner.clone(), None),
      reason,
    }
  }

  fn argument(&self, name: &str) -> Result<&Argument> {
    self
      .values
      .get(name)
      .ok_or_else(|| self.error(format!("no argument named `{}` was resolved", name)))
  }

  pub fn has(&self, name: &str) -> bool {
    self.values.contains_key(name)
  }

  /// True if the argument resolved to null.
  pub fn is_null(&self, name: &str) -> bool {
    matches!(self.values.get(name), Some(Argument::Null))
  }

  /// The argument as an erased instance, resolving it if it is lazy.
  pub fn instance(&self, name: &str) -> Result<Instance> {
    match self.argument(name)? {
      Argument::Value(instance) => Ok(instance.clone()),
      Argument::Lazy(lazy) => lazy.resolve().cloned(),
      Argument::Null => Err(self.error(format!("argument `{}` is null", name))),
    }
  }

  pub fn get<T: ?Sized + Any + Send + Sync>(&self, name: &str) -> Result<Arc<T>> {
    let instance = self.instance(name)?;
    instance.downcast::<T>().ok_or_else(|| {
      self.error(format!(
        "argument `{}` is a {}, not a {}",
        name,
        instance.ty().name(),
        std::any::type_name::<T>()
      ))
    })
  }

  /// Like [`get`](Self::get), but null arguments become `None`.
  pub fn optional<T: ?Sized + Any + Send + Sync>(&self, name: &str) -> Result<Option<Arc<T>>> {
    match self.argument(name)? {
      Argument::Null => Ok(None),
      _ => self.get::<T>(name).map(Some),
    }
  }

  /// Clones a value argument out of its `Arc`.
  pub fn value<T: Any + Send + Sync + Clone>(&self, name: &str) -> Result<T> {
    self.get::<T>(name).map(|value| (*value).clone())
  }

  /// The argument as a lazy handle. Eager arguments are wrapped in an already
  /// resolved handle.
  pub fn lazy<T: ?Sized + Any + Send + Sync>(&self, name: &str) -> Result<Lazy<T>> {
    match self.argument(name)? {
      Argument::Lazy(lazy) => Ok(Lazy::from_inner(lazy.clone())),
      Argument::Value(instance) => Ok(Lazy::from_inner(Arc::new(LazyInstance::resolved(
        instance.clone(),
      )))),
      Argument::Null => Err(self.error(format!("argument `{}` is null", name))),
    }
  }
}

type Constructor<T> = Box<dyn Fn(&Arguments) -> Result<T> + Send + Sync>;
type Assign = Box<dyn Fn(&Container, &Instance, Argument) -> Result<()> + Send + Sync>;

/// A property filled in after construction.
pub(crate) struct Property {
  pub(crate) param: Param,
  pub(crate) assign: Assign,
}

/// How to build a `T`: its constructor, parameters and class-level attributes.
pub struct Blueprint<T> {
  constructor: Constructor<T>,
  params: Vec<Param>,
  singleton: bool,
  properties: Vec<Property>,
}

impl<T: Autowire> Blueprint<T> {
  pub fn new(constructor: impl Fn(&Arguments) -> Result<T> + Send + Sync + 'static) -> Self {
    Self {
      constructor: Box::new(constructor),
      params: Vec::new(),
      singleton: false,
      properties: Vec::new(),
    }
  }

  pub fn param(mut self, param: Param) -> Self {
    self.params.push(param);
    self
  }

  /// Marks the type as a singleton: the first autowired instance is cached.
  pub fn singleton(mut self) -> Self {
    self.singleton = true;
    self
  }

  /// Injects an autowirable dependency into a property after construction.
  pub fn inject<D: Autowire>(
    self,
    name: &str,
    assign: impl Fn(&T, Arc<D>) + Send + Sync + 'static,
  ) -> Self {
    self.inject_param(Param::of::<D>(name), assign)
  }

  /// Injects a binding-only dependency (e.g. a trait object) into a property.
  pub fn inject_trait<I: ?Sized + Any + Send + Sync>(
    self,
    name: &str,
    assign: impl Fn(&T, Arc<I>) + Send + Sync + 'static,
  ) -> Self {
    self.inject_param(Param::interface::<I>(name), assign)
  }

  /// Injects a lazy handle into a property; nothing is resolved until first access.
  pub fn inject_lazy<D: Autowire>(
    mut self,
    name: &str,
    assign: impl Fn(&T, Lazy<D>) + Send + Sync + 'static,
  ) -> Self {
    let param = Param::of::<D>(name).lazy();
    let property = param.name.clone();
    self.properties.push(Property {
      param,
      assign: Box::new(move |container: &Container, target: &Instance, argument: Argument| {
        let target = downcast_target::<T>(container, target)?;
        match argument {
          Argument::Lazy(lazy) => {
            assign(&*target, Lazy::from_inner(lazy));
            Ok(())
          }
          Argument::Value(instance) => {
            assign(&*target, Lazy::from_inner(Arc::new(LazyInstance::resolved(instance))));
            Ok(())
          }
          Argument::Null => Err(property_error::<T>(container, &property, "is null")),
        }
      }),
    });
    self
  }

  fn inject_param<D: ?Sized + Any + Send + Sync>(
    mut self,
    param: Param,
    assign: impl Fn(&T, Arc<D>) + Send + Sync + 'static,
  ) -> Self {
    let property = param.name.clone();
    self.properties.push(Property {
      param,
      assign: Box::new(move |container: &Container, target: &Instance, argument: Argument| {
        let target = downcast_target::<T>(container, target)?;
        let value = match argument {
          Argument::Value(instance) => instance.downcast::<D>(),
          Argument::Lazy(lazy) => lazy.resolve()?.downcast::<D>(),
          Argument::Null => None,
        }
        .ok_or_else(|| property_error::<T>(container, &property, "could not be resolved"))?;
        assign(&*target, value);
        Ok(())
      }),
    });
    self
  }

  pub(crate) fn into_reflector(self) -> ClassReflector {
    let constructor = self.constructor;
    ClassReflector {
      key: TypeKey::of::<T>(),
      params: self.params,
      singleton: self.singleton,
      properties: self.properties,
      construct: Box::new(move |args: &Arguments| constructor(args).map(Instance::from_value)),
    }
  }
}

fn downcast_target<T: Any + Send + Sync>(container: &Container, target: &Instance) -> Result<Arc<T>> {
  target.downcast::<T>().ok_or_else(|| ContainerError::DependencyCouldNotBeInstantiated {
    target: std::any::type_name::<T>().to_owned(),
    reason: format!("cannot inject properties into a {}", target.ty().name()),
    chain: current_chain(container.id(), std::any::type_name::<T>(), None),
  })
}

fn property_error<T>(container: &Container, property: &str, what: &str) -> ContainerError {
  ContainerError::DependencyCouldNotBeInstantiated {
    target: std::any::type_name::<T>().to_owned(),
    reason: format!("property `{}` {}", property, what),
    chain: current_chain(container.id(), std::any::type_name::<T>(), None),
  }
}

/// The erased, memoised description of an autowirable type.
pub struct ClassReflector {
  key: TypeKey,
  params: Vec<Param>,
  singleton: bool,
  properties: Vec<Property>,
  construct: Box<dyn Fn(&Arguments) -> Result<Instance> + Send + Sync>,
}

impl ClassReflector {
  pub fn key(&self) -> TypeKey {
    self.key
  }

  pub fn params(&self) -> &[Param] {
    &self.params
  }

  pub fn is_singleton(&self) -> bool {
    self.singleton
  }

  /// Names of the properties injected after construction.
  pub fn injected_properties(&self) -> impl Iterator<Item = &str> {
    self.properties.iter().map(|property| property.param.name())
  }

  pub(crate) fn properties(&self) -> &[Property] {
    &self.properties
  }

  pub(crate) fn construct(&self, args: &Arguments) -> Result<Instance> {
    (self.construct)(args)
  }
}

impl fmt::Debug for ClassReflector {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("ClassReflector")
      .field("key", &self.key)
      .field("params", &self.params)
      .field("singleton", &self.singleton)
      .finish_non_exhaustive()
  }
}
