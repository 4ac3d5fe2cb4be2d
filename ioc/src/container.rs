//! The main `Container` struct: registration, lookup and initializers.

use crate::config::ContainerConfig;
use crate::core::{Factory, Provider};
use crate::error::Result;
use crate::initializer::Initializer;
use crate::instance::{Args, Instance};
use crate::key::{InjectionKey, Tag};
use crate::lazy::{Lazy, LazyInstance};
use crate::reflect::{Autowire, ClassRef};
use dashmap::DashMap;
use once_cell::sync::OnceCell;
use parking_lot::RwLock;
use std::any::Any;
use std::panic::Location;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Weak};
use tracing::debug;

static NEXT_CONTAINER_ID: AtomicUsize = AtomicUsize::new(1);

/// A value that knows which tag it should be registered under.
pub trait HasTag {
  fn tag(&self) -> Tag;
}

pub(crate) struct ContainerInner {
  id: usize,
  config: ContainerConfig,
  providers: DashMap<InjectionKey, Arc<Provider>>,
  // Construction slots for singletons built by autowiring or initializers.
  singleton_slots: DashMap<InjectionKey, Arc<OnceCell<Instance>>>,
  initializers: RwLock<Vec<Arc<dyn Initializer>>>,
}

/// The dependency-injection container.
///
/// This struct holds the bindings and initializers for all services and
/// resolves everything else by autowiring constructors. It is a cheap handle:
/// clones share the same registrations.
///
/// Registration is expected to happen during a setup phase; resolution can
/// then run from any thread.
#[derive(Clone)]
pub struct Container {
  inner: Arc<ContainerInner>,
}

impl Default for Container {
  fn default() -> Self {
    Self::with_config(ContainerConfig::default())
  }
}

impl Container {
  /// Creates a new, empty `Container`.
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_config(config: ContainerConfig) -> Self {
    Self {
      inner: Arc::new(ContainerInner {
        id: NEXT_CONTAINER_ID.fetch_add(1, Ordering::Relaxed),
        config,
        providers: DashMap::new(),
        singleton_slots: DashMap::new(),
        initializers: RwLock::new(Vec::new()),
      }),
    }
  }

  pub fn config(&self) -> &ContainerConfig {
    &self.inner.config
  }

  pub(crate) fn id(&self) -> usize {
    self.inner.id
  }

  pub(crate) fn downgrade(&self) -> Weak<ContainerInner> {
    Arc::downgrade(&self.inner)
  }

  pub(crate) fn upgrade(inner: &Weak<ContainerInner>) -> Option<Self> {
    inner.upgrade().map(|inner| Self { inner })
  }

  // --- PRIVATE HELPERS ---

  fn insert(&self, key: InjectionKey, provider: Provider) {
    debug!(key = %key, singleton = provider.is_singleton(), "registering binding");
    self.inner.singleton_slots.remove(&key);
    self.inner.providers.insert(key, Arc::new(provider));
  }

  fn factory_for<T: Any + Send + Sync>(
    factory: impl Fn(&Container, &Args) -> Result<T> + Send + Sync + 'static,
  ) -> Factory {
    Box::new(move |container: &Container, args: &Args| factory(container, args).map(Instance::from_value))
  }

  fn trait_factory_for<I: ?Sized + Any + Send + Sync>(
    factory: impl Fn(&Container, &Args) -> Result<Arc<I>> + Send + Sync + 'static,
  ) -> Factory {
    Box::new(move |container: &Container, args: &Args| factory(container, args).map(Instance::new))
  }

  /// The binding for `key`, cloned out so no map lock is held while it runs.
  pub(crate) fn provider(&self, key: &InjectionKey) -> Option<Arc<Provider>> {
    self.inner.providers.get(key).map(|entry| entry.value().clone())
  }

  /// Builds the singleton for `key` at most once, even when several threads
  /// ask for it at the same time, and caches it as a ready binding.
  pub(crate) fn singleton_once(
    &self,
    key: &InjectionKey,
    build: impl FnOnce() -> Result<Instance>,
  ) -> Result<Instance> {
    let slot = self.inner.singleton_slots.entry(key.clone()).or_default().clone();
    let instance = slot.get_or_try_init(build)?.clone();
    self
      .inner
      .providers
      .entry(key.clone())
      .or_insert_with(|| {
        debug!(key = %key, "caching singleton");
        Arc::new(Provider::ready(instance.clone()))
      });
    Ok(instance)
  }

  /// The first initializer, in registration order, that declares `key` and
  /// every key in `also`.
  pub(crate) fn find_initializer(
    &self,
    key: &InjectionKey,
    also: &[InjectionKey],
  ) -> Option<Arc<dyn Initializer>> {
    // Cloned so initializers may register further initializers while running.
    let initializers = self.inner.initializers.read().clone();
    initializers
      .into_iter()
      .find(|initializer| initializer.declares(key) && also.iter().all(|k| initializer.declares(k)))
  }

  // --- PUBLIC API ---

  // --- Transient Registration ---
  pub fn register<T: Any + Send + Sync>(
    &self,
    factory: impl Fn(&Container, &Args) -> Result<T> + Send + Sync + 'static,
  ) {
    self.register_key(InjectionKey::new::<T>(), Self::factory_for(factory), false);
  }
  pub fn register_tagged<T: Any + Send + Sync>(
    &self,
    tag: impl Into<Tag>,
    factory: impl Fn(&Container, &Args) -> Result<T> + Send + Sync + 'static,
  ) {
    self.register_key(InjectionKey::tagged::<T>(tag), Self::factory_for(factory), false);
  }
  pub fn register_trait<I: ?Sized + Any + Send + Sync>(
    &self,
    factory: impl Fn(&Container, &Args) -> Result<Arc<I>> + Send + Sync + 'static,
  ) {
    self.register_key(InjectionKey::new::<I>(), Self::trait_factory_for(factory), false);
  }
  pub fn register_trait_tagged<I: ?Sized + Any + Send + Sync>(
    &self,
    tag: impl Into<Tag>,
    factory: impl Fn(&Container, &Args) -> Result<Arc<I>> + Send + Sync + 'static,
  ) {
    self.register_key(InjectionKey::tagged::<I>(tag), Self::trait_factory_for(factory), false);
  }

  // --- Singleton Registration ---
  pub fn singleton<T: Any + Send + Sync>(
    &self,
    factory: impl Fn(&Container, &Args) -> Result<T> + Send + Sync + 'static,
  ) {
    self.register_key(InjectionKey::new::<T>(), Self::factory_for(factory), true);
  }
  pub fn singleton_tagged<T: Any + Send + Sync>(
    &self,
    tag: impl Into<Tag>,
    factory: impl Fn(&Container, &Args) -> Result<T> + Send + Sync + 'static,
  ) {
    self.register_key(InjectionKey::tagged::<T>(tag), Self::factory_for(factory), true);
  }
  pub fn singleton_trait<I: ?Sized + Any + Send + Sync>(
    &self,
    factory: impl Fn(&Container, &Args) -> Result<Arc<I>> + Send + Sync + 'static,
  ) {
    self.register_key(InjectionKey::new::<I>(), Self::trait_factory_for(factory), true);
  }
  pub fn singleton_trait_tagged<I: ?Sized + Any + Send + Sync>(
    &self,
    tag: impl Into<Tag>,
    factory: impl Fn(&Container, &Args) -> Result<Arc<I>> + Send + Sync + 'static,
  ) {
    self.register_key(InjectionKey::tagged::<I>(tag), Self::trait_factory_for(factory), true);
  }

  // --- Instance Registration ---
  pub fn singleton_instance<T: Any + Send + Sync>(&self, instance: T) {
    self.insert(InjectionKey::new::<T>(), Provider::ready(Instance::from_value(instance)));
  }
  pub fn singleton_instance_tagged<T: Any + Send + Sync>(&self, tag: impl Into<Tag>, instance: T) {
    self.insert(
      InjectionKey::tagged::<T>(tag),
      Provider::ready(Instance::from_value(instance)),
    );
  }
  pub fn singleton_trait_instance<I: ?Sized + Any + Send + Sync>(&self, instance: Arc<I>) {
    self.insert(InjectionKey::new::<I>(), Provider::ready(Instance::new(instance)));
  }
  pub fn singleton_trait_instance_tagged<I: ?Sized + Any + Send + Sync>(
    &self,
    tag: impl Into<Tag>,
    instance: Arc<I>,
  ) {
    self.insert(InjectionKey::tagged::<I>(tag), Provider::ready(Instance::new(instance)));
  }

  /// Registers a ready instance under the tag the value itself reports.
  pub fn singleton_has_tag<T: HasTag + Any + Send + Sync>(&self, instance: T) {
    let tag = instance.tag();
    self.singleton_instance_tagged(tag, instance);
  }

  /// Installs a factory for an arbitrary key, replacing any existing binding
  /// and cached singleton.
  fn register_key(&self, key: InjectionKey, factory: Factory, singleton: bool) {
    let provider = if singleton {
      Provider::Singleton {
        cell: OnceCell::new(),
        factory: Some(factory),
      }
    } else {
      Provider::Transient { factory }
    };
    self.insert(key, provider);
  }

  // --- Removal ---
  pub fn unregister<T: ?Sized + Any>(&self) {
    self.unregister_key(&InjectionKey::new::<T>(), false);
  }
  pub fn unregister_tagged<T: ?Sized + Any>(&self, tag: impl Into<Tag>) {
    self.unregister_key(&InjectionKey::tagged::<T>(tag), false);
  }
  /// Removes every binding of `T`, tagged or not.
  pub fn unregister_all<T: ?Sized + Any>(&self) {
    self.unregister_key(&InjectionKey::new::<T>(), true);
  }

  /// Removes the binding (and any cached singleton) for `key`. With
  /// `match_all_tags`, every binding of the same type goes, whatever its tag.
  pub fn unregister_key(&self, key: &InjectionKey, match_all_tags: bool) {
    debug!(key = %key, match_all_tags, "unregistering binding");
    if match_all_tags {
      self.inner.providers.retain(|existing, _| !existing.same_type(key));
      self.inner.singleton_slots.retain(|existing, _| !existing.same_type(key));
    } else {
      self.inner.providers.remove(key);
      self.inner.singleton_slots.remove(key);
    }
  }

  // --- Lookup ---
  pub fn has<T: ?Sized + Any>(&self) -> bool {
    self.has_key(&InjectionKey::new::<T>())
  }
  pub fn has_tagged<T: ?Sized + Any>(&self, tag: impl Into<Tag>) -> bool {
    self.has_key(&InjectionKey::tagged::<T>(tag))
  }
  /// True iff a binding or cached singleton exists for exactly `key`.
  pub fn has_key(&self, key: &InjectionKey) -> bool {
    self.inner.providers.contains_key(key)
  }

  // --- Initializers ---
  pub fn add_initializer(&self, initializer: impl Initializer) -> &Self {
    self.add_initializer_arc(Arc::new(initializer))
  }

  pub fn add_initializer_arc(&self, initializer: Arc<dyn Initializer>) -> &Self {
    debug!(initializer = initializer.name(), "adding initializer");
    self.inner.initializers.write().push(initializer);
    self
  }

  /// Replaces all initializers.
  pub fn set_initializers(&self, initializers: Vec<Arc<dyn Initializer>>) -> &Self {
    *self.inner.initializers.write() = initializers;
    self
  }

  /// Names of the registered initializers, in probing order.
  pub fn initializers(&self) -> Vec<String> {
    self
      .inner
      .initializers
      .read()
      .iter()
      .map(|initializer| initializer.name().to_owned())
      .collect()
  }

  // --- Lazy handles ---
  /// A handle that autowires `T` on first access.
  #[track_caller]
  pub fn lazy<T: Autowire>(&self) -> Lazy<T> {
    self.lazy_key(InjectionKey::new::<T>(), Some(ClassRef::of::<T>()))
  }
  #[track_caller]
  pub fn lazy_tagged<T: Autowire>(&self, tag: impl Into<Tag>) -> Lazy<T> {
    self.lazy_key(InjectionKey::tagged::<T>(tag), Some(ClassRef::of::<T>()))
  }
  /// A handle that resolves a binding-only type on first access.
  #[track_caller]
  pub fn lazy_trait<I: ?Sized + Any + Send + Sync>(&self) -> Lazy<I> {
    self.lazy_key(InjectionKey::new::<I>(), None)
  }

  #[track_caller]
  fn lazy_key<T: ?Sized + Any + Send + Sync>(&self, key: InjectionKey, class: Option<ClassRef>) -> Lazy<T> {
    Lazy::from_inner(Arc::new(LazyInstance::new(self, key, class, Location::caller())))
  }
}
