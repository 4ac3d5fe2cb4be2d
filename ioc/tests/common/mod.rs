// Shared fixtures. Not every test binary uses every fixture.
#![allow(dead_code)]

use fibre_autowire::{
  Array, Arguments, Autowire, Blueprint, Container, FnInitializer, HasTag, Initializer, InjectionKey, Instance,
  Invokable, Lazy, Param, Result, Signature, Tag, TypeSpec,
};
use once_cell::sync::OnceCell;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

// --- Plain autowiring ---

pub struct ObjectA;
impl Autowire for ObjectA {
  fn blueprint() -> Blueprint<Self> {
    Blueprint::new(|_| Ok(ObjectA))
  }
}

pub struct ObjectB {
  pub a: Arc<ObjectA>,
}
impl Autowire for ObjectB {
  fn blueprint() -> Blueprint<Self> {
    Blueprint::new(|args| Ok(ObjectB { a: args.get("a")? })).param(Param::of::<ObjectA>("a"))
  }
}

pub struct ObjectC {
  pub prop: String,
}
impl Autowire for ObjectC {
  fn blueprint() -> Blueprint<Self> {
    Blueprint::new(|args| Ok(ObjectC { prop: args.value("prop")? })).param(Param::string("prop"))
  }
}

pub struct ObjectD {
  pub prop: String,
}
impl Autowire for ObjectD {
  fn blueprint() -> Blueprint<Self> {
    Blueprint::new(|args| Ok(ObjectD { prop: args.value("prop")? })).param(Param::string("prop"))
  }
}

pub struct ObjectDInitializer;
impl Initializer for ObjectDInitializer {
  fn declares(&self, key: &InjectionKey) -> bool {
    *key == InjectionKey::new::<ObjectD>()
  }

  fn initialize(&self, _: &Container, _: &InjectionKey) -> Result<Instance> {
    Ok(Instance::from_value(ObjectD {
      prop: "test".to_string(),
    }))
  }
}

#[derive(Clone)]
pub struct ObjectE {
  pub id: String,
}
impl Autowire for ObjectE {
  fn blueprint() -> Blueprint<Self> {
    Blueprint::new(|args| Ok(ObjectE { id: args.value("id")? })).param(Param::string("id"))
  }
}

/// Declares `ObjectE` and ignores any arguments it was asked with.
pub struct ObjectEInitializer;
impl Initializer for ObjectEInitializer {
  fn declares(&self, key: &InjectionKey) -> bool {
    *key == InjectionKey::new::<ObjectE>()
  }

  fn initialize(&self, _: &Container, _: &InjectionKey) -> Result<Instance> {
    Ok(Instance::from_value(ObjectE {
      id: "default".to_string(),
    }))
  }
}

pub fn singleton_e_initializer() -> FnInitializer {
  FnInitializer::for_type(|_| {
    Ok(ObjectE {
      id: "singleton".to_string(),
    })
  })
  .named("SingletonInitializer")
  .singleton()
}

pub struct SingletonClass;
impl Autowire for SingletonClass {
  fn blueprint() -> Blueprint<Self> {
    Blueprint::new(|_| Ok(SingletonClass))
  }
}

pub struct ClassWithSingletonAttribute {
  pub flag: AtomicBool,
}
impl Autowire for ClassWithSingletonAttribute {
  fn blueprint() -> Blueprint<Self> {
    Blueprint::new(|_| {
      Ok(ClassWithSingletonAttribute {
        flag: AtomicBool::new(false),
      })
    })
    .singleton()
  }
}

// --- Builtins ---

pub struct BuiltinArrayClass {
  pub an_array: Array,
}
impl Autowire for BuiltinArrayClass {
  fn blueprint() -> Blueprint<Self> {
    Blueprint::new(|args| {
      Ok(BuiltinArrayClass {
        an_array: args.value("an_array")?,
      })
    })
    .param(Param::array("an_array"))
  }
}

pub struct BuiltinTypesWithDefaultsClass {
  pub a_string: String,
  pub an_int: i64,
}
impl Autowire for BuiltinTypesWithDefaultsClass {
  fn blueprint() -> Blueprint<Self> {
    Blueprint::new(|args| {
      Ok(BuiltinTypesWithDefaultsClass {
        a_string: args.value("a_string")?,
        an_int: args.value("an_int")?,
      })
    })
    .param(Param::string("a_string").with_default(String::from("This is a default value")))
    .param(Param::int("an_int").with_default(42_i64))
  }
}

pub struct OptionalTypesClass {
  pub a_string: Option<Arc<String>>,
}
impl Autowire for OptionalTypesClass {
  fn blueprint() -> Blueprint<Self> {
    Blueprint::new(|args| {
      Ok(OptionalTypesClass {
        a_string: args.optional("a_string")?,
      })
    })
    .param(Param::string("a_string").nullable())
  }
}

pub struct DependencyWithBuiltinDependencies {
  pub string_value: String,
  pub array_value: Array,
  pub bool_value: bool,
}
impl Autowire for DependencyWithBuiltinDependencies {
  fn blueprint() -> Blueprint<Self> {
    Blueprint::new(|args| {
      Ok(DependencyWithBuiltinDependencies {
        string_value: args.value("string_value")?,
        array_value: args.value("array_value")?,
        bool_value: args.value("bool_value")?,
      })
    })
    .param(Param::string("string_value").tag("builtin-dependency-string"))
    .param(Param::array("array_value").tag("builtin-dependency-array"))
    .param(Param::bool("bool_value").tag("builtin-dependency-bool"))
  }
}

// --- Traits, unions and intersections ---

pub trait InterfaceA: Send + Sync {
  fn name(&self) -> &'static str;
}

pub struct ImplementsInterfaceA;
impl InterfaceA for ImplementsInterfaceA {
  fn name(&self) -> &'static str {
    "implementation"
  }
}

pub trait UnionInterfaceA: Send + Sync {
  fn a(&self) -> &str;
}

pub trait UnionInterfaceB: Send + Sync {
  fn b(&self) -> &str;
}

pub struct UnionImplementation {
  pub origin: &'static str,
}
impl UnionInterfaceA for UnionImplementation {
  fn a(&self) -> &str {
    self.origin
  }
}
impl UnionInterfaceB for UnionImplementation {
  fn b(&self) -> &str {
    self.origin
  }
}

fn union_instance(key: &InjectionKey, origin: &'static str) -> Instance {
  let implementation = Arc::new(UnionImplementation { origin });
  if key.is::<dyn UnionInterfaceA>() {
    Instance::new::<dyn UnionInterfaceA>(implementation)
  } else {
    Instance::new::<dyn UnionInterfaceB>(implementation)
  }
}

/// Produces either interface from one implementation.
pub struct UnionInitializer;
impl Initializer for UnionInitializer {
  fn declares(&self, key: &InjectionKey) -> bool {
    key.tag().is_none() && (key.is::<dyn UnionInterfaceA>() || key.is::<dyn UnionInterfaceB>())
  }

  fn initialize(&self, _: &Container, key: &InjectionKey) -> Result<Instance> {
    Ok(union_instance(key, "union"))
  }
}

/// Only declares the first interface.
pub struct PartialInitializer;
impl Initializer for PartialInitializer {
  fn declares(&self, key: &InjectionKey) -> bool {
    *key == InjectionKey::new::<dyn UnionInterfaceA>()
  }

  fn initialize(&self, _: &Container, key: &InjectionKey) -> Result<Instance> {
    Ok(union_instance(key, "partial"))
  }
}

/// Declares both interfaces, for intersection parameters.
pub struct IntersectionInitializer;
impl Initializer for IntersectionInitializer {
  fn declares(&self, key: &InjectionKey) -> bool {
    key.tag().is_none() && (key.is::<dyn UnionInterfaceA>() || key.is::<dyn UnionInterfaceB>())
  }

  fn initialize(&self, _: &Container, key: &InjectionKey) -> Result<Instance> {
    Ok(union_instance(key, "intersection"))
  }

  fn name(&self) -> &str {
    "IntersectionInitializer"
  }
}

pub struct IntersectionConsumer {
  pub dependency: Arc<dyn UnionInterfaceA>,
}
impl Autowire for IntersectionConsumer {
  fn blueprint() -> Blueprint<Self> {
    Blueprint::new(|args| {
      Ok(IntersectionConsumer {
        dependency: args.get::<dyn UnionInterfaceA>("dependency")?,
      })
    })
    .param(Param::intersection(
      "dependency",
      vec![
        TypeSpec::interface::<dyn UnionInterfaceA>(),
        TypeSpec::interface::<dyn UnionInterfaceB>(),
      ],
    ))
  }
}

pub struct UnionTypesClass {
  pub input: Instance,
}
impl Autowire for UnionTypesClass {
  fn blueprint() -> Blueprint<Self> {
    Blueprint::new(|args| Ok(UnionTypesClass { input: args.instance("input")? })).param(Param::union(
      "input",
      vec![TypeSpec::interface::<dyn InterfaceA>(), TypeSpec::class::<ObjectA>()],
    ))
  }
}

// --- Circular dependencies ---

pub struct CircularA {
  pub b: Arc<CircularB>,
}
impl Autowire for CircularA {
  fn blueprint() -> Blueprint<Self> {
    Blueprint::new(|args| Ok(CircularA { b: args.get("b")? })).param(Param::of::<CircularB>("b"))
  }
}

pub struct CircularB {
  pub c: Arc<CircularC>,
}
impl Autowire for CircularB {
  fn blueprint() -> Blueprint<Self> {
    Blueprint::new(|args| Ok(CircularB { c: args.get("c")? })).param(Param::of::<CircularC>("c"))
  }
}

pub struct CircularC {
  pub a: Arc<CircularA>,
}
impl Autowire for CircularC {
  fn blueprint() -> Blueprint<Self> {
    Blueprint::new(|args| Ok(CircularC { a: args.get("a")? })).param(Param::of::<CircularA>("a"))
  }
}

/// Like `CircularB`, but with a nullable way out that must not hide the cycle.
pub struct NullableCircular {
  pub back: Option<Arc<NullableCircular>>,
}
impl Autowire for NullableCircular {
  fn blueprint() -> Blueprint<Self> {
    Blueprint::new(|args| Ok(NullableCircular { back: args.optional("back")? }))
      .param(Param::of::<NullableCircular>("back").nullable())
  }
}

pub struct CircularWithInitializerA {
  pub b: Arc<CircularWithInitializerB>,
}
impl Autowire for CircularWithInitializerA {
  fn blueprint() -> Blueprint<Self> {
    Blueprint::new(|args| Ok(CircularWithInitializerA { b: args.get("b")? }))
      .param(Param::of::<CircularWithInitializerB>("b"))
  }
}

pub struct CircularWithInitializerB {
  pub c: Arc<CircularWithInitializerC>,
}
impl Autowire for CircularWithInitializerB {
  fn blueprint() -> Blueprint<Self> {
    Blueprint::new(|args| Ok(CircularWithInitializerB { c: args.get("c")? }))
      .param(Param::of::<CircularWithInitializerC>("c"))
  }
}

pub struct CircularWithInitializerC {
  pub a: Arc<CircularWithInitializerA>,
}
impl Autowire for CircularWithInitializerC {
  fn blueprint() -> Blueprint<Self> {
    Blueprint::new(|args| Ok(CircularWithInitializerC { a: args.get("a")? }))
      .param(Param::of::<CircularWithInitializerA>("a"))
  }
}

pub struct CircularWithInitializerBInitializer;
impl Initializer for CircularWithInitializerBInitializer {
  fn declares(&self, key: &InjectionKey) -> bool {
    *key == InjectionKey::new::<CircularWithInitializerB>()
  }

  fn initialize(&self, container: &Container, _: &InjectionKey) -> Result<Instance> {
    let c = container.get::<CircularWithInitializerC>()?;
    Ok(Instance::from_value(CircularWithInitializerB { c }))
  }
}

// --- Tags ---

#[derive(Debug)]
pub enum EnumTag {
  Foo,
  Bar,
}

pub struct TaggedDependency {
  pub name: String,
}
impl Autowire for TaggedDependency {
  fn blueprint() -> Blueprint<Self> {
    Blueprint::new(|args| Ok(TaggedDependency { name: args.value("name")? })).param(Param::string("name"))
  }
}

pub fn tagged_initializer(tag: &'static str) -> FnInitializer {
  FnInitializer::for_type(move |_| {
    Ok(TaggedDependency {
      name: tag.to_string(),
    })
  })
  .tagged(tag)
}

pub struct DependencyWithTaggedDependency {
  pub dependency: Arc<TaggedDependency>,
}
impl Autowire for DependencyWithTaggedDependency {
  fn blueprint() -> Blueprint<Self> {
    Blueprint::new(|args| {
      Ok(DependencyWithTaggedDependency {
        dependency: args.get("dependency")?,
      })
    })
    .param(Param::of::<TaggedDependency>("dependency").tag("web"))
  }
}

pub struct HasTagObject {
  pub name: String,
  pub tag: String,
}
impl HasTag for HasTagObject {
  fn tag(&self) -> Tag {
    Tag::from(&self.tag)
  }
}
impl Autowire for HasTagObject {
  fn blueprint() -> Blueprint<Self> {
    Blueprint::new(|args| {
      Ok(HasTagObject {
        name: args.value("name")?,
        tag: args.value("tag")?,
      })
    })
    .param(Param::string("name"))
    .param(Param::string("tag"))
  }
}

// --- Property injection and laziness ---

pub struct InjectB;
impl Autowire for InjectB {
  fn blueprint() -> Blueprint<Self> {
    Blueprint::new(|_| Ok(InjectB))
  }
}

pub struct InjectA {
  b: OnceCell<Arc<InjectB>>,
}
impl InjectA {
  pub fn b(&self) -> Option<&Arc<InjectB>> {
    self.b.get()
  }
}
impl Autowire for InjectA {
  fn blueprint() -> Blueprint<Self> {
    Blueprint::new(|_| Ok(InjectA { b: OnceCell::new() })).inject::<InjectB>("b", |a, b| {
      let _ = a.b.set(b);
    })
  }
}

pub struct SlowDependency {
  pub value: String,
}
impl Autowire for SlowDependency {
  fn blueprint() -> Blueprint<Self> {
    Blueprint::new(|args| Ok(SlowDependency { value: args.value("value")? })).param(Param::string("value"))
  }
}

pub struct ClassWithSlowDependency {
  pub dependency: Arc<SlowDependency>,
}
impl Autowire for ClassWithSlowDependency {
  fn blueprint() -> Blueprint<Self> {
    Blueprint::new(|args| {
      Ok(ClassWithSlowDependency {
        dependency: args.get("dependency")?,
      })
    })
    .param(Param::of::<SlowDependency>("dependency"))
  }
}

pub struct ClassWithLazySlowDependency {
  pub dependency: Lazy<SlowDependency>,
}
impl Autowire for ClassWithLazySlowDependency {
  fn blueprint() -> Blueprint<Self> {
    Blueprint::new(|args| {
      Ok(ClassWithLazySlowDependency {
        dependency: args.lazy("dependency")?,
      })
    })
    .param(Param::of::<SlowDependency>("dependency").lazy())
  }
}

pub struct ClassWithLazySlowPropertyDependency {
  pub dependency: OnceCell<Lazy<SlowDependency>>,
}
impl Autowire for ClassWithLazySlowPropertyDependency {
  fn blueprint() -> Blueprint<Self> {
    Blueprint::new(|_| {
      Ok(ClassWithLazySlowPropertyDependency {
        dependency: OnceCell::new(),
      })
    })
    .inject_lazy::<SlowDependency>("dependency", |target, lazy| {
      let _ = target.dependency.set(lazy);
    })
  }
}

// --- Invokables ---

pub struct InvokableClass;
impl Autowire for InvokableClass {
  fn blueprint() -> Blueprint<Self> {
    Blueprint::new(|_| Ok(InvokableClass))
  }
}
impl Invokable for InvokableClass {
  type Output = String;

  fn signature() -> Signature {
    Signature::new("InvokableClass::invoke").param(Param::of::<SingletonClass>("class"))
  }

  fn invoke(&self, args: &Arguments) -> Result<String> {
    args.get::<SingletonClass>("class")?;
    Ok("foo".to_string())
  }
}

pub struct InvokableClassWithParameters;
impl Autowire for InvokableClassWithParameters {
  fn blueprint() -> Blueprint<Self> {
    Blueprint::new(|_| Ok(InvokableClassWithParameters))
  }
}
impl Invokable for InvokableClassWithParameters {
  type Output = String;

  fn signature() -> Signature {
    Signature::new("InvokableClassWithParameters::invoke").param(Param::string("param"))
  }

  fn invoke(&self, args: &Arguments) -> Result<String> {
    args.value("param")
  }
}

pub struct InvokableClassWithDependencies {
  pub dependency: Arc<SingletonClass>,
}
impl Autowire for InvokableClassWithDependencies {
  fn blueprint() -> Blueprint<Self> {
    Blueprint::new(|args| {
      Ok(InvokableClassWithDependencies {
        dependency: args.get("dependency")?,
      })
    })
    .param(Param::of::<SingletonClass>("dependency"))
  }
}
impl Invokable for InvokableClassWithDependencies {
  type Output = String;

  fn signature() -> Signature {
    Signature::new("InvokableClassWithDependencies::invoke").param(Param::string("param"))
  }

  fn invoke(&self, args: &Arguments) -> Result<String> {
    args.value("param")
  }
}

pub struct CallObjectE;
