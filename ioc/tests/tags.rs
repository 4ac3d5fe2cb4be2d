mod common;

use common::*;
use fibre_autowire::{Container, ContainerError, Tag};
use pretty_assertions::assert_eq;

#[test]
fn test_tagged_singleton() {
  let container = Container::new();
  container.singleton_instance_tagged("web", TaggedDependency { name: "web".into() });
  container.singleton_instance_tagged("cli", TaggedDependency { name: "cli".into() });

  assert_eq!(container.get_tagged::<TaggedDependency>("web").unwrap().name, "web");
  assert_eq!(container.get_tagged::<TaggedDependency>("cli").unwrap().name, "cli");
}

#[test]
fn test_tagged_singleton_with_enum() {
  let container = Container::new();
  container.singleton_instance_tagged(Tag::variant(EnumTag::Foo), TaggedDependency { name: "web".into() });
  container.singleton_instance_tagged(Tag::variant(EnumTag::Bar), TaggedDependency { name: "cli".into() });

  let foo = container.get_tagged::<TaggedDependency>(Tag::variant(EnumTag::Foo)).unwrap();
  let bar = container.get_tagged::<TaggedDependency>(Tag::variant(EnumTag::Bar)).unwrap();

  assert_eq!(foo.name, "web");
  assert_eq!(bar.name, "cli");
}

#[test]
fn test_empty_tag_is_distinct_from_no_tag() {
  let container = Container::new();
  container.singleton_instance_tagged("", TaggedDependency { name: "empty".into() });

  assert!(container.has_tagged::<TaggedDependency>(""));
  assert!(!container.has::<TaggedDependency>());
}

#[test]
fn test_tagged_singleton_with_initializer() {
  let container = Container::new();
  container
    .add_initializer(tagged_initializer("web"))
    .add_initializer(tagged_initializer("cli"));

  assert_eq!(container.get_tagged::<TaggedDependency>("web").unwrap().name, "web");
  assert_eq!(container.get_tagged::<TaggedDependency>("cli").unwrap().name, "cli");
}

#[test]
fn test_tagged_singleton_exception() {
  let container = Container::new();

  let err = container.get_tagged::<TaggedDependency>("web").err().unwrap();

  assert!(matches!(err, ContainerError::TaggedDependencyCouldNotBeResolved { .. }));
}

#[test]
fn test_autowired_tagged_dependency() {
  let container = Container::new();
  container.add_initializer(tagged_initializer("web"));

  let dependency = container.get::<DependencyWithTaggedDependency>().unwrap();

  assert_eq!(dependency.dependency.name, "web");
}

#[test]
fn test_autowired_tagged_dependency_exception() {
  let container = Container::new();

  let err = container.get::<DependencyWithTaggedDependency>().err().unwrap();

  assert!(matches!(err, ContainerError::TaggedDependencyCouldNotBeResolved { .. }));
  let expected = format!(
    "\t┌── DependencyWithTaggedDependency::new(dependency: TaggedDependency)\n\t└── {}#web\n",
    std::any::type_name::<TaggedDependency>()
  );
  assert!(err.to_string().contains(&expected), "unexpected message: {}", err);
}

#[test]
fn test_has_tags_support() {
  let container = Container::new();
  container.singleton_has_tag(HasTagObject {
    name: "A".into(),
    tag: "tagA".into(),
  });
  container.singleton_has_tag(HasTagObject {
    name: "B".into(),
    tag: "tagB".into(),
  });

  assert_eq!(container.get_tagged::<HasTagObject>("tagA").unwrap().name, "A");
  assert_eq!(container.get_tagged::<HasTagObject>("tagB").unwrap().name, "B");
}

#[test]
fn test_unregister_tagged() {
  let container = Container::new();
  container.singleton_instance_tagged("web", TaggedDependency { name: "web".into() });
  container.singleton_instance_tagged("cli", TaggedDependency { name: "cli".into() });
  assert!(container.get_tagged::<TaggedDependency>("web").is_ok());

  container.unregister_all::<TaggedDependency>();

  for tag in ["web", "cli"] {
    let err = container.get_tagged::<TaggedDependency>(tag).err().unwrap();
    assert!(matches!(err, ContainerError::TaggedDependencyCouldNotBeResolved { .. }));
  }
}

#[test]
fn test_unregister_single_tag_keeps_the_others() {
  let container = Container::new();
  container.singleton_instance_tagged("web", TaggedDependency { name: "web".into() });
  container.singleton_instance_tagged("cli", TaggedDependency { name: "cli".into() });

  container.unregister_tagged::<TaggedDependency>("web");

  assert!(!container.has_tagged::<TaggedDependency>("web"));
  assert!(container.has_tagged::<TaggedDependency>("cli"));
}

#[test]
fn test_has_tagged_singleton() {
  let container = Container::new();
  assert!(!container.has_tagged::<TaggedDependency>("web"));

  container.singleton_instance_tagged("web", TaggedDependency { name: "web".into() });

  assert!(container.has_tagged::<TaggedDependency>("web"));
}
