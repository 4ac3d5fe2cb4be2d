//! Resolution keys: a type identity plus an optional discriminating tag.

use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};

/// The identity of a Rust type as seen by the container.
///
/// Two keys are equal iff their `TypeId`s are equal; the name is kept only
/// for diagnostics.
#[derive(Clone, Copy)]
pub struct TypeKey {
  id: TypeId,
  name: &'static str,
}

impl TypeKey {
  pub fn of<T: ?Sized + Any>() -> Self {
    Self {
      id: TypeId::of::<T>(),
      name: std::any::type_name::<T>(),
    }
  }

  pub fn id(&self) -> TypeId {
    self.id
  }

  /// The full path of the type, e.g. `my_app::services::Mailer`.
  pub fn name(&self) -> &'static str {
    self.name
  }

  /// The last path segment of the type, with generic arguments kept intact.
  /// Trait objects lose their `dyn` prefix and auto-trait bounds.
  pub fn short_name(&self) -> &'static str {
    let name = self.name.strip_prefix("dyn ").unwrap_or(self.name);
    let name = &name[..name.find(" + ").unwrap_or(name.len())];
    let head_end = name.find('<').unwrap_or(name.len());
    match name[..head_end].rfind("::") {
      Some(idx) => &name[idx + 2..],
      None => name,
    }
  }
}

impl PartialEq for TypeKey {
  fn eq(&self, other: &Self) -> bool {
    self.id == other.id
  }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
  fn hash<H: Hasher>(&self, state: &mut H) {
    self.id.hash(state);
  }
}

impl fmt::Debug for TypeKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "TypeKey({})", self.name)
  }
}

impl fmt::Display for TypeKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name)
  }
}

/// A discriminator that lets several bindings share one type.
///
/// An empty name is a tag like any other: `Tag::Name("")` is not the same
/// as "no tag".
#[derive(Clone, PartialEq, Eq, Hash)]
pub enum Tag {
  Name(String),
  Int(i64),
  /// An enum-like discriminator: the enum's type plus the variant's `Debug` name.
  Variant { owner: TypeKey, name: String },
}

impl Tag {
  /// Builds a tag from an enum value.
  ///
  /// ```
  /// use fibre_autowire::Tag;
  ///
  /// #[derive(Debug)]
  /// enum Channel { Web, Cli }
  ///
  /// assert_ne!(Tag::variant(Channel::Web), Tag::variant(Channel::Cli));
  /// assert_eq!(Tag::variant(Channel::Web).to_string(), "Channel::Web");
  /// ```
  pub fn variant<E: Any + fmt::Debug>(value: E) -> Self {
    Tag::Variant {
      owner: TypeKey::of::<E>(),
      name: format!("{:?}", value),
    }
  }
}

impl From<&str> for Tag {
  fn from(value: &str) -> Self {
    Tag::Name(value.to_owned())
  }
}

impl From<String> for Tag {
  fn from(value: String) -> Self {
    Tag::Name(value)
  }
}

impl From<&String> for Tag {
  fn from(value: &String) -> Self {
    Tag::Name(value.clone())
  }
}

impl From<i64> for Tag {
  fn from(value: i64) -> Self {
    Tag::Int(value)
  }
}

impl From<&Tag> for Tag {
  fn from(value: &Tag) -> Self {
    value.clone()
  }
}

impl fmt::Debug for Tag {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Tag::Name(name) => write!(f, "Tag({:?})", name),
      Tag::Int(value) => write!(f, "Tag({})", value),
      Tag::Variant { .. } => write!(f, "Tag({})", self),
    }
  }
}

impl fmt::Display for Tag {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Tag::Name(name) => f.write_str(name),
      Tag::Int(value) => write!(f, "{}", value),
      Tag::Variant { owner, name } => write!(f, "{}::{}", owner.short_name(), name),
    }
  }
}

/// The key every binding, initializer and resolution is looked up by.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct InjectionKey {
  pub(crate) ty: TypeKey,
  pub(crate) tag: Option<Tag>,
}

impl InjectionKey {
  pub fn new<T: ?Sized + Any>() -> Self {
    Self {
      ty: TypeKey::of::<T>(),
      tag: None,
    }
  }

  pub fn tagged<T: ?Sized + Any>(tag: impl Into<Tag>) -> Self {
    Self {
      ty: TypeKey::of::<T>(),
      tag: Some(tag.into()),
    }
  }

  pub fn from_parts(ty: TypeKey, tag: Option<Tag>) -> Self {
    Self { ty, tag }
  }

  pub fn ty(&self) -> TypeKey {
    self.ty
  }

  pub fn tag(&self) -> Option<&Tag> {
    self.tag.as_ref()
  }

  pub fn with_tag(&self, tag: Option<Tag>) -> Self {
    Self { ty: self.ty, tag }
  }

  pub fn untagged(&self) -> Self {
    self.with_tag(None)
  }

  /// True if both keys name the same type, whatever their tags.
  pub fn same_type(&self, other: &InjectionKey) -> bool {
    self.ty == other.ty
  }

  pub fn is<T: ?Sized + Any>(&self) -> bool {
    self.ty.id() == TypeId::of::<T>()
  }
}

impl fmt::Debug for InjectionKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match &self.tag {
      Some(tag) => write!(f, "Key({}, {:?})", self.ty.name(), tag),
      None => write!(f, "Key({})", self.ty.name()),
    }
  }
}

impl fmt::Display for InjectionKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match &self.tag {
      Some(tag) => write!(f, "{}#{}", self.ty, tag),
      None => write!(f, "{}", self.ty),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  mod services {
    pub struct Mailer;
    pub trait Transport {}
  }

  #[test]
  fn short_names_drop_the_module_path() {
    assert_eq!(TypeKey::of::<services::Mailer>().short_name(), "Mailer");
    assert_eq!(TypeKey::of::<dyn services::Transport>().short_name(), "Transport");
    assert_eq!(
      TypeKey::of::<dyn services::Transport + Send + Sync>().short_name(),
      "Transport"
    );
    assert_eq!(TypeKey::of::<Vec<String>>().short_name(), "Vec<alloc::string::String>");
    assert_eq!(TypeKey::of::<String>().short_name(), "String");
    assert_eq!(TypeKey::of::<bool>().short_name(), "bool");
  }

  #[test]
  fn empty_tag_differs_from_no_tag() {
    let untagged = InjectionKey::new::<String>();
    let empty = InjectionKey::tagged::<String>("");
    assert_ne!(untagged, empty);
    assert!(untagged.same_type(&empty));
    assert_eq!(empty.untagged(), untagged);
  }

  #[test]
  fn variant_tags_compare_by_enum_and_name() {
    #[derive(Debug)]
    enum A {
      Foo,
    }
    #[derive(Debug)]
    enum B {
      Foo,
    }
    assert_eq!(Tag::variant(A::Foo), Tag::variant(A::Foo));
    assert_ne!(Tag::variant(A::Foo), Tag::variant(B::Foo));
    assert_ne!(Tag::variant(A::Foo), Tag::from("Foo"));
  }
}
