//! Public macros for ergonomic service resolution.

/// Resolves a service from the current container instance.
///
/// Concrete types are autowired if nothing is registered for them; trait
/// objects must be bound. Use `Container::instance()` and the `get` methods
/// directly for a non-panicking version.
///
/// # Panics
///
/// Panics if no container instance is set or the service cannot be resolved.
///
/// # Examples
///
/// ```
/// use fibre_autowire::{resolve, Container};
/// use std::sync::Arc;
///
/// trait Greeter: Send + Sync { fn greet(&self) -> String; }
/// struct EnglishGreeter;
/// impl Greeter for EnglishGreeter { fn greet(&self) -> String { "Hello!".to_string() } }
///
/// let container = Container::new();
/// container.singleton_trait_instance::<dyn Greeter>(Arc::new(EnglishGreeter));
/// container.singleton_instance_tagged("greeting", String::from("Hi"));
/// Container::set_instance(container);
///
/// let greeter = resolve!(trait Greeter);
/// assert_eq!(greeter.greet(), "Hello!");
/// ```
#[macro_export]
macro_rules! resolve {
  // resolve!(MyService)
  ($type:ty) => {
    $crate::__current_container()
      .get::<$type>()
      .unwrap_or_else(|err| panic!("Failed to resolve required service: {}", err))
  };

  // resolve!(MyService, "tag")
  ($type:ty, $tag:expr) => {
    $crate::__current_container()
      .get_tagged::<$type>($tag)
      .unwrap_or_else(|err| panic!("Failed to resolve required service with tag '{}': {}", $tag, err))
  };

  // resolve!(trait MyTrait)
  (trait $trait_ident:ident) => {
    $crate::__current_container()
      .get_trait::<dyn $trait_ident>()
      .unwrap_or_else(|err| panic!("Failed to resolve required trait service: {}", err))
  };

  // resolve!(trait MyTrait, "tag")
  (trait $trait_ident:ident, $tag:expr) => {
    $crate::__current_container()
      .get_trait_tagged::<dyn $trait_ident>($tag)
      .unwrap_or_else(|err| {
        panic!(
          "Failed to resolve required trait service with tag '{}': {}",
          $tag, err
        )
      })
  };
}

#[doc(hidden)]
pub fn __current_container() -> crate::Container {
  match crate::Container::instance() {
    Some(container) => container,
    None => panic!("resolve! was used before a container instance was set"),
  }
}
