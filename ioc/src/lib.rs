//! # Fibre Autowire
//!
//! A thread-safe dependency-injection container that builds objects by
//! autowiring their constructors.
//!
//! A request for a type is answered, in order, by an explicit binding, by the
//! first initializer that declares the type, or by resolving every constructor
//! parameter the type describes in its [`Autowire`] blueprint. Circular
//! dependencies are detected and reported with the full chain that led to
//! them.
//!
//! ## Core Concepts
//!
//! - **Container**: bindings, singletons and initializers; a cheap `Clone` handle.
//! - **Blueprint**: a type's constructor and parameter list, declared once per type.
//! - **Initializer**: a pluggable producer for one or more keys.
//! - **Tags**: several instances of one type, told apart by a name, number or enum variant.
//! - **Lazy**: a handle resolved on first access.
//! - **Invoke**: call a function or method with autowired arguments.
//!
//! ## Quick Start
//!
//! ```
//! use fibre_autowire::{Autowire, Blueprint, Container, Param};
//! use std::sync::Arc;
//!
//! trait Mailer: Send + Sync {
//!   fn send(&self, to: &str) -> String;
//! }
//!
//! struct SmtpMailer;
//! impl Mailer for SmtpMailer {
//!   fn send(&self, to: &str) -> String {
//!     format!("mail to {}", to)
//!   }
//! }
//!
//! struct Signup {
//!   mailer: Arc<dyn Mailer>,
//!   greeting: String,
//! }
//!
//! impl Autowire for Signup {
//!   fn blueprint() -> Blueprint<Self> {
//!     Blueprint::new(|args| {
//!       Ok(Signup {
//!         mailer: args.get::<dyn Mailer>("mailer")?,
//!         greeting: args.value("greeting")?,
//!       })
//!     })
//!     .param(Param::interface::<dyn Mailer>("mailer"))
//!     .param(Param::string("greeting").with_default(String::from("Welcome")))
//!   }
//! }
//!
//! let container = Container::new();
//! container.singleton_trait::<dyn Mailer>(|_, _| Ok(Arc::new(SmtpMailer)));
//!
//! let signup = container.get::<Signup>().unwrap();
//! assert_eq!(signup.greeting, "Welcome");
//! assert_eq!(signup.mailer.send("ada"), "mail to ada");
//! ```

mod config;
mod container;
mod core;
mod error;
mod global;
mod initializer;
mod instance;
mod invoke;
mod key;
mod lazy;
mod macros;
mod reflect;
mod resolver;

pub use config::ContainerConfig;
pub use container::{Container, HasTag};
pub use error::{ChainLink, ConfigError, ContainerError, DependencyChain, Result};
pub use global::invoke;
pub use initializer::{FnInitializer, Initializer};
pub use instance::{Args, Instance};
pub use invoke::{Callable, Invokable};
pub use key::{InjectionKey, Tag, TypeKey};
pub use lazy::Lazy;
pub use reflect::{
  reflect, Arguments, Array, Autowire, Blueprint, Builtin, ClassRef, ClassReflector, Param, Signature, TypeSpec,
};

#[doc(hidden)]
pub use macros::__current_container;
