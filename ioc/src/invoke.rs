//! Calling functions, methods and invokable objects with autowired arguments.

use crate::container::Container;
use crate::core::{ResolutionGuard, Strategy, Subject};
use crate::error::{ContainerError, Result};
use crate::instance::{Args, Instance};
use crate::key::InjectionKey;
use crate::reflect::{Arguments, Autowire, ClassRef, Signature};
use std::any::Any;
use std::fmt;
use std::panic::Location;
use std::sync::Arc;
use tracing::debug;

/// An object with a single designated entry point the container can call.
pub trait Invokable: Any + Send + Sync {
  type Output: Any + Send + Sync;

  fn signature() -> Signature
  where
    Self: Sized;

  fn invoke(&self, args: &Arguments) -> Result<Self::Output>;
}

type Body = Box<dyn Fn(&Arguments) -> Result<Instance> + Send + Sync>;
type ClassBody = Box<dyn Fn(&Instance, &Arguments) -> Result<Instance> + Send + Sync>;

enum Target {
  Bound(Body),
  /// The receiver is resolved from the container at call time.
  Class { class: ClassRef, body: ClassBody },
}

enum Kind {
  Reflected { signature: Signature, target: Target },
  /// A bare reference with no parameter metadata; it can never be invoked.
  Named(String),
}

/// Something [`Container::invoke`] can call.
pub struct Callable {
  kind: Kind,
}

impl Callable {
  /// A free function or closure described by `signature`.
  pub fn function<R: Any + Send + Sync>(
    signature: Signature,
    body: impl Fn(&Arguments) -> Result<R> + Send + Sync + 'static,
  ) -> Self {
    Self::reflected(
      signature,
      Target::Bound(Box::new(move |args: &Arguments| body(args).map(Instance::from_value))),
    )
  }

  /// A method bound to an existing receiver.
  pub fn method<T: Any + Send + Sync, R: Any + Send + Sync>(
    receiver: Arc<T>,
    signature: Signature,
    body: impl Fn(&T, &Arguments) -> Result<R> + Send + Sync + 'static,
  ) -> Self {
    Self::reflected(
      signature,
      Target::Bound(Box::new(move |args: &Arguments| body(&*receiver, args).map(Instance::from_value))),
    )
  }

  /// An existing invokable object.
  pub fn object<T: Invokable>(receiver: Arc<T>) -> Self {
    Self::reflected(
      T::signature(),
      Target::Bound(Box::new(move |args: &Arguments| receiver.invoke(args).map(Instance::from_value))),
    )
  }

  /// An invokable type; its instance is resolved from the container first.
  pub fn class<T: Autowire + Invokable>() -> Self {
    Self::reflected(
      T::signature(),
      Target::Class {
        class: ClassRef::of::<T>(),
        body: Box::new(|receiver: &Instance, args: &Arguments| {
          let receiver = receiver.downcast::<T>().ok_or_else(|| ContainerError::InvokedCallableWasInvalid {
            name: std::any::type_name::<T>().to_owned(),
          })?;
          receiver.invoke(args).map(Instance::from_value)
        }),
      },
    )
  }

  /// A reference by name only, such as a builtin function. Invoking it fails.
  pub fn named(name: impl Into<String>) -> Self {
    Self {
      kind: Kind::Named(name.into()),
    }
  }

  fn reflected(signature: Signature, target: Target) -> Self {
    Self {
      kind: Kind::Reflected { signature, target },
    }
  }

  pub fn name(&self) -> &str {
    match &self.kind {
      Kind::Reflected { signature, .. } => signature.name(),
      Kind::Named(name) => name,
    }
  }

  pub fn signature(&self) -> Option<&Signature> {
    match &self.kind {
      Kind::Reflected { signature, .. } => Some(signature),
      Kind::Named(_) => None,
    }
  }
}

impl fmt::Debug for Callable {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match &self.kind {
      Kind::Reflected { signature, .. } => write!(f, "Callable({})", signature),
      Kind::Named(name) => write!(f, "Callable([{}])", name),
    }
  }
}

impl Container {
  /// Calls `callable`, resolving each parameter the way constructor
  /// parameters are autowired.
  ///
  /// A named argument whose type does not fit a class or interface parameter
  /// is handed to the container to build a value of the declared type from.
  #[track_caller]
  pub fn invoke(&self, callable: &Callable, args: &Args) -> Result<Instance> {
    let location = Location::caller();
    let (signature, target) = match &callable.kind {
      Kind::Reflected { signature, target } => (signature, target),
      Kind::Named(name) => {
        return Err(ContainerError::InvokedCallableWasInvalid { name: name.clone() });
      }
    };

    let guard = ResolutionGuard::enter(self, Subject::Callable(signature.name().to_owned()), location)?;
    guard.set_strategy(Strategy::Invoke);
    debug!(callable = signature.name(), "invoking callable");

    let receiver = match target {
      Target::Class { class, .. } => {
        let key = InjectionKey::from_parts(class.key(), None);
        Some(self.resolve(&key, Some(class), &Args::new(), location)?)
      }
      Target::Bound(_) => None,
    };

    let mut positional = args.positional().to_vec();
    let mut arguments = Arguments::new(signature.name(), self);
    for param in signature.params() {
      guard.set_parameter(param.to_string());
      let argument = self.autowire_parameter(signature.name(), param, args, &mut positional, true, location)?;
      arguments.insert(param.name(), argument);
    }
    guard.clear_parameter();

    match (target, receiver) {
      (Target::Bound(body), _) => body(&arguments),
      (Target::Class { body, .. }, Some(receiver)) => body(&receiver, &arguments),
      (Target::Class { class, .. }, None) => Err(ContainerError::InvokedCallableWasInvalid {
        name: class.key().name().to_owned(),
      }),
    }
  }
}
