//! Core, non-public data structures for the container: bindings and the
//! resolution stack.

use crate::container::Container;
use crate::error::{ChainLink, ContainerError, DependencyChain, Result};
use crate::instance::{Args, Instance};
use crate::key::InjectionKey;
use std::cell::RefCell;
use std::panic::Location;

thread_local! {
  // Every in-flight resolution on this thread, outermost first. Entries carry
  // the id of the container that pushed them so that nested containers do not
  // see each other's frames.
  static RESOLVING_STACK: RefCell<Vec<StackEntry>> = const { RefCell::new(Vec::new()) };
}

struct StackEntry {
  container: usize,
  frame: Frame,
}

/// What a frame is resolving.
#[derive(Clone)]
pub(crate) enum Subject {
  Key(InjectionKey),
  Callable(String),
}

/// How a frame's key is being produced.
#[derive(Clone)]
pub(crate) enum Strategy {
  Pending,
  Factory,
  Initializer(String),
  Autowire,
  Invoke,
}

/// One in-flight resolution.
#[derive(Clone)]
pub(crate) struct Frame {
  subject: Subject,
  strategy: Strategy,
  /// The rendered parameter (`name: Type`) currently being resolved, if any.
  parameter: Option<String>,
  location: &'static Location<'static>,
}

impl Frame {
  fn describe(&self) -> String {
    let owner = match &self.subject {
      Subject::Key(key) => key.ty().short_name().to_owned(),
      Subject::Callable(name) => name.clone(),
    };
    match (&self.strategy, &self.parameter) {
      (Strategy::Autowire, Some(parameter)) => format!("{}::new({})", owner, parameter),
      (Strategy::Invoke, Some(parameter)) => format!("{}({})", owner, parameter),
      (Strategy::Invoke, None) => format!("{}()", owner),
      (Strategy::Initializer(name), _) => format!("{}::initialize() -> {}", name, owner),
      (Strategy::Factory, _) => format!("{} (factory)", owner),
      _ => match &self.subject {
        Subject::Key(key) => key.to_string(),
        Subject::Callable(name) => name.clone(),
      },
    }
  }

  fn is(&self, key: &InjectionKey) -> bool {
    matches!(&self.subject, Subject::Key(own) if own == key)
  }
}

/// An RAII guard that records a resolution on the thread-local stack.
///
/// Entering fails if the key is already being resolved by the same container,
/// which is how circular dependencies are detected. Dropping the guard pops
/// its frame, on success and on error alike.
pub(crate) struct ResolutionGuard {
  container: usize,
  depth: usize,
}

impl ResolutionGuard {
  pub(crate) fn enter(
    container: &Container,
    subject: Subject,
    location: &'static Location<'static>,
  ) -> Result<Self> {
    let id = container.id();
    let max_depth = container.config().max_depth;
    RESOLVING_STACK.with(|stack| {
      let mut stack = stack.borrow_mut();

      if let Subject::Key(key) = &subject {
        let cycle = stack
          .iter()
          .any(|entry| entry.container == id && entry.frame.is(key));
        if cycle {
          return Err(ContainerError::CircularDependencyEncountered {
            key: key.clone(),
            chain: capture(&stack, id, Some(key.to_string()), None),
          });
        }
      }

      let depth = stack.iter().filter(|entry| entry.container == id).count();
      if depth >= max_depth {
        let target = match &subject {
          Subject::Key(key) => key.to_string(),
          Subject::Callable(name) => name.clone(),
        };
        return Err(ContainerError::DependencyCouldNotBeInstantiated {
          reason: format!("the maximum resolution depth of {} was exceeded", max_depth),
          chain: capture(&stack, id, Some(target.clone()), None),
          target,
        });
      }

      stack.push(StackEntry {
        container: id,
        frame: Frame {
          subject,
          strategy: Strategy::Pending,
          parameter: None,
          location,
        },
      });
      Ok(Self {
        container: id,
        depth: stack.len(),
      })
    })
  }

  fn with_frame(&self, f: impl FnOnce(&mut Frame)) {
    RESOLVING_STACK.with(|stack| {
      if let Some(entry) = stack.borrow_mut().get_mut(self.depth - 1) {
        f(&mut entry.frame);
      }
    });
  }

  pub(crate) fn set_strategy(&self, strategy: Strategy) {
    self.with_frame(|frame| frame.strategy = strategy);
  }

  pub(crate) fn set_parameter(&self, parameter: String) {
    self.with_frame(|frame| frame.parameter = Some(parameter));
  }

  pub(crate) fn clear_parameter(&self) {
    self.with_frame(|frame| frame.parameter = None);
  }

  /// Snapshot of this container's frames, ending in `target`.
  pub(crate) fn chain(&self, target: impl Into<String>) -> DependencyChain {
    let target = target.into();
    RESOLVING_STACK.with(|stack| capture(&stack.borrow(), self.container, Some(target), None))
  }
}

impl Drop for ResolutionGuard {
  fn drop(&mut self) {
    RESOLVING_STACK.with(|stack| {
      stack.borrow_mut().truncate(self.depth - 1);
    });
  }
}

/// Snapshot of the active chain for `container`, for errors raised outside a guard.
pub(crate) fn current_chain(
  container: usize,
  target: impl Into<String>,
  location: Option<&'static Location<'static>>,
) -> DependencyChain {
  let target = target.into();
  RESOLVING_STACK.with(|stack| capture(&stack.borrow(), container, Some(target), location))
}

fn capture(
  stack: &[StackEntry],
  container: usize,
  target: Option<String>,
  fallback_location: Option<&'static Location<'static>>,
) -> DependencyChain {
  let mut frames: Vec<&Frame> = stack
    .iter()
    .filter(|entry| entry.container == container)
    .map(|entry| &entry.frame)
    .collect();

  let location = frames
    .first()
    .map(|frame| frame.location)
    .or(fallback_location);

  // The innermost frame is the target itself unless it is mid-way through
  // one of its own parameters.
  if let Some(last) = frames.last() {
    let rendered_as_target = match (&last.subject, &target) {
      (Subject::Key(key), Some(target)) => key.to_string() == *target,
      _ => false,
    };
    if rendered_as_target && last.parameter.is_none() && matches!(last.strategy, Strategy::Pending | Strategy::Autowire) {
      frames.pop();
    }
  }

  DependencyChain {
    links: frames
      .into_iter()
      .map(|frame| ChainLink {
        key: match &frame.subject {
          Subject::Key(key) => Some(key.clone()),
          Subject::Callable(_) => None,
        },
        detail: frame.describe(),
      })
      .collect(),
    target,
    location,
  }
}

pub(crate) type Factory = Box<dyn Fn(&Container, &Args) -> Result<Instance> + Send + Sync>;

pub(crate) enum Provider {
  Singleton {
    cell: once_cell::sync::OnceCell<Instance>,
    factory: Option<Factory>,
  },
  Transient {
    factory: Factory,
  },
}

impl Provider {
  pub(crate) fn ready(instance: Instance) -> Self {
    Provider::Singleton {
      cell: once_cell::sync::OnceCell::with_value(instance),
      factory: None,
    }
  }

  pub(crate) fn is_singleton(&self) -> bool {
    matches!(self, Provider::Singleton { .. })
  }

  /// Produces the bound instance, running the factory at most once for singletons.
  pub(crate) fn provide(
    &self,
    container: &Container,
    key: &InjectionKey,
    args: &Args,
  ) -> Result<Instance> {
    match self {
      Provider::Singleton { cell, factory } => cell
        .get_or_try_init(|| match factory {
          Some(factory) => factory(container, args),
          None => Err(ContainerError::DependencyCouldNotBeInstantiated {
            target: key.to_string(),
            reason: "the singleton binding has neither an instance nor a factory".to_string(),
            chain: current_chain(container.id(), key.to_string(), None),
          }),
        })
        .cloned(),
      Provider::Transient { factory } => factory(container, args),
    }
  }
}
