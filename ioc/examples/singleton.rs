use fibre_autowire::{Autowire, Blueprint, Container};
use std::sync::{
  atomic::{AtomicUsize, Ordering},
  Arc,
};

// A simple service that gets a unique ID upon creation.
struct RequestTracker {
  id: usize,
}

// A global, thread-safe counter to generate unique IDs.
static ID_COUNTER: AtomicUsize = AtomicUsize::new(0);

// A type that declares itself a singleton: the first autowired instance is kept.
struct AppClock {
  started: usize,
}

impl Autowire for AppClock {
  fn blueprint() -> Blueprint<Self> {
    Blueprint::new(|_| {
      println!("Autowiring SINGLETON AppClock...");
      Ok(AppClock {
        started: ID_COUNTER.fetch_add(1, Ordering::SeqCst),
      })
    })
    .singleton()
  }
}

fn main() {
  let container = Container::new();

  // --- Singleton Registration ---
  // This factory will only be called ONCE.
  container.singleton_tagged("singleton_tracker", |_, _| {
    println!("Creating SINGLETON RequestTracker...");
    Ok(RequestTracker {
      id: ID_COUNTER.fetch_add(1, Ordering::SeqCst),
    })
  });

  // --- Transient Registration ---
  // This factory will be called EVERY time the service is resolved.
  container.register_tagged("transient_tracker", |_, _| {
    println!("Creating TRANSIENT RequestTracker...");
    Ok(RequestTracker {
      id: ID_COUNTER.fetch_add(1, Ordering::SeqCst),
    })
  });

  println!("--- Resolving Singletons ---");
  let s1 = container.get_trait_tagged::<RequestTracker>("singleton_tracker").unwrap();
  let s2 = container.get_trait_tagged::<RequestTracker>("singleton_tracker").unwrap();
  println!("Singleton 1 ID: {}, Singleton 2 ID: {}", s1.id, s2.id);
  assert_eq!(s1.id, 0);
  assert!(Arc::ptr_eq(&s1, &s2), "Singleton instances should be identical");

  println!("--- Resolving Transients ---");
  let t1 = container.get_trait_tagged::<RequestTracker>("transient_tracker").unwrap();
  let t2 = container.get_trait_tagged::<RequestTracker>("transient_tracker").unwrap();
  println!("Transient 1 ID: {}, Transient 2 ID: {}", t1.id, t2.id);
  assert_eq!(t1.id, 1);
  assert_eq!(t2.id, 2);
  assert!(!Arc::ptr_eq(&t1, &t2), "Transient instances should be different");

  println!("--- Autowired singleton ---");
  let c1 = container.get::<AppClock>().unwrap();
  let c2 = container.get::<AppClock>().unwrap();
  assert_eq!(c1.started, 3);
  assert!(Arc::ptr_eq(&c1, &c2));
  println!("AppClock was autowired once, as expected.");
}
