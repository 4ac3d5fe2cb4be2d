use fibre_autowire::{resolve, Autowire, Blueprint, Container, Param};
use std::panic;

// A service whose dependency can never be resolved.
struct Mailer {
  host: String,
}

impl Autowire for Mailer {
  fn blueprint() -> Blueprint<Self> {
    Blueprint::new(|args| Ok(Mailer { host: args.value("host")? })).param(Param::string("host"))
  }
}

struct Newsletter {
  mailer: std::sync::Arc<Mailer>,
}

impl Autowire for Newsletter {
  fn blueprint() -> Blueprint<Self> {
    Blueprint::new(|args| Ok(Newsletter { mailer: args.get("mailer")? })).param(Param::of::<Mailer>("mailer"))
  }
}

fn main() {
  Container::set_instance(Container::new());

  // --- Using the panicking `resolve!` macro ---
  println!("Attempting to resolve a service with a missing dependency...");

  let result = panic::catch_unwind(|| {
    // This line will panic!
    let _service = resolve!(Newsletter);
  });

  assert!(result.is_err(), "resolve! should have panicked.");
  println!("Successfully caught the expected panic from resolve!.");

  // --- Using the non-panicking `get()` method ---
  println!("\nNow, attempting to resolve using the fallible `get()` method...");

  let container = Container::instance().expect("instance was set");
  match container.get::<Newsletter>() {
    Ok(newsletter) => panic!("Should not have built a mailer for {}", newsletter.mailer.host),
    Err(err) => println!("Correctly received an error:\n{}", err),
  }
}
