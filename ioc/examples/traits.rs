use fibre_autowire::{Autowire, Blueprint, Container, Param};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

// 1. Define the abstraction (the trait)
trait Logger: Send + Sync {
  fn log(&self, message: &str);
}

// 2. Define a concrete implementation
struct ConsoleLogger;
impl Logger for ConsoleLogger {
  fn log(&self, message: &str) {
    println!("[CONSOLE LOG]: {}", message);
  }
}

// 3. Define a service that depends on the abstraction
struct ReportService {
  logger: Arc<dyn Logger>,
}

impl ReportService {
  fn generate_report(&self) {
    self.logger.log("Starting report generation.");
    self.logger.log("Finished report generation.");
  }
}

// 4. Describe its constructor so the container can autowire it.
impl Autowire for ReportService {
  fn blueprint() -> Blueprint<Self> {
    Blueprint::new(|args| {
      Ok(ReportService {
        logger: args.get::<dyn Logger>("logger")?,
      })
    })
    .param(Param::interface::<dyn Logger>("logger"))
  }
}

fn main() {
  // RUST_LOG=fibre_autowire=trace shows every resolution step.
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::from_default_env())
    .init();

  let container = Container::new();

  // Only the trait needs a binding; ReportService is autowired.
  container.singleton_trait::<dyn Logger>(|_, _| Ok(Arc::new(ConsoleLogger)));

  println!("Resolving the high-level service...");
  let report_service = container.get::<ReportService>().expect("ReportService should autowire");

  println!("Using the service...");
  report_service.generate_report();
}
