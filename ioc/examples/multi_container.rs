use fibre_autowire::{Autowire, Blueprint, Container, ContainerConfig, Param};

struct Report {
  data: String,
}

impl Autowire for Report {
  fn blueprint() -> Blueprint<Self> {
    Blueprint::new(|args| Ok(Report { data: args.value("data")? })).param(Param::string("data").tag("source"))
  }
}

// A function that configures dependencies and runs some logic.
// By accepting a `&Container`, it can be tested with a controlled environment.
fn process_data(container: &Container) -> String {
  // Register a data source ONLY within the scope of this container.
  container.singleton_instance_tagged("source", "test data".to_string());

  let report = container.get::<Report>().expect("Report should autowire");
  format!("Processed: {}", report.data.to_uppercase())
}

fn main() {
  println!("--- Running with a local container ---");
  let test_container = Container::new();
  let result = process_data(&test_container);

  println!("Result: {}", result);
  assert_eq!(result, "Processed: TEST DATA");

  // --- Verify Isolation ---
  let other = Container::new();
  assert!(
    other.get::<Report>().is_err(),
    "Dependency should not have leaked into another container!"
  );
  println!("\nVerified that containers are isolated from one another.");

  // --- Configured container ---
  let config = ContainerConfig::from_yaml_str("autowire: false\n").expect("valid config");
  let strict = Container::with_config(config);
  strict.singleton_instance_tagged("source", "strict data".to_string());
  match strict.get::<Report>() {
    Ok(_) => panic!("autowiring is disabled"),
    Err(err) => println!("\nStrict container refused to autowire:\n{}", err),
  }
}
