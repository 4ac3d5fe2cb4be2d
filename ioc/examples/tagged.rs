use fibre_autowire::{resolve, Container, Tag};
use std::sync::Arc;

// --- Abstraction and Implementations ---
trait MessageSender: Send + Sync {
  fn send(&self, to: &str, message: &str) -> String;
}

struct EmailSender;
impl MessageSender for EmailSender {
  fn send(&self, to: &str, message: &str) -> String {
    format!("Sending email to {}: '{}'", to, message)
  }
}

struct SmsSender;
impl MessageSender for SmsSender {
  fn send(&self, to: &str, message: &str) -> String {
    format!("Sending SMS to {}: '{}'", to, message)
  }
}

#[derive(Debug)]
enum Channel {
  Urgent,
}

fn main() {
  let container = Container::new();

  // --- Registration ---
  // Both implementations share one trait and are told apart by their tag.
  container.singleton_trait_tagged::<dyn MessageSender>("email", |_, _| Ok(Arc::new(EmailSender)));
  container.singleton_trait_tagged::<dyn MessageSender>("sms", |_, _| Ok(Arc::new(SmsSender)));
  // Enum variants work as tags too.
  container.singleton_trait_tagged::<dyn MessageSender>(Tag::variant(Channel::Urgent), |_, _| {
    Ok(Arc::new(SmsSender))
  });

  Container::set_instance(container.clone());

  // --- Resolution ---
  let email_notifier = resolve!(trait MessageSender, "email");
  let sms_notifier = resolve!(trait MessageSender, "sms");
  let urgent = container
    .get_trait_tagged::<dyn MessageSender>(Tag::variant(Channel::Urgent))
    .expect("urgent channel is registered");

  let result1 = email_notifier.send("test@example.com", "Hello from Fibre!");
  let result2 = sms_notifier.send("+123456789", "Hello from Fibre!");
  let result3 = urgent.send("+123456789", "Wake up!");

  println!("{}", result1);
  println!("{}", result2);
  println!("{}", result3);

  assert!(result1.contains("email"));
  assert!(result2.contains("SMS"));
  assert!(result3.contains("SMS"));
}
