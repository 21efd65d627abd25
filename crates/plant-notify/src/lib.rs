pub mod error;
pub mod mailer;
pub mod message;
pub mod notifier;
pub mod scheduler;
pub mod templates;

pub use error::{NotifyError, Result};
pub use mailer::{Mailer, SmtpMailer};
pub use message::EmailMessage;
pub use notifier::{AlertOutcome, EmailNotifier};
pub use scheduler::DailyScheduler;
