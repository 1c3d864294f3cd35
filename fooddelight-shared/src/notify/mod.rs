/// Order confirmation emails
///
/// - [`mailer`]: The `Mailer` contract and the SendGrid HTTP implementation
/// - [`confirmation`]: Order summaries, template rendering and the
///   timeout-bounded dispatcher
///
/// Sending is best-effort. A failed or timed-out send is reported to the
/// caller as a [`confirmation::SendFailure`]; it never affects the order it
/// describes.

pub mod confirmation;
pub mod mailer;

pub use confirmation::{ConfirmationDispatcher, OrderSummary, SendFailure};
pub use mailer::{MailError, Mailer, OutgoingEmail, SendGridMailer};
