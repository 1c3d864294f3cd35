/// Transactional email delivery
///
/// [`Mailer`] is the boundary to the external email provider: one call, one
/// message, success or failure. [`SendGridMailer`] implements it against the
/// SendGrid v3 `mail/send` endpoint.
///
/// # Example
///
/// ```no_run
/// use fooddelight_shared::notify::mailer::{Mailer, OutgoingEmail, SendGridMailer};
/// use secrecy::SecretString;
/// use std::time::Duration;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let mailer = SendGridMailer::new(
///     "https://api.sendgrid.com/v3/mail/send",
///     SecretString::from("SG.xxxxx"),
///     "orders@fooddelight.local",
///     Duration::from_secs(10),
/// )?;
///
/// mailer
///     .send(&OutgoingEmail {
///         to: "customer@example.com".to_string(),
///         subject: "Hello".to_string(),
///         text_body: "Hi!".to_string(),
///         html_body: "<p>Hi!</p>".to_string(),
///     })
///     .await?;
/// # Ok(())
/// # }
/// ```

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info};

/// A single rendered message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    /// Recipient address
    pub to: String,

    /// Subject line
    pub subject: String,

    /// Plain text alternative
    pub text_body: String,

    /// HTML body
    pub html_body: String,
}

/// Email delivery errors
#[derive(Debug, thiserror::Error)]
pub enum MailError {
    /// Request could not be sent or the response could not be read
    #[error("HTTP request to mail provider failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Provider answered with a non-success status
    #[error("Mail provider rejected the message with status {status}")]
    Rejected { status: u16, body: String },

    /// Sender or recipient is not a usable address
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),
}

/// Delivers one email through an external provider
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Sends `email`, making a single attempt
    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError>;
}

/// SendGrid v3 API client
pub struct SendGridMailer {
    client: reqwest::Client,
    api_url: String,
    api_key: SecretString,
    from_address: String,
}

#[derive(Serialize)]
struct Address<'a> {
    email: &'a str,
}

#[derive(Serialize)]
struct Personalization<'a> {
    to: [Address<'a>; 1],
}

#[derive(Serialize)]
struct Content<'a> {
    #[serde(rename = "type")]
    kind: &'a str,
    value: &'a str,
}

#[derive(Serialize)]
struct SendRequest<'a> {
    personalizations: [Personalization<'a>; 1],
    from: Address<'a>,
    subject: &'a str,
    content: [Content<'a>; 2],
}

impl SendGridMailer {
    /// Creates a client posting to `api_url` with a bearer `api_key`
    ///
    /// # Errors
    ///
    /// Returns `MailError::InvalidAddress` if `from_address` is not an address,
    /// `MailError::Transport` if the HTTP client cannot be built
    pub fn new(
        api_url: impl Into<String>,
        api_key: SecretString,
        from_address: impl Into<String>,
        request_timeout: Duration,
    ) -> Result<Self, MailError> {
        let from_address = from_address.into();
        if !looks_like_address(&from_address) {
            return Err(MailError::InvalidAddress(from_address));
        }

        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()?;

        Ok(Self {
            client,
            api_url: api_url.into(),
            api_key,
            from_address,
        })
    }

    fn request_body<'a>(&'a self, email: &'a OutgoingEmail) -> SendRequest<'a> {
        SendRequest {
            personalizations: [Personalization {
                to: [Address { email: &email.to }],
            }],
            from: Address {
                email: &self.from_address,
            },
            subject: &email.subject,
            content: [
                Content {
                    kind: "text/plain",
                    value: &email.text_body,
                },
                Content {
                    kind: "text/html",
                    value: &email.html_body,
                },
            ],
        }
    }
}

#[async_trait]
impl Mailer for SendGridMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError> {
        if !looks_like_address(&email.to) {
            return Err(MailError::InvalidAddress(email.to.clone()));
        }

        debug!(to = %email.to, subject = %email.subject, "Posting email to provider");

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(self.api_key.expose_secret())
            .json(&self.request_body(email))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MailError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        info!(to = %email.to, subject = %email.subject, "Email sent successfully");
        Ok(())
    }
}

fn looks_like_address(address: &str) -> bool {
    match address.split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty() && !address.contains(char::is_whitespace),
        None => false,
    }
}
