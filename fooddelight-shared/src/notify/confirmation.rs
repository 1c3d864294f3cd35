/// Order confirmation dispatch
///
/// [`OrderSummary`] is the view of a placed order that goes into the email.
/// [`ConfirmationDispatcher`] renders it into HTML and plain-text bodies and
/// hands the message to a [`Mailer`], making one attempt bounded by a timeout.

use super::mailer::{MailError, Mailer, OutgoingEmail};
use crate::models::order::Order;
use askama::Template;
use std::{fmt, sync::Arc, time::Duration};
use tracing::{debug, warn};
use uuid::Uuid;

/// Subject line of every confirmation email
pub const CONFIRMATION_SUBJECT: &str = "Your Food Delight Order Confirmation";

/// One item as it appears in the email, money already formatted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryLine {
    pub title: String,
    /// Image URL, empty when the item has none
    pub image: String,
    pub unit_price: String,
    pub quantity: u32,
    pub line_total: String,
}

/// Email view of a placed order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderSummary {
    pub order_id: Uuid,
    pub lines: Vec<SummaryLine>,
    /// Total as stored on the order
    pub total: String,
}

impl OrderSummary {
    pub fn from_order(order: &Order) -> Self {
        let lines = order
            .items()
            .iter()
            .map(|item| SummaryLine {
                title: item.title.clone(),
                image: item.image.clone().unwrap_or_default(),
                unit_price: money(item.price),
                quantity: item.quantity,
                line_total: money(item.line_total()),
            })
            .collect();

        Self {
            order_id: order.id,
            lines,
            total: money(order.total),
        }
    }
}

fn money(amount: f64) -> String {
    format!("{:.2}", amount)
}

#[derive(Template)]
#[template(path = "order_confirmation.html")]
struct ConfirmationHtml<'a> {
    summary: &'a OrderSummary,
}

#[derive(Template)]
#[template(path = "order_confirmation.txt")]
struct ConfirmationText<'a> {
    summary: &'a OrderSummary,
}

/// Renders the confirmation email for `summary` addressed to `to`
///
/// # Errors
///
/// Returns the template error if either body fails to render
pub fn render_confirmation(to: &str, summary: &OrderSummary) -> Result<OutgoingEmail, askama::Error> {
    let html_body = ConfirmationHtml { summary }.render()?;
    let text_body = ConfirmationText { summary }.render()?;

    Ok(OutgoingEmail {
        to: to.to_string(),
        subject: CONFIRMATION_SUBJECT.to_string(),
        text_body,
        html_body,
    })
}

/// Why a confirmation email was not delivered
#[derive(Debug, thiserror::Error)]
pub enum SendFailure {
    /// No mail provider is configured
    #[error("Email delivery is not configured")]
    NotConfigured,

    /// A template failed to render
    #[error("Failed to render confirmation email: {0}")]
    Render(#[from] askama::Error),

    /// The provider refused the message or could not be reached
    #[error(transparent)]
    Provider(#[from] MailError),

    /// The provider did not answer in time
    #[error("Email delivery timed out after {0:?}")]
    TimedOut(Duration),
}

/// Sends order confirmations through an optional mailer
#[derive(Clone)]
pub struct ConfirmationDispatcher {
    mailer: Option<Arc<dyn Mailer>>,
    timeout: Duration,
}

impl fmt::Debug for ConfirmationDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfirmationDispatcher")
            .field("configured", &self.mailer.is_some())
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ConfirmationDispatcher {
    /// Dispatcher that delivers through `mailer`, giving up after `timeout`
    pub fn new(mailer: Arc<dyn Mailer>, timeout: Duration) -> Self {
        Self {
            mailer: Some(mailer),
            timeout,
        }
    }

    /// Dispatcher with no provider; every send reports `NotConfigured`
    pub fn disabled() -> Self {
        Self {
            mailer: None,
            timeout: Duration::ZERO,
        }
    }

    /// Whether a mailer is attached
    pub fn is_configured(&self) -> bool {
        self.mailer.is_some()
    }

    /// Renders and sends one confirmation email
    ///
    /// Makes a single attempt. Never retries.
    ///
    /// # Errors
    ///
    /// Returns a [`SendFailure`] describing why the email was not delivered
    pub async fn send_confirmation(&self, to: &str, summary: &OrderSummary) -> Result<(), SendFailure> {
        let Some(mailer) = &self.mailer else {
            debug!(order_id = %summary.order_id, "Mailer not configured, skipping confirmation");
            return Err(SendFailure::NotConfigured);
        };

        let email = render_confirmation(to, summary)?;
        debug!(order_id = %summary.order_id, body = %email.text_body, "Rendered confirmation email");

        match tokio::time::timeout(self.timeout, mailer.send(&email)).await {
            Ok(Ok(())) => {
                debug!(order_id = %summary.order_id, to = %to, "Confirmation email sent");
                Ok(())
            }
            Ok(Err(e)) => {
                warn!(order_id = %summary.order_id, error = %e, "Confirmation email failed");
                Err(SendFailure::Provider(e))
            }
            Err(_) => {
                warn!(
                    order_id = %summary.order_id,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Confirmation email timed out"
                );
                Err(SendFailure::TimedOut(self.timeout))
            }
        }
    }
}
