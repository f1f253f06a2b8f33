//! # Notifications
//!
//! Post-payment messages to the customer.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    NotificationDispatcher::dispatch                     │
//! │                                                                         │
//! │  Paid invoice                                                           │
//! │     ├── always        → WhatsApp to customer.phone                      │
//! │     └── email given   → Email to customer.email                         │
//! │                                                                         │
//! │  Each send yields a NotificationReceipt. A failed or timed-out send is  │
//! │  logged and reported as `delivered: false`; it never undoes the payment.│
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rand::distr::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use scanpos_core::Invoice;

use crate::error::GatewayResult;

// =============================================================================
// Types
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    WhatsApp,
    Email,
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Channel::WhatsApp => write!(f, "whatsapp"),
            Channel::Email => write!(f, "email"),
        }
    }
}

/// One outgoing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub channel: Channel,
    /// Phone number or email address.
    pub recipient: String,
    /// Email only.
    pub subject: Option<String>,
    pub body: String,
    /// Link to the invoice PDF.
    pub attachment_url: String,
}

/// Outcome of one send, returned to the API caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationReceipt {
    pub channel: Channel,
    pub recipient: String,
    pub delivered: bool,
    pub message_id: Option<String>,
    pub error: Option<String>,
}

/// A message channel.
#[async_trait]
pub trait Notifier: Send + Sync {
    fn channel(&self) -> Channel;

    /// Sends the message and returns the provider's message id.
    async fn send(&self, notification: &Notification) -> GatewayResult<String>;
}

// =============================================================================
// Logging Senders
// =============================================================================

/// WhatsApp sender that writes the message to the log.
#[derive(Debug, Default, Clone)]
pub struct LoggingWhatsAppSender;

#[async_trait]
impl Notifier for LoggingWhatsAppSender {
    fn channel(&self) -> Channel {
        Channel::WhatsApp
    }

    async fn send(&self, notification: &Notification) -> GatewayResult<String> {
        let message_id = message_id("wamid.");
        info!(
            to = %notification.recipient,
            message_id = %message_id,
            attachment = %notification.attachment_url,
            body = %notification.body,
            "WhatsApp message sent"
        );
        Ok(message_id)
    }
}

/// Email sender that writes the message to the log.
#[derive(Debug, Clone)]
pub struct LoggingEmailSender {
    from: String,
}

impl LoggingEmailSender {
    pub fn new(from: impl Into<String>) -> Self {
        LoggingEmailSender { from: from.into() }
    }
}

#[async_trait]
impl Notifier for LoggingEmailSender {
    fn channel(&self) -> Channel {
        Channel::Email
    }

    async fn send(&self, notification: &Notification) -> GatewayResult<String> {
        let message_id = message_id("email_");
        info!(
            from = %self.from,
            to = %notification.recipient,
            subject = notification.subject.as_deref().unwrap_or_default(),
            message_id = %message_id,
            attachment = %notification.attachment_url,
            "Email sent"
        );
        Ok(message_id)
    }
}

fn message_id(prefix: &str) -> String {
    let suffix: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(16)
        .map(char::from)
        .collect();
    format!("{}{}", prefix, suffix)
}

// =============================================================================
// Dispatcher
// =============================================================================

/// Upper bound for a single send unless overridden.
pub const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_secs(10);

/// Turns a paid invoice into customer messages.
pub struct NotificationDispatcher {
    whatsapp: Arc<dyn Notifier>,
    email: Arc<dyn Notifier>,
    business_name: String,
    currency_symbol: String,
    send_timeout: Duration,
}

impl NotificationDispatcher {
    pub fn new(
        whatsapp: Arc<dyn Notifier>,
        email: Arc<dyn Notifier>,
        business_name: impl Into<String>,
        currency_symbol: impl Into<String>,
    ) -> Self {
        NotificationDispatcher {
            whatsapp,
            email,
            business_name: business_name.into(),
            currency_symbol: currency_symbol.into(),
            send_timeout: DEFAULT_SEND_TIMEOUT,
        }
    }

    /// Bounds each individual send.
    pub fn with_send_timeout(mut self, send_timeout: Duration) -> Self {
        self.send_timeout = send_timeout;
        self
    }

    /// Dispatcher backed by the logging senders.
    pub fn logging(business_name: impl Into<String>, currency_symbol: impl Into<String>) -> Self {
        let business_name = business_name.into();
        let from = format!("{} <billing@scanpos.local>", business_name);
        NotificationDispatcher::new(
            Arc::new(LoggingWhatsAppSender),
            Arc::new(LoggingEmailSender::new(from)),
            business_name,
            currency_symbol,
        )
    }

    /// Messages for a paid invoice: WhatsApp always, email when known.
    pub fn compose(&self, invoice: &Invoice) -> Vec<Notification> {
        let attachment_url = invoice_pdf_url(&invoice.invoice_number);
        let amount = invoice.grand_total.format_with_symbol(&self.currency_symbol);

        let mut messages = vec![Notification {
            channel: Channel::WhatsApp,
            recipient: invoice.customer.phone.clone(),
            subject: None,
            body: format!(
                "Thank you for your payment of {}. Your invoice {} is attached.",
                amount, invoice.invoice_number
            ),
            attachment_url: attachment_url.clone(),
        }];

        if let Some(email) = &invoice.customer.email {
            messages.push(Notification {
                channel: Channel::Email,
                recipient: email.clone(),
                subject: Some(format!(
                    "{} Invoice {}",
                    self.business_name, invoice.invoice_number
                )),
                body: format!(
                    "Dear {},\n\nThank you for shopping with {}. We have received your \
                     payment of {}. Your invoice {} is attached.\n",
                    invoice.customer.name, self.business_name, amount, invoice.invoice_number
                ),
                attachment_url,
            });
        }

        messages
    }

    /// Sends every message for the invoice, in order.
    ///
    /// Each send is bounded by the send timeout; an elapsed send is reported
    /// as undelivered with the error `timed out`.
    pub async fn dispatch(&self, invoice: &Invoice) -> Vec<NotificationReceipt> {
        let mut receipts = Vec::new();

        for notification in self.compose(invoice) {
            let sender = match notification.channel {
                Channel::WhatsApp => &self.whatsapp,
                Channel::Email => &self.email,
            };

            let sent = tokio::time::timeout(self.send_timeout, sender.send(&notification)).await;
            let receipt = match sent {
                Ok(Ok(message_id)) => NotificationReceipt {
                    channel: notification.channel,
                    recipient: notification.recipient,
                    delivered: true,
                    message_id: Some(message_id),
                    error: None,
                },
                Ok(Err(e)) => {
                    warn!(
                        invoice_number = %invoice.invoice_number,
                        channel = %notification.channel,
                        error = %e,
                        "Notification failed"
                    );
                    undelivered(notification, e.to_string())
                }
                Err(_) => {
                    warn!(
                        invoice_number = %invoice.invoice_number,
                        channel = %notification.channel,
                        timeout_ms = self.send_timeout.as_millis() as u64,
                        "Notification timed out"
                    );
                    undelivered(notification, "timed out".to_string())
                }
            };
            receipts.push(receipt);
        }

        receipts
    }
}

fn undelivered(notification: Notification, error: String) -> NotificationReceipt {
    NotificationReceipt {
        channel: notification.channel,
        recipient: notification.recipient,
        delivered: false,
        message_id: None,
        error: Some(error),
    }
}

/// Download path of an invoice PDF.
pub fn invoice_pdf_url(invoice_number: &str) -> String {
    format!("/invoices/{}.pdf", invoice_number)
}

// =============================================================================
// Unit Tests
// =============================================================================
