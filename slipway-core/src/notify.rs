use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::booking::Booking;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationKind {
    Confirmation,
    Failure,
}

/// Consumed by the coordinator: fire-and-forget scheduling of a customer
/// notification. A failed send never rolls back a booking transition.
pub trait Notifier: Send + Sync {
    fn notify(&self, booking: &Booking, kind: NotificationKind);
}

/// A rendered outbound e-mail.
#[derive(Debug, Clone)]
pub struct EmailMessage {
    pub to: String,
    pub reply_to: Option<String>,
    pub subject: String,
    pub body: String,
}

#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("mail recipient not configured")]
    NotConfigured,

    #[error("network error contacting mail provider: {0}")]
    Network(String),

    #[error("mail provider rejected the message ({status}): {message}")]
    Rejected { status: u16, message: String },
}

/// Transport for outbound mail.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> Result<(), MailError>;
}
