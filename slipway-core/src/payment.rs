use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::booking::Booking;

/// Outcome reported by the payment provider for a checkout session.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentOutcome {
    Succeeded,
    Failed,
    Cancelled,
}

impl PaymentOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentOutcome::Succeeded => "SUCCEEDED",
            PaymentOutcome::Failed => "FAILED",
            PaymentOutcome::Cancelled => "CANCELLED",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "SUCCEEDED" => Some(PaymentOutcome::Succeeded),
            "FAILED" => Some(PaymentOutcome::Failed),
            "CANCELLED" => Some(PaymentOutcome::Cancelled),
            _ => None,
        }
    }
}

/// An inbound notification from the payment gateway.
///
/// `event_id` is the provider-assigned id and is the deduplication key:
/// each event id is applied at most once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentEvent {
    pub event_id: String,
    pub payment_ref: String,
    pub outcome: PaymentOutcome,
    pub received_at: DateTime<Utc>,
}

/// A provider-issued hosted checkout session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutSession {
    pub reference: String,
    pub redirect_url: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("gateway request timed out")]
    Timeout,

    #[error("network error contacting gateway: {0}")]
    Network(String),

    #[error("gateway rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("unexpected gateway response: {0}")]
    InvalidResponse(String),
}

/// Adapter for the external payment provider. The adapter owns
/// payment-reference issuance; callbacks come back as [`PaymentEvent`]s.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create a hosted checkout session for a booking.
    async fn create_checkout_session(&self, booking: &Booking)
        -> Result<CheckoutSession, GatewayError>;
}
