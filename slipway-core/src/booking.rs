use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One reservation of a jet-ski unit for a time range.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub unit_id: String,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub notes: Option<String>,
    pub addons: Addons,
    pub passengers: Vec<String>,
    pub amount_cents: i32,
    pub currency: String,
    pub status: BookingStatus,
    pub payment_ref: Option<String>,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    Pending,
    AwaitingPayment,
    Confirmed,
    PaymentFailed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "PENDING",
            BookingStatus::AwaitingPayment => "AWAITING_PAYMENT",
            BookingStatus::Confirmed => "CONFIRMED",
            BookingStatus::PaymentFailed => "PAYMENT_FAILED",
            BookingStatus::Cancelled => "CANCELLED",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "PENDING" => Some(BookingStatus::Pending),
            "AWAITING_PAYMENT" => Some(BookingStatus::AwaitingPayment),
            "CONFIRMED" => Some(BookingStatus::Confirmed),
            "PAYMENT_FAILED" => Some(BookingStatus::PaymentFailed),
            "CANCELLED" => Some(BookingStatus::Cancelled),
            _ => None,
        }
    }

    /// Terminal states admit no further transition.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            BookingStatus::Confirmed | BookingStatus::PaymentFailed | BookingStatus::Cancelled
        )
    }

    /// Legal edges of the lifecycle state machine.
    pub fn can_transition_to(&self, next: BookingStatus) -> bool {
        use BookingStatus::*;
        matches!(
            (self, next),
            (Pending, AwaitingPayment)
                | (Pending, Cancelled)
                | (AwaitingPayment, Confirmed)
                | (AwaitingPayment, PaymentFailed)
                | (AwaitingPayment, Cancelled)
        )
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Optional extras attached to a booking.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Addons {
    pub drone: bool,
    pub gopro: bool,
    pub wetsuit: bool,
    pub boat: bool,
    pub boat_count: i32,
    pub extra_people: i32,
}

impl Default for Addons {
    fn default() -> Self {
        Self {
            drone: false,
            gopro: false,
            wetsuit: false,
            boat: false,
            boat_count: 1,
            extra_people: 0,
        }
    }
}

/// Input for creating a booking; the coordinator validates and prices it.
#[derive(Debug, Clone, Deserialize)]
pub struct NewBooking {
    pub unit_id: String,
    pub starts_at: DateTime<Utc>,
    pub ends_at: Option<DateTime<Utc>>,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub notes: Option<String>,
    #[serde(default)]
    pub addons: Addons,
    #[serde(default)]
    pub passengers: Vec<String>,
}
