use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::booking::{Booking, BookingStatus};
use crate::catalog::{AddonPricing, Unit};
use crate::payment::PaymentEvent;

/// A payment event as durably recorded against a booking.
#[derive(Debug, Clone)]
pub struct RecordedEvent {
    pub event: PaymentEvent,
    pub booking_id: Uuid,
}

/// Per-unit aggregates for the admin dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct UnitAnalytics {
    pub unit_id: String,
    pub bookings: i64,
    pub revenue_cents: i64,
}

/// Repository trait for booking data access.
///
/// `insert` and `transition` carry the concurrency contract: `insert` fails
/// softly (returns `false`) when the unit is already taken for an overlapping
/// range, enforced atomically by the store; `transition` is a compare-and-swap
/// keyed on the expected status and bumps the row version, so of two
/// concurrent transitions exactly one observes `true`.
#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Persist a new booking. Returns `false` on an overlapping-range conflict.
    async fn insert(
        &self,
        booking: &Booking,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>>;

    async fn get(
        &self,
        id: Uuid,
    ) -> Result<Option<Booking>, Box<dyn std::error::Error + Send + Sync>>;

    async fn find_by_payment_ref(
        &self,
        payment_ref: &str,
    ) -> Result<Option<Booking>, Box<dyn std::error::Error + Send + Sync>>;

    /// Atomically move `id` from `from` to `to`, optionally storing a payment
    /// reference. Returns `false` when the booking was not in `from`.
    async fn transition(
        &self,
        id: Uuid,
        from: BookingStatus,
        to: BookingStatus,
        payment_ref: Option<&str>,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>>;

    /// Record a payment event against a booking. Returns `false` when the
    /// event id was already recorded (duplicate delivery).
    async fn record_event(
        &self,
        event: &PaymentEvent,
        booking_id: Uuid,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>>;

    async fn find_event(
        &self,
        event_id: &str,
    ) -> Result<Option<RecordedEvent>, Box<dyn std::error::Error + Send + Sync>>;

    /// Time ranges that block a unit within a window (slot-holding statuses
    /// only).
    async fn blocked_ranges(
        &self,
        unit_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<(DateTime<Utc>, DateTime<Utc>)>, Box<dyn std::error::Error + Send + Sync>>;

    async fn list(
        &self,
        limit: i64,
        offset: i64,
        status: Option<BookingStatus>,
    ) -> Result<Vec<Booking>, Box<dyn std::error::Error + Send + Sync>>;

    async fn set_notes(
        &self,
        id: Uuid,
        notes: &str,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>>;

    /// Move a booking to a new time range. Only legal while the booking is
    /// still `Pending`; returns `false` otherwise. Overlap conflicts surface
    /// as errors from the store's exclusion guard.
    async fn reschedule(
        &self,
        id: Uuid,
        starts_at: DateTime<Utc>,
        ends_at: DateTime<Utc>,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>>;

    async fn delete(
        &self,
        id: Uuid,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>>;

    async fn analytics(
        &self,
    ) -> Result<Vec<UnitAnalytics>, Box<dyn std::error::Error + Send + Sync>>;
}

/// Repository trait for the unit catalog and add-on pricing.
#[async_trait]
pub trait UnitRepository: Send + Sync {
    async fn get_unit(
        &self,
        id: &str,
    ) -> Result<Option<Unit>, Box<dyn std::error::Error + Send + Sync>>;

    async fn list_units(
        &self,
    ) -> Result<Vec<Unit>, Box<dyn std::error::Error + Send + Sync>>;

    async fn upsert_unit(
        &self,
        unit: &Unit,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    async fn addon_pricing(
        &self,
    ) -> Result<AddonPricing, Box<dyn std::error::Error + Send + Sync>>;

    async fn upsert_addon_pricing(
        &self,
        pricing: &AddonPricing,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}
