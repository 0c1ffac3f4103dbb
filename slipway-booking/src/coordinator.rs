use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use uuid::Uuid;

use slipway_core::booking::{Booking, BookingStatus, NewBooking};
use slipway_core::notify::{NotificationKind, Notifier};
use slipway_core::payment::{
    CheckoutSession, GatewayError, PaymentEvent, PaymentGateway, PaymentOutcome,
};
use slipway_core::repository::{BookingRepository, UnitRepository};

use crate::pricing;

#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid state transition from {from} to {to}")]
    InvalidState { from: String, to: String },

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("storage error: {0}")]
    Storage(String),
}

fn storage(err: Box<dyn std::error::Error + Send + Sync>) -> BookingError {
    BookingError::Storage(err.to_string())
}

/// What became of an inbound payment event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventDisposition {
    /// The event moved the booking to a terminal state.
    Applied(BookingStatus),
    /// The event id had already been processed; nothing changed.
    Duplicate(BookingStatus),
    /// The booking had already left `AwaitingPayment`; the event was
    /// discarded.
    Stale(BookingStatus),
}

impl EventDisposition {
    pub fn status(&self) -> BookingStatus {
        match self {
            EventDisposition::Applied(s)
            | EventDisposition::Duplicate(s)
            | EventDisposition::Stale(s) => *s,
        }
    }
}

/// Advances bookings through their lifecycle based on payment events.
///
/// The coordinator is the only writer of booking state. Every transition is
/// a compare-and-swap in the store keyed on the expected status, so two
/// concurrent calls cannot both observe the same pre-state and both win.
pub struct BookingCoordinator {
    store: Arc<dyn BookingRepository>,
    catalog: Arc<dyn UnitRepository>,
    gateway: Arc<dyn PaymentGateway>,
    notifier: Arc<dyn Notifier>,
}

impl BookingCoordinator {
    pub fn new(
        store: Arc<dyn BookingRepository>,
        catalog: Arc<dyn UnitRepository>,
        gateway: Arc<dyn PaymentGateway>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            store,
            catalog,
            gateway,
            notifier,
        }
    }

    /// Validate and price a booking request, then persist it as `Pending`.
    pub async fn create_booking(&self, request: NewBooking) -> Result<Booking, BookingError> {
        let full_name = request.full_name.trim().to_string();
        if full_name.len() < 2 {
            return Err(BookingError::Validation("full name is required".into()));
        }
        let email = request.email.trim().to_string();
        if !email.contains('@') {
            return Err(BookingError::Validation(format!(
                "invalid email address: {}",
                email
            )));
        }
        let phone = request.phone.trim().to_string();
        if phone.len() < 3 {
            return Err(BookingError::Validation("phone number is required".into()));
        }

        let unit = self
            .catalog
            .get_unit(&request.unit_id)
            .await
            .map_err(storage)?
            .ok_or_else(|| {
                BookingError::Validation(format!("unknown unit: {}", request.unit_id))
            })?;

        let ends_at = request
            .ends_at
            .unwrap_or(request.starts_at + Duration::minutes(unit.duration_minutes as i64));
        if ends_at <= request.starts_at {
            return Err(BookingError::Validation(
                "booking must end after it starts".into(),
            ));
        }

        let addon_pricing = self.catalog.addon_pricing().await.map_err(storage)?;
        let amount_cents = pricing::quote(&unit, &addon_pricing, &request.addons);

        let now = Utc::now();
        let booking = Booking {
            id: Uuid::new_v4(),
            unit_id: unit.id.clone(),
            starts_at: request.starts_at,
            ends_at,
            full_name,
            email,
            phone,
            notes: request.notes,
            addons: request.addons,
            passengers: request.passengers,
            amount_cents,
            currency: pricing::CURRENCY.to_string(),
            status: BookingStatus::Pending,
            payment_ref: None,
            version: 1,
            created_at: now,
            updated_at: now,
        };

        if !self.store.insert(&booking).await.map_err(storage)? {
            return Err(BookingError::Conflict(format!(
                "unit {} is already booked for an overlapping range",
                unit.id
            )));
        }

        tracing::info!(booking_id = %booking.id, unit = %booking.unit_id, "booking created");
        Ok(booking)
    }

    pub async fn get_booking(&self, id: Uuid) -> Result<Booking, BookingError> {
        self.store
            .get(id)
            .await
            .map_err(storage)?
            .ok_or_else(|| BookingError::NotFound(format!("booking {}", id)))
    }

    /// Open a checkout session and move `Pending` -> `AwaitingPayment`,
    /// storing the gateway's payment reference.
    pub async fn initiate_payment(
        &self,
        id: Uuid,
    ) -> Result<(Booking, CheckoutSession), BookingError> {
        let booking = self.get_booking(id).await?;
        if booking.status != BookingStatus::Pending {
            return Err(BookingError::InvalidState {
                from: booking.status.to_string(),
                to: BookingStatus::AwaitingPayment.to_string(),
            });
        }

        let session = self.gateway.create_checkout_session(&booking).await?;

        let moved = self
            .store
            .transition(
                id,
                BookingStatus::Pending,
                BookingStatus::AwaitingPayment,
                Some(&session.reference),
            )
            .await
            .map_err(storage)?;
        if !moved {
            // A concurrent call won the CAS; this one loses.
            let current = self.get_booking(id).await?;
            return Err(BookingError::InvalidState {
                from: current.status.to_string(),
                to: BookingStatus::AwaitingPayment.to_string(),
            });
        }

        let updated = self.get_booking(id).await?;
        tracing::info!(
            booking_id = %id,
            payment_ref = %session.reference,
            "payment initiated"
        );
        Ok((updated, session))
    }

    /// Reconcile an asynchronous gateway callback.
    ///
    /// Idempotent by event id: a redelivered event returns the prior outcome
    /// and schedules nothing. A booking that already left `AwaitingPayment`
    /// means a late or conflicting callback; the first durably recorded
    /// outcome wins and the rest are discarded.
    pub async fn handle_payment_event(
        &self,
        event: &PaymentEvent,
    ) -> Result<EventDisposition, BookingError> {
        let booking = self
            .store
            .find_by_payment_ref(&event.payment_ref)
            .await
            .map_err(storage)?
            .ok_or_else(|| {
                BookingError::NotFound(format!(
                    "no booking for payment reference {}",
                    event.payment_ref
                ))
            })?;

        let fresh = self
            .store
            .record_event(event, booking.id)
            .await
            .map_err(storage)?;
        if !fresh {
            let status = self.get_booking(booking.id).await?.status;
            tracing::debug!(event_id = %event.event_id, "duplicate payment event ignored");
            return Ok(EventDisposition::Duplicate(status));
        }

        let (target, kind) = match event.outcome {
            PaymentOutcome::Succeeded => {
                (BookingStatus::Confirmed, NotificationKind::Confirmation)
            }
            PaymentOutcome::Failed => (BookingStatus::PaymentFailed, NotificationKind::Failure),
            PaymentOutcome::Cancelled => (BookingStatus::Cancelled, NotificationKind::Failure),
        };

        let moved = self
            .store
            .transition(booking.id, BookingStatus::AwaitingPayment, target, None)
            .await
            .map_err(storage)?;
        if !moved {
            let status = self.get_booking(booking.id).await?.status;
            tracing::info!(
                event_id = %event.event_id,
                booking_id = %booking.id,
                %status,
                "discarding payment event for booking no longer awaiting payment"
            );
            return Ok(EventDisposition::Stale(status));
        }

        let updated = self.get_booking(booking.id).await?;
        self.notifier.notify(&updated, kind);
        tracing::info!(
            booking_id = %booking.id,
            status = %updated.status,
            "payment event applied"
        );
        Ok(EventDisposition::Applied(updated.status))
    }

    /// Cancel a booking that has not reached a terminal state.
    pub async fn cancel_booking(&self, id: Uuid) -> Result<Booking, BookingError> {
        let booking = self.get_booking(id).await?;
        if !matches!(
            booking.status,
            BookingStatus::Pending | BookingStatus::AwaitingPayment
        ) {
            return Err(BookingError::InvalidState {
                from: booking.status.to_string(),
                to: BookingStatus::Cancelled.to_string(),
            });
        }

        let moved = self
            .store
            .transition(id, booking.status, BookingStatus::Cancelled, None)
            .await
            .map_err(storage)?;
        if !moved {
            let current = self.get_booking(id).await?;
            return Err(BookingError::InvalidState {
                from: current.status.to_string(),
                to: BookingStatus::Cancelled.to_string(),
            });
        }

        tracing::info!(booking_id = %id, "booking cancelled");
        self.get_booking(id).await
    }
}

/// Gateway stand-in for tests and local development.
pub struct MockPaymentGateway;

#[async_trait]
impl PaymentGateway for MockPaymentGateway {
    async fn create_checkout_session(
        &self,
        booking: &Booking,
    ) -> Result<CheckoutSession, GatewayError> {
        // Trigger for exercising the gateway-failure path.
        if booking.notes.as_deref() == Some("fail-gateway") {
            return Err(GatewayError::Rejected {
                status: 503,
                message: "simulated gateway failure".to_string(),
            });
        }
        let reference = format!("mock_co_{}", booking.id.simple());
        Ok(CheckoutSession {
            redirect_url: Some(format!("https://pay.example.test/checkout/{}", reference)),
            reference,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use chrono::TimeZone;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingNotifier {
        sent: Mutex<Vec<(Uuid, NotificationKind)>>,
    }

    impl RecordingNotifier {
        fn count(&self) -> usize {
            self.sent.lock().unwrap().len()
        }
    }

    impl Notifier for RecordingNotifier {
        fn notify(&self, booking: &Booking, kind: NotificationKind) {
            self.sent.lock().unwrap().push((booking.id, kind));
        }
    }

    fn coordinator() -> (Arc<RecordingNotifier>, BookingCoordinator) {
        let store = Arc::new(MemoryStore::with_default_catalog());
        let notifier = Arc::new(RecordingNotifier::default());
        let coordinator = BookingCoordinator::new(
            store.clone(),
            store,
            Arc::new(MockPaymentGateway),
            notifier.clone(),
        );
        (notifier, coordinator)
    }

    fn request(unit_id: &str) -> NewBooking {
        NewBooking {
            unit_id: unit_id.to_string(),
            starts_at: Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap(),
            ends_at: None,
            full_name: "Thandi Mokoena".to_string(),
            email: "thandi@example.com".to_string(),
            phone: "+27 82 000 0000".to_string(),
            notes: None,
            addons: Default::default(),
            passengers: vec![],
        }
    }

    fn event(payment_ref: &str, event_id: &str, outcome: PaymentOutcome) -> PaymentEvent {
        PaymentEvent {
            event_id: event_id.to_string(),
            payment_ref: payment_ref.to_string(),
            outcome,
            received_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_create_booking_starts_pending() {
        let (_, coordinator) = coordinator();

        let booking = coordinator.create_booking(request("60-1")).await.unwrap();

        let found = coordinator.get_booking(booking.id).await.unwrap();
        assert_eq!(found.status, BookingStatus::Pending);
        assert_eq!(found.amount_cents, 260_000);
        assert_eq!(
            found.ends_at - found.starts_at,
            chrono::Duration::minutes(60)
        );
        assert!(found.payment_ref.is_none());
    }

    #[tokio::test]
    async fn test_create_booking_rejects_bad_input() {
        let (_, coordinator) = coordinator();

        let mut missing_name = request("60-1");
        missing_name.full_name = " ".to_string();
        assert!(matches!(
            coordinator.create_booking(missing_name).await,
            Err(BookingError::Validation(_))
        ));

        let unknown_unit = request("hovercraft");
        assert!(matches!(
            coordinator.create_booking(unknown_unit).await,
            Err(BookingError::Validation(_))
        ));

        let mut inverted = request("60-1");
        inverted.ends_at = Some(inverted.starts_at - Duration::minutes(30));
        assert!(matches!(
            coordinator.create_booking(inverted).await,
            Err(BookingError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_create_booking_rejects_overlapping_range() {
        let (_, coordinator) = coordinator();

        coordinator.create_booking(request("60-1")).await.unwrap();

        let mut overlapping = request("60-1");
        overlapping.starts_at += Duration::minutes(30);
        assert!(matches!(
            coordinator.create_booking(overlapping).await,
            Err(BookingError::Conflict(_))
        ));

        // A different unit at the same time is fine.
        coordinator.create_booking(request("30-1")).await.unwrap();
    }

    #[tokio::test]
    async fn test_payment_flow_confirms_once() {
        let (notifier, coordinator) = coordinator();

        let booking = coordinator.create_booking(request("60-1")).await.unwrap();
        let (booking, session) = coordinator.initiate_payment(booking.id).await.unwrap();
        assert_eq!(booking.status, BookingStatus::AwaitingPayment);
        assert_eq!(booking.payment_ref.as_deref(), Some(session.reference.as_str()));

        let disposition = coordinator
            .handle_payment_event(&event(&session.reference, "evt-1", PaymentOutcome::Succeeded))
            .await
            .unwrap();
        assert_eq!(
            disposition,
            EventDisposition::Applied(BookingStatus::Confirmed)
        );
        assert_eq!(notifier.count(), 1);

        // Redelivery of the same event id is a no-op.
        let replay = coordinator
            .handle_payment_event(&event(&session.reference, "evt-1", PaymentOutcome::Succeeded))
            .await
            .unwrap();
        assert_eq!(
            replay,
            EventDisposition::Duplicate(BookingStatus::Confirmed)
        );
        assert_eq!(notifier.count(), 1);

        let found = coordinator.get_booking(booking.id).await.unwrap();
        assert_eq!(found.status, BookingStatus::Confirmed);
    }

    #[tokio::test]
    async fn test_failed_payment_reaches_terminal_state() {
        let (notifier, coordinator) = coordinator();

        let booking = coordinator.create_booking(request("30-2")).await.unwrap();
        let (_, session) = coordinator.initiate_payment(booking.id).await.unwrap();

        let disposition = coordinator
            .handle_payment_event(&event(&session.reference, "evt-9", PaymentOutcome::Failed))
            .await
            .unwrap();
        assert_eq!(
            disposition,
            EventDisposition::Applied(BookingStatus::PaymentFailed)
        );
        assert_eq!(notifier.count(), 1);

        // Terminal: a later success callback for the same session is stale.
        let late = coordinator
            .handle_payment_event(&event(&session.reference, "evt-10", PaymentOutcome::Succeeded))
            .await
            .unwrap();
        assert_eq!(late, EventDisposition::Stale(BookingStatus::PaymentFailed));
        assert_eq!(notifier.count(), 1);
    }

    #[tokio::test]
    async fn test_event_with_unknown_reference_is_not_found() {
        let (_, coordinator) = coordinator();

        let result = coordinator
            .handle_payment_event(&event("co_missing", "evt-2", PaymentOutcome::Succeeded))
            .await;
        assert!(matches!(result, Err(BookingError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_initiate_payment_requires_pending() {
        let (_, coordinator) = coordinator();

        let booking = coordinator.create_booking(request("60-1")).await.unwrap();
        coordinator.initiate_payment(booking.id).await.unwrap();

        let second = coordinator.initiate_payment(booking.id).await;
        assert!(matches!(second, Err(BookingError::InvalidState { .. })));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_concurrent_initiate_has_single_winner() {
        let (_, coordinator) = coordinator();
        let coordinator = Arc::new(coordinator);

        let booking = coordinator.create_booking(request("60-1")).await.unwrap();

        let a = {
            let c = coordinator.clone();
            let id = booking.id;
            tokio::spawn(async move { c.initiate_payment(id).await })
        };
        let b = {
            let c = coordinator.clone();
            let id = booking.id;
            tokio::spawn(async move { c.initiate_payment(id).await })
        };

        let (a, b) = (a.await.unwrap(), b.await.unwrap());
        let winners = [&a, &b].iter().filter(|r| r.is_ok()).count();
        assert_eq!(winners, 1);

        let found = coordinator.get_booking(booking.id).await.unwrap();
        assert_eq!(found.status, BookingStatus::AwaitingPayment);
    }

    #[tokio::test]
    async fn test_gateway_failure_leaves_booking_pending() {
        let (_, coordinator) = coordinator();

        let mut req = request("60-1");
        req.notes = Some("fail-gateway".to_string());
        let booking = coordinator.create_booking(req).await.unwrap();

        let result = coordinator.initiate_payment(booking.id).await;
        assert!(matches!(result, Err(BookingError::Gateway(_))));

        let found = coordinator.get_booking(booking.id).await.unwrap();
        assert_eq!(found.status, BookingStatus::Pending);
        assert!(found.payment_ref.is_none());
    }

    #[tokio::test]
    async fn test_cancel_from_pending_and_awaiting_payment() {
        let (notifier, coordinator) = coordinator();

        let first = coordinator.create_booking(request("60-1")).await.unwrap();
        let cancelled = coordinator.cancel_booking(first.id).await.unwrap();
        assert_eq!(cancelled.status, BookingStatus::Cancelled);

        let mut other = request("60-1");
        other.starts_at += Duration::hours(3);
        let second = coordinator.create_booking(other).await.unwrap();
        let (_, session) = coordinator.initiate_payment(second.id).await.unwrap();
        coordinator.cancel_booking(second.id).await.unwrap();

        // A callback landing after the cancellation is discarded.
        let disposition = coordinator
            .handle_payment_event(&event(&session.reference, "evt-5", PaymentOutcome::Succeeded))
            .await
            .unwrap();
        assert_eq!(disposition, EventDisposition::Stale(BookingStatus::Cancelled));
        assert_eq!(notifier.count(), 0);
    }

    #[tokio::test]
    async fn test_cancel_confirmed_is_invalid() {
        let (_, coordinator) = coordinator();

        let booking = coordinator.create_booking(request("60-1")).await.unwrap();
        let (_, session) = coordinator.initiate_payment(booking.id).await.unwrap();
        coordinator
            .handle_payment_event(&event(&session.reference, "evt-7", PaymentOutcome::Succeeded))
            .await
            .unwrap();

        let result = coordinator.cancel_booking(booking.id).await;
        assert!(matches!(result, Err(BookingError::InvalidState { .. })));

        let found = coordinator.get_booking(booking.id).await.unwrap();
        assert_eq!(found.status, BookingStatus::Confirmed);
    }

    #[tokio::test]
    async fn test_cancelled_booking_frees_the_slot() {
        let (_, coordinator) = coordinator();

        let booking = coordinator.create_booking(request("60-1")).await.unwrap();
        coordinator.cancel_booking(booking.id).await.unwrap();

        // Same unit, same range: available again.
        coordinator.create_booking(request("60-1")).await.unwrap();
    }
}
