use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use slipway_core::booking::{Booking, BookingStatus};
use slipway_core::catalog::{default_units, AddonPricing, Unit};
use slipway_core::payment::PaymentEvent;
use slipway_core::repository::{BookingRepository, RecordedEvent, UnitAnalytics, UnitRepository};

/// Everything the coordinator needs, in memory behind one mutex. Used by the
/// test suites; the CAS and dedup semantics match the Postgres store.
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

struct Inner {
    bookings: HashMap<Uuid, Booking>,
    events: HashMap<String, RecordedEvent>,
    units: HashMap<String, Unit>,
    addon_pricing: AddonPricing,
}

fn holds_slot(status: BookingStatus) -> bool {
    matches!(
        status,
        BookingStatus::Pending | BookingStatus::AwaitingPayment | BookingStatus::Confirmed
    )
}

fn overlaps(booking: &Booking, starts_at: DateTime<Utc>, ends_at: DateTime<Utc>) -> bool {
    booking.starts_at < ends_at && booking.ends_at > starts_at
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                bookings: HashMap::new(),
                events: HashMap::new(),
                units: HashMap::new(),
                addon_pricing: AddonPricing::default(),
            }),
        }
    }

    pub fn with_default_catalog() -> Self {
        let store = Self::new();
        {
            let mut inner = store.inner.lock().expect("lock poisoned");
            for unit in default_units() {
                inner.units.insert(unit.id.clone(), unit);
            }
        }
        store
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BookingRepository for MemoryStore {
    async fn insert(
        &self,
        booking: &Booking,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        let mut inner = self.inner.lock().expect("lock poisoned");
        let conflict = inner.bookings.values().any(|b| {
            b.unit_id == booking.unit_id
                && holds_slot(b.status)
                && overlaps(b, booking.starts_at, booking.ends_at)
        });
        if conflict {
            return Ok(false);
        }
        inner.bookings.insert(booking.id, booking.clone());
        Ok(true)
    }

    async fn get(
        &self,
        id: Uuid,
    ) -> Result<Option<Booking>, Box<dyn std::error::Error + Send + Sync>> {
        let inner = self.inner.lock().expect("lock poisoned");
        Ok(inner.bookings.get(&id).cloned())
    }

    async fn find_by_payment_ref(
        &self,
        payment_ref: &str,
    ) -> Result<Option<Booking>, Box<dyn std::error::Error + Send + Sync>> {
        let inner = self.inner.lock().expect("lock poisoned");
        Ok(inner
            .bookings
            .values()
            .find(|b| b.payment_ref.as_deref() == Some(payment_ref))
            .cloned())
    }

    async fn transition(
        &self,
        id: Uuid,
        from: BookingStatus,
        to: BookingStatus,
        payment_ref: Option<&str>,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        let mut inner = self.inner.lock().expect("lock poisoned");
        match inner.bookings.get_mut(&id) {
            Some(booking) if booking.status == from => {
                booking.status = to;
                booking.version += 1;
                if let Some(reference) = payment_ref {
                    booking.payment_ref = Some(reference.to_string());
                }
                booking.updated_at = Utc::now();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn record_event(
        &self,
        event: &PaymentEvent,
        booking_id: Uuid,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        let mut inner = self.inner.lock().expect("lock poisoned");
        if inner.events.contains_key(&event.event_id) {
            return Ok(false);
        }
        inner.events.insert(
            event.event_id.clone(),
            RecordedEvent {
                event: event.clone(),
                booking_id,
            },
        );
        Ok(true)
    }

    async fn find_event(
        &self,
        event_id: &str,
    ) -> Result<Option<RecordedEvent>, Box<dyn std::error::Error + Send + Sync>> {
        let inner = self.inner.lock().expect("lock poisoned");
        Ok(inner.events.get(event_id).cloned())
    }

    async fn blocked_ranges(
        &self,
        unit_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<(DateTime<Utc>, DateTime<Utc>)>, Box<dyn std::error::Error + Send + Sync>>
    {
        let inner = self.inner.lock().expect("lock poisoned");
        Ok(inner
            .bookings
            .values()
            .filter(|b| b.unit_id == unit_id && holds_slot(b.status) && overlaps(b, from, to))
            .map(|b| (b.starts_at, b.ends_at))
            .collect())
    }

    async fn list(
        &self,
        limit: i64,
        offset: i64,
        status: Option<BookingStatus>,
    ) -> Result<Vec<Booking>, Box<dyn std::error::Error + Send + Sync>> {
        let inner = self.inner.lock().expect("lock poisoned");
        let mut bookings: Vec<Booking> = inner
            .bookings
            .values()
            .filter(|b| status.map_or(true, |s| b.status == s))
            .cloned()
            .collect();
        bookings.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(bookings
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn set_notes(
        &self,
        id: Uuid,
        notes: &str,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        let mut inner = self.inner.lock().expect("lock poisoned");
        match inner.bookings.get_mut(&id) {
            Some(booking) => {
                booking.notes = Some(notes.to_string());
                booking.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn reschedule(
        &self,
        id: Uuid,
        starts_at: DateTime<Utc>,
        ends_at: DateTime<Utc>,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        let mut inner = self.inner.lock().expect("lock poisoned");
        let unit_id = match inner.bookings.get(&id) {
            Some(b) if b.status == BookingStatus::Pending => b.unit_id.clone(),
            _ => return Ok(false),
        };
        let conflict = inner.bookings.values().any(|b| {
            b.id != id
                && b.unit_id == unit_id
                && holds_slot(b.status)
                && overlaps(b, starts_at, ends_at)
        });
        if conflict {
            return Err("unit already booked for an overlapping range".into());
        }
        let booking = inner.bookings.get_mut(&id).expect("checked above");
        booking.starts_at = starts_at;
        booking.ends_at = ends_at;
        booking.updated_at = Utc::now();
        Ok(true)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        let mut inner = self.inner.lock().expect("lock poisoned");
        Ok(inner.bookings.remove(&id).is_some())
    }

    async fn analytics(
        &self,
    ) -> Result<Vec<UnitAnalytics>, Box<dyn std::error::Error + Send + Sync>> {
        let inner = self.inner.lock().expect("lock poisoned");
        let mut per_unit: HashMap<String, UnitAnalytics> = HashMap::new();
        for booking in inner.bookings.values() {
            let entry = per_unit
                .entry(booking.unit_id.clone())
                .or_insert_with(|| UnitAnalytics {
                    unit_id: booking.unit_id.clone(),
                    bookings: 0,
                    revenue_cents: 0,
                });
            entry.bookings += 1;
            if booking.status == BookingStatus::Confirmed {
                entry.revenue_cents += booking.amount_cents as i64;
            }
        }
        let mut rows: Vec<UnitAnalytics> = per_unit.into_values().collect();
        rows.sort_by(|a, b| a.unit_id.cmp(&b.unit_id));
        Ok(rows)
    }
}

#[async_trait]
impl UnitRepository for MemoryStore {
    async fn get_unit(
        &self,
        id: &str,
    ) -> Result<Option<Unit>, Box<dyn std::error::Error + Send + Sync>> {
        let inner = self.inner.lock().expect("lock poisoned");
        Ok(inner.units.get(id).cloned())
    }

    async fn list_units(&self) -> Result<Vec<Unit>, Box<dyn std::error::Error + Send + Sync>> {
        let inner = self.inner.lock().expect("lock poisoned");
        let mut units: Vec<Unit> = inner.units.values().cloned().collect();
        units.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(units)
    }

    async fn upsert_unit(
        &self,
        unit: &Unit,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let mut inner = self.inner.lock().expect("lock poisoned");
        inner.units.insert(unit.id.clone(), unit.clone());
        Ok(())
    }

    async fn addon_pricing(
        &self,
    ) -> Result<AddonPricing, Box<dyn std::error::Error + Send + Sync>> {
        let inner = self.inner.lock().expect("lock poisoned");
        Ok(inner.addon_pricing.clone())
    }

    async fn upsert_addon_pricing(
        &self,
        pricing: &AddonPricing,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let mut inner = self.inner.lock().expect("lock poisoned");
        inner.addon_pricing = pricing.clone();
        Ok(())
    }
}
