use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use slipway_core::booking::{Addons, Booking, BookingStatus};
use slipway_core::payment::{PaymentEvent, PaymentOutcome};
use slipway_core::repository::{BookingRepository, RecordedEvent, UnitAnalytics};

pub struct PgBookingRepository {
    pool: PgPool,
}

impl PgBookingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const BOOKING_COLUMNS: &str = "id, unit_id, starts_at, ends_at, full_name, email, phone, notes, \
     addon_drone, addon_gopro, addon_wetsuit, addon_boat, addon_boat_count, addon_extra_people, \
     passengers, amount_cents, currency, status, payment_ref, version, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct BookingRow {
    id: Uuid,
    unit_id: String,
    starts_at: DateTime<Utc>,
    ends_at: DateTime<Utc>,
    full_name: String,
    email: String,
    phone: String,
    notes: Option<String>,
    addon_drone: bool,
    addon_gopro: bool,
    addon_wetsuit: bool,
    addon_boat: bool,
    addon_boat_count: i32,
    addon_extra_people: i32,
    passengers: Vec<String>,
    amount_cents: i32,
    currency: String,
    status: String,
    payment_ref: Option<String>,
    version: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl BookingRow {
    fn into_booking(self) -> Result<Booking, Box<dyn std::error::Error + Send + Sync>> {
        let status = BookingStatus::from_str(&self.status)
            .ok_or_else(|| format!("unknown booking status in store: {}", self.status))?;
        Ok(Booking {
            id: self.id,
            unit_id: self.unit_id,
            starts_at: self.starts_at,
            ends_at: self.ends_at,
            full_name: self.full_name,
            email: self.email,
            phone: self.phone,
            notes: self.notes,
            addons: Addons {
                drone: self.addon_drone,
                gopro: self.addon_gopro,
                wetsuit: self.addon_wetsuit,
                boat: self.addon_boat,
                boat_count: self.addon_boat_count,
                extra_people: self.addon_extra_people,
            },
            passengers: self.passengers,
            amount_cents: self.amount_cents,
            currency: self.currency,
            status,
            payment_ref: self.payment_ref,
            version: self.version,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Exclusion (23P01) and unique (23505) violations are slot conflicts, not
/// infrastructure failures.
fn is_conflict(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .and_then(|db| db.code())
        .map(|code| code == "23P01" || code == "23505")
        .unwrap_or(false)
}

#[async_trait]
impl BookingRepository for PgBookingRepository {
    async fn insert(
        &self,
        booking: &Booking,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        let result = sqlx::query(
            r#"
            INSERT INTO bookings (id, unit_id, starts_at, ends_at, full_name, email, phone, notes,
                addon_drone, addon_gopro, addon_wetsuit, addon_boat, addon_boat_count,
                addon_extra_people, passengers, amount_cents, currency, status, payment_ref,
                version, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17,
                $18, $19, $20, $21, $22)
            "#,
        )
        .bind(booking.id)
        .bind(&booking.unit_id)
        .bind(booking.starts_at)
        .bind(booking.ends_at)
        .bind(&booking.full_name)
        .bind(&booking.email)
        .bind(&booking.phone)
        .bind(&booking.notes)
        .bind(booking.addons.drone)
        .bind(booking.addons.gopro)
        .bind(booking.addons.wetsuit)
        .bind(booking.addons.boat)
        .bind(booking.addons.boat_count)
        .bind(booking.addons.extra_people)
        .bind(&booking.passengers)
        .bind(booking.amount_cents)
        .bind(&booking.currency)
        .bind(booking.status.as_str())
        .bind(&booking.payment_ref)
        .bind(booking.version)
        .bind(booking.created_at)
        .bind(booking.updated_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(true),
            Err(err) if is_conflict(&err) => Ok(false),
            Err(err) => Err(err.into()),
        }
    }

    async fn get(
        &self,
        id: Uuid,
    ) -> Result<Option<Booking>, Box<dyn std::error::Error + Send + Sync>> {
        let sql = format!("SELECT {} FROM bookings WHERE id = $1", BOOKING_COLUMNS);
        let row = sqlx::query_as::<_, BookingRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(BookingRow::into_booking).transpose()
    }

    async fn find_by_payment_ref(
        &self,
        payment_ref: &str,
    ) -> Result<Option<Booking>, Box<dyn std::error::Error + Send + Sync>> {
        let sql = format!(
            "SELECT {} FROM bookings WHERE payment_ref = $1",
            BOOKING_COLUMNS
        );
        let row = sqlx::query_as::<_, BookingRow>(&sql)
            .bind(payment_ref)
            .fetch_optional(&self.pool)
            .await?;

        row.map(BookingRow::into_booking).transpose()
    }

    async fn transition(
        &self,
        id: Uuid,
        from: BookingStatus,
        to: BookingStatus,
        payment_ref: Option<&str>,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        let result = sqlx::query(
            r#"
            UPDATE bookings
            SET status = $1,
                payment_ref = COALESCE($2, payment_ref),
                version = version + 1,
                updated_at = NOW()
            WHERE id = $3 AND status = $4
            "#,
        )
        .bind(to.as_str())
        .bind(payment_ref)
        .bind(id)
        .bind(from.as_str())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn record_event(
        &self,
        event: &PaymentEvent,
        booking_id: Uuid,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        let result = sqlx::query(
            r#"
            INSERT INTO payment_events (event_id, booking_id, payment_ref, outcome, received_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (event_id) DO NOTHING
            "#,
        )
        .bind(&event.event_id)
        .bind(booking_id)
        .bind(&event.payment_ref)
        .bind(event.outcome.as_str())
        .bind(event.received_at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn find_event(
        &self,
        event_id: &str,
    ) -> Result<Option<RecordedEvent>, Box<dyn std::error::Error + Send + Sync>> {
        let row = sqlx::query_as::<_, (String, Uuid, String, String, DateTime<Utc>)>(
            "SELECT event_id, booking_id, payment_ref, outcome, received_at \
             FROM payment_events WHERE event_id = $1",
        )
        .bind(event_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            None => Ok(None),
            Some((event_id, booking_id, payment_ref, outcome, received_at)) => {
                let outcome = PaymentOutcome::from_str(&outcome)
                    .ok_or_else(|| format!("unknown payment outcome in store: {}", outcome))?;
                Ok(Some(RecordedEvent {
                    event: PaymentEvent {
                        event_id,
                        payment_ref,
                        outcome,
                        received_at,
                    },
                    booking_id,
                }))
            }
        }
    }

    async fn blocked_ranges(
        &self,
        unit_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<(DateTime<Utc>, DateTime<Utc>)>, Box<dyn std::error::Error + Send + Sync>>
    {
        let rows = sqlx::query_as::<_, (DateTime<Utc>, DateTime<Utc>)>(
            r#"
            SELECT starts_at, ends_at FROM bookings
            WHERE unit_id = $1
              AND status IN ('PENDING', 'AWAITING_PAYMENT', 'CONFIRMED')
              AND starts_at < $3 AND ends_at > $2
            "#,
        )
        .bind(unit_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn list(
        &self,
        limit: i64,
        offset: i64,
        status: Option<BookingStatus>,
    ) -> Result<Vec<Booking>, Box<dyn std::error::Error + Send + Sync>> {
        let sql = format!(
            "SELECT {} FROM bookings \
             WHERE ($1::TEXT IS NULL OR status = $1) \
             ORDER BY created_at DESC LIMIT $2 OFFSET $3",
            BOOKING_COLUMNS
        );
        let rows = sqlx::query_as::<_, BookingRow>(&sql)
            .bind(status.map(|s| s.as_str()))
            .bind(limit.max(1))
            .bind(offset.max(0))
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(BookingRow::into_booking).collect()
    }

    async fn set_notes(
        &self,
        id: Uuid,
        notes: &str,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        let result = sqlx::query("UPDATE bookings SET notes = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(notes)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn reschedule(
        &self,
        id: Uuid,
        starts_at: DateTime<Utc>,
        ends_at: DateTime<Utc>,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        let result = sqlx::query(
            r#"
            UPDATE bookings SET starts_at = $2, ends_at = $3, updated_at = NOW()
            WHERE id = $1 AND status = 'PENDING'
            "#,
        )
        .bind(id)
        .bind(starts_at)
        .bind(ends_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(done) => Ok(done.rows_affected() == 1),
            Err(err) if is_conflict(&err) => {
                Err("unit already booked for an overlapping range".into())
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        let result = sqlx::query("DELETE FROM bookings WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn analytics(
        &self,
    ) -> Result<Vec<UnitAnalytics>, Box<dyn std::error::Error + Send + Sync>> {
        let rows = sqlx::query_as::<_, (String, i64, i64)>(
            r#"
            SELECT unit_id,
                   COUNT(*) AS bookings,
                   COALESCE(SUM(amount_cents) FILTER (WHERE status = 'CONFIRMED'), 0)::BIGINT
                       AS revenue_cents
            FROM bookings
            GROUP BY unit_id
            ORDER BY unit_id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(unit_id, bookings, revenue_cents)| UnitAnalytics {
                unit_id,
                bookings,
                revenue_cents,
            })
            .collect())
    }
}
