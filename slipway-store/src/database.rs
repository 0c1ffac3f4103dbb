use std::time::Duration;

use sqlx::postgres::{PgPool, PgPoolOptions};

use slipway_core::catalog::{default_units, AddonPricing};

use crate::app_config::DatabaseConfig;

pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(30))
        .connect(&config.url)
        .await
}

/// Create the schema if it does not exist yet.
///
/// The exclusion constraint on `bookings` is the atomic overlap guard: one
/// booking per unit per overlapping time range, restricted to slot-holding
/// statuses so cancelled and failed bookings free the range. The primary key
/// on `payment_events` enforces at-most-once event processing.
pub async fn init_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query("CREATE EXTENSION IF NOT EXISTS btree_gist")
        .execute(pool)
        .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS bookings (
            id UUID PRIMARY KEY,
            unit_id TEXT NOT NULL,
            starts_at TIMESTAMPTZ NOT NULL,
            ends_at TIMESTAMPTZ NOT NULL,
            full_name TEXT NOT NULL,
            email TEXT NOT NULL,
            phone TEXT NOT NULL,
            notes TEXT,
            addon_drone BOOLEAN NOT NULL DEFAULT FALSE,
            addon_gopro BOOLEAN NOT NULL DEFAULT FALSE,
            addon_wetsuit BOOLEAN NOT NULL DEFAULT FALSE,
            addon_boat BOOLEAN NOT NULL DEFAULT FALSE,
            addon_boat_count INT NOT NULL DEFAULT 1,
            addon_extra_people INT NOT NULL DEFAULT 0,
            passengers TEXT[] NOT NULL DEFAULT '{}',
            amount_cents INT NOT NULL,
            currency TEXT NOT NULL,
            status TEXT NOT NULL,
            payment_ref TEXT,
            version BIGINT NOT NULL DEFAULT 1,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            CONSTRAINT bookings_no_overlap EXCLUDE USING gist (
                unit_id WITH =,
                tstzrange(starts_at, ends_at) WITH &&
            ) WHERE (status IN ('PENDING', 'AWAITING_PAYMENT', 'CONFIRMED'))
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS payment_events (
            event_id TEXT PRIMARY KEY,
            booking_id UUID NOT NULL REFERENCES bookings (id) ON DELETE CASCADE,
            payment_ref TEXT NOT NULL,
            outcome TEXT NOT NULL,
            received_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS units (
            id TEXT PRIMARY KEY,
            label TEXT NOT NULL,
            price_cents INT NOT NULL,
            duration_minutes INT NOT NULL,
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS addon_pricing (
            key TEXT PRIMARY KEY,
            drone_cents INT NOT NULL,
            wetsuit_cents INT NOT NULL,
            boat_per_person_cents INT NOT NULL,
            extra_person_cents INT NOT NULL,
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_bookings_email ON bookings (email)")
        .execute(pool)
        .await?;
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_bookings_unit_start ON bookings (unit_id, starts_at)",
    )
    .execute(pool)
    .await?;
    sqlx::query(
        "CREATE UNIQUE INDEX IF NOT EXISTS uniq_bookings_payment_ref \
         ON bookings (payment_ref) WHERE payment_ref IS NOT NULL",
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Upsert the stock catalog and add-on prices.
pub async fn seed_catalog(pool: &PgPool) -> Result<(), sqlx::Error> {
    for unit in default_units() {
        sqlx::query(
            r#"
            INSERT INTO units (id, label, price_cents, duration_minutes, updated_at)
            VALUES ($1, $2, $3, $4, NOW())
            ON CONFLICT (id) DO UPDATE SET
                label = EXCLUDED.label,
                price_cents = EXCLUDED.price_cents,
                duration_minutes = EXCLUDED.duration_minutes,
                updated_at = NOW()
            "#,
        )
        .bind(&unit.id)
        .bind(&unit.label)
        .bind(unit.price_cents)
        .bind(unit.duration_minutes)
        .execute(pool)
        .await?;
    }

    let pricing = AddonPricing::default();
    sqlx::query(
        r#"
        INSERT INTO addon_pricing
            (key, drone_cents, wetsuit_cents, boat_per_person_cents, extra_person_cents, updated_at)
        VALUES ('addons', $1, $2, $3, $4, NOW())
        ON CONFLICT (key) DO NOTHING
        "#,
    )
    .bind(pricing.drone_cents)
    .bind(pricing.wetsuit_cents)
    .bind(pricing.boat_per_person_cents)
    .bind(pricing.extra_person_cents)
    .execute(pool)
    .await?;

    tracing::info!("catalog seeded");
    Ok(())
}
