use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use slipway_core::catalog::{AddonPricing, Unit};
use slipway_core::repository::UnitRepository;

pub struct PgUnitRepository {
    pool: PgPool,
}

impl PgUnitRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct UnitRow {
    id: String,
    label: String,
    price_cents: i32,
    duration_minutes: i32,
    updated_at: DateTime<Utc>,
}

impl From<UnitRow> for Unit {
    fn from(row: UnitRow) -> Self {
        Unit {
            id: row.id,
            label: row.label,
            price_cents: row.price_cents,
            duration_minutes: row.duration_minutes,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl UnitRepository for PgUnitRepository {
    async fn get_unit(
        &self,
        id: &str,
    ) -> Result<Option<Unit>, Box<dyn std::error::Error + Send + Sync>> {
        let row = sqlx::query_as::<_, UnitRow>(
            "SELECT id, label, price_cents, duration_minutes, updated_at FROM units WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Unit::from))
    }

    async fn list_units(&self) -> Result<Vec<Unit>, Box<dyn std::error::Error + Send + Sync>> {
        let rows = sqlx::query_as::<_, UnitRow>(
            "SELECT id, label, price_cents, duration_minutes, updated_at FROM units ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Unit::from).collect())
    }

    async fn upsert_unit(
        &self,
        unit: &Unit,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
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
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn addon_pricing(
        &self,
    ) -> Result<AddonPricing, Box<dyn std::error::Error + Send + Sync>> {
        let row = sqlx::query_as::<_, (i32, i32, i32, i32)>(
            "SELECT drone_cents, wetsuit_cents, boat_per_person_cents, extra_person_cents \
             FROM addon_pricing WHERE key = 'addons'",
        )
        .fetch_optional(&self.pool)
        .await?;

        Ok(row
            .map(
                |(drone_cents, wetsuit_cents, boat_per_person_cents, extra_person_cents)| {
                    AddonPricing {
                        drone_cents,
                        wetsuit_cents,
                        boat_per_person_cents,
                        extra_person_cents,
                    }
                },
            )
            .unwrap_or_default())
    }

    async fn upsert_addon_pricing(
        &self,
        pricing: &AddonPricing,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        sqlx::query(
            r#"
            INSERT INTO addon_pricing
                (key, drone_cents, wetsuit_cents, boat_per_person_cents, extra_person_cents,
                 updated_at)
            VALUES ('addons', $1, $2, $3, $4, NOW())
            ON CONFLICT (key) DO UPDATE SET
                drone_cents = EXCLUDED.drone_cents,
                wetsuit_cents = EXCLUDED.wetsuit_cents,
                boat_per_person_cents = EXCLUDED.boat_per_person_cents,
                extra_person_cents = EXCLUDED.extra_person_cents,
                updated_at = NOW()
            "#,
        )
        .bind(pricing.drone_cents)
        .bind(pricing.wetsuit_cents)
        .bind(pricing.boat_per_person_cents)
        .bind(pricing.extra_person_cents)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
