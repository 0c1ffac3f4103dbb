use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A rentable jet-ski product (ride).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Unit {
    pub id: String,
    pub label: String,
    pub price_cents: i32,
    pub duration_minutes: i32,
    pub updated_at: DateTime<Utc>,
}

/// Add-on prices, stored as a single configuration row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddonPricing {
    pub drone_cents: i32,
    pub wetsuit_cents: i32,
    pub boat_per_person_cents: i32,
    pub extra_person_cents: i32,
}

impl Default for AddonPricing {
    fn default() -> Self {
        Self {
            drone_cents: 70_000,
            wetsuit_cents: 15_000,
            boat_per_person_cents: 45_000,
            extra_person_cents: 35_000,
        }
    }
}

/// The stock rental catalog, upserted into the store at startup.
pub fn default_units() -> Vec<Unit> {
    const STOCK: &[(&str, &str, i32, i32)] = &[
        ("30-1", "30-min Rental (1 Jet-Ski)", 175_000, 30),
        ("60-1", "60-min Rental (1 Jet-Ski)", 260_000, 60),
        ("30-2", "30-min Rental (2 Jet-Skis)", 310_000, 30),
        ("60-2", "60-min Rental (2 Jet-Skis)", 480_000, 60),
        ("30-3", "30-min Rental (3 Jet-Skis)", 450_000, 30),
        ("60-3", "60-min Rental (3 Jet-Skis)", 690_000, 60),
        ("30-4", "30-min Rental (4 Jet-Skis)", 580_000, 30),
        ("60-4", "60-min Rental (4 Jet-Skis)", 900_000, 60),
        ("30-5", "30-min Rental (5 Jet-Skis)", 710_000, 30),
        ("60-5", "60-min Rental (5 Jet-Skis)", 1_100_000, 60),
        ("joy", "Joy Ride (Instructed), 10 min", 70_000, 10),
        ("group", "Group Session, 2 hr 30 min", 750_000, 150),
    ];

    STOCK
        .iter()
        .map(|&(id, label, price_cents, duration_minutes)| Unit {
            id: id.to_string(),
            label: label.to_string(),
            price_cents,
            duration_minutes,
            updated_at: Utc::now(),
        })
        .collect()
}
