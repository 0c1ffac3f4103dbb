use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use slipway_booking::schedule::{available_starts, format_minutes};
use slipway_core::catalog::Unit;
use slipway_core::repository::{BookingRepository, UnitRepository};

use crate::error::{internal, AppError};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/timeslots", get(timeslots))
        .route("/api/units", get(list_units))
}

#[derive(Debug, Deserialize)]
pub struct TimeslotQuery {
    pub unit_id: String,
    pub date: String,
}

#[derive(Debug, Serialize)]
pub struct TimeslotResponse {
    pub unit_id: String,
    pub date: String,
    pub times: Vec<String>,
}

/// GET /api/timeslots?unit_id=..&date=YYYY-MM-DD
/// Start times still available for a unit on a given day.
async fn timeslots(
    State(state): State<AppState>,
    Query(query): Query<TimeslotQuery>,
) -> Result<Json<TimeslotResponse>, AppError> {
    let date = NaiveDate::parse_from_str(&query.date, "%Y-%m-%d").map_err(|_| {
        AppError::ValidationError("invalid date format, expected YYYY-MM-DD".to_string())
    })?;
    let unit = state
        .units
        .get_unit(&query.unit_id)
        .await
        .map_err(internal)?
        .ok_or_else(|| AppError::NotFoundError(format!("unit {}", query.unit_id)))?;

    let day_start = date.and_time(NaiveTime::MIN).and_utc();
    let day_end = day_start + Duration::days(1);

    let blocked: Vec<(u32, u32)> = state
        .bookings
        .blocked_ranges(&unit.id, day_start, day_end)
        .await
        .map_err(internal)?
        .into_iter()
        .map(|(start, end)| (minutes_into_day(day_start, start), minutes_into_day(day_start, end)))
        .collect();

    let times = available_starts(&state.schedule, unit.duration_minutes as u32, &blocked)
        .into_iter()
        .map(format_minutes)
        .collect();

    Ok(Json(TimeslotResponse {
        unit_id: unit.id,
        date: query.date,
        times,
    }))
}

fn minutes_into_day(day_start: DateTime<Utc>, t: DateTime<Utc>) -> u32 {
    (t - day_start).num_minutes().clamp(0, 24 * 60) as u32
}

/// GET /api/units
async fn list_units(State(state): State<AppState>) -> Result<Json<Vec<Unit>>, AppError> {
    let units = state.units.list_units().await.map_err(internal)?;
    Ok(Json(units))
}
