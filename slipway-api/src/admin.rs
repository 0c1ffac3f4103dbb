use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use axum_extra::headers::{authorization::Bearer, Authorization};
use axum_extra::TypedHeader;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use slipway_core::booking::{Booking, BookingStatus};
use slipway_core::repository::{BookingRepository, UnitAnalytics};

use crate::auth::{issue_admin_token, require_admin};
use crate::error::{internal, AppError};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/admin/login", post(login))
        .route("/api/admin/bookings", get(list_bookings))
        .route(
            "/api/admin/bookings/{id}",
            get(get_booking).patch(update_booking).delete(delete_booking),
        )
        .route("/api/admin/analytics/summary", get(analytics_summary))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub token_type: String,
}

/// POST /api/admin/login
async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let (email, password) = match (&state.admin.email, &state.admin.password) {
        (Some(email), Some(password)) => (email, password),
        _ => {
            return Err(AppError::InternalServerError(
                "Admin credentials not configured".to_string(),
            ))
        }
    };
    if &req.email != email || &req.password != password {
        return Err(AppError::AuthenticationError("Invalid credentials".into()));
    }

    let token = issue_admin_token(email, &state)?;
    Ok(Json(LoginResponse {
        token,
        token_type: "bearer".to_string(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub skip: i64,
    pub status: Option<String>,
}

fn default_limit() -> i64 {
    100
}

/// GET /api/admin/bookings
async fn list_bookings(
    State(state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Booking>>, AppError> {
    require_admin(&state, bearer)?;

    let status = query
        .status
        .as_deref()
        .map(|s| {
            BookingStatus::from_str(s)
                .ok_or_else(|| AppError::ValidationError(format!("unknown status: {}", s)))
        })
        .transpose()?;

    let bookings = state
        .bookings
        .list(query.limit, query.skip, status)
        .await
        .map_err(internal)?;
    Ok(Json(bookings))
}

/// GET /api/admin/bookings/{id}
async fn get_booking(
    State(state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Booking>, AppError> {
    require_admin(&state, bearer)?;

    let booking = state
        .bookings
        .get(id)
        .await
        .map_err(internal)?
        .ok_or_else(|| AppError::NotFoundError("Booking not found".to_string()))?;
    Ok(Json(booking))
}

#[derive(Debug, Deserialize)]
pub struct BookingPatch {
    pub status: Option<String>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    /// When present, the customer is e-mailed a status-update message.
    pub message: Option<String>,
}

/// PATCH /api/admin/bookings/{id}
///
/// Status changes only move along legal state-machine edges, and the time
/// range is immutable once payment has been initiated.
async fn update_booking(
    State(state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    Path(id): Path<Uuid>,
    Json(patch): Json<BookingPatch>,
) -> Result<Json<Booking>, AppError> {
    require_admin(&state, bearer)?;

    let booking = state
        .bookings
        .get(id)
        .await
        .map_err(internal)?
        .ok_or_else(|| AppError::NotFoundError("Booking not found".to_string()))?;

    if let Some(target) = patch.status.as_deref() {
        let target = BookingStatus::from_str(target)
            .ok_or_else(|| AppError::ValidationError(format!("unknown status: {}", target)))?;
        if !booking.status.can_transition_to(target) {
            return Err(AppError::InvalidStateError(format!(
                "cannot move booking from {} to {}",
                booking.status, target
            )));
        }
        let moved = state
            .bookings
            .transition(id, booking.status, target, None)
            .await
            .map_err(internal)?;
        if !moved {
            return Err(AppError::ConflictError(
                "booking was updated concurrently".to_string(),
            ));
        }
    }

    if let Some(starts_at) = patch.starts_at {
        let ends_at = patch
            .ends_at
            .unwrap_or(starts_at + (booking.ends_at - booking.starts_at));
        if ends_at <= starts_at {
            return Err(AppError::ValidationError(
                "booking must end after it starts".to_string(),
            ));
        }
        let moved = state
            .bookings
            .reschedule(id, starts_at, ends_at)
            .await
            .map_err(|e| AppError::ConflictError(e.to_string()))?;
        if !moved {
            return Err(AppError::InvalidStateError(
                "time range is immutable once payment has been initiated".to_string(),
            ));
        }
    }

    if let Some(notes) = patch.notes.as_deref() {
        state.bookings.set_notes(id, notes).await.map_err(internal)?;
    }

    let updated = state
        .bookings
        .get(id)
        .await
        .map_err(internal)?
        .ok_or_else(|| AppError::NotFoundError("Booking not found".to_string()))?;

    if let Some(message) = patch.message.as_deref() {
        state.dispatcher.send_status_update(&updated, message);
    }

    Ok(Json(updated))
}

/// DELETE /api/admin/bookings/{id}
async fn delete_booking(
    State(state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    require_admin(&state, bearer)?;

    let deleted = state.bookings.delete(id).await.map_err(internal)?;
    if !deleted {
        return Err(AppError::NotFoundError("Booking not found".to_string()));
    }
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Serialize)]
pub struct AnalyticsSummaryResponse {
    pub total_bookings: i64,
    pub total_revenue_cents: i64,
    pub units: Vec<UnitAnalytics>,
}

/// GET /api/admin/analytics/summary
async fn analytics_summary(
    State(state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
) -> Result<Json<AnalyticsSummaryResponse>, AppError> {
    require_admin(&state, bearer)?;

    let units = state.bookings.analytics().await.map_err(internal)?;
    let total_bookings = units.iter().map(|u| u.bookings).sum();
    let total_revenue_cents = units.iter().map(|u| u.revenue_cents).sum();

    Ok(Json(AnalyticsSummaryResponse {
        total_bookings,
        total_revenue_cents,
        units,
    }))
}
