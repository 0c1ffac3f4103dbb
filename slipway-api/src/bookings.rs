use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use slipway_core::booking::{Addons, Booking, BookingStatus, NewBooking};

use crate::error::AppError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/bookings", post(create_booking))
        .route("/api/bookings/{id}", get(get_booking))
        .route("/api/bookings/{id}/payment", post(initiate_payment))
        .route("/api/bookings/{id}/cancel", post(cancel_booking))
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateBookingRequest {
    pub unit_id: String,
    pub starts_at: DateTime<Utc>,
    pub ends_at: Option<DateTime<Utc>>,
    #[validate(length(min = 2, max = 200))]
    pub full_name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 3, max = 50))]
    pub phone: String,
    #[validate(length(max = 4000))]
    pub notes: Option<String>,
    #[serde(default)]
    pub addons: Addons,
    #[serde(default)]
    pub passengers: Vec<String>,
}

impl CreateBookingRequest {
    fn into_new_booking(self) -> NewBooking {
        NewBooking {
            unit_id: self.unit_id,
            starts_at: self.starts_at,
            ends_at: self.ends_at,
            full_name: self.full_name,
            email: self.email,
            phone: self.phone,
            notes: self.notes,
            addons: self.addons,
            passengers: self.passengers,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CreateBookingResponse {
    pub id: Uuid,
    pub status: BookingStatus,
    pub amount_cents: i32,
    pub currency: String,
}

#[derive(Debug, Serialize)]
pub struct PaymentInitiatedResponse {
    pub id: Uuid,
    pub status: BookingStatus,
    pub payment_ref: String,
    pub redirect_url: Option<String>,
}

/// POST /api/bookings
async fn create_booking(
    State(state): State<AppState>,
    Json(req): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<CreateBookingResponse>), AppError> {
    req.validate()
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    let booking = state.coordinator.create_booking(req.into_new_booking()).await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateBookingResponse {
            id: booking.id,
            status: booking.status,
            amount_cents: booking.amount_cents,
            currency: booking.currency,
        }),
    ))
}

/// GET /api/bookings/{id}
async fn get_booking(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Booking>, AppError> {
    let booking = state.coordinator.get_booking(id).await?;
    Ok(Json(booking))
}

/// POST /api/bookings/{id}/payment
/// Open a checkout session and move the booking to AWAITING_PAYMENT.
async fn initiate_payment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<PaymentInitiatedResponse>, AppError> {
    let (booking, session) = state.coordinator.initiate_payment(id).await?;
    Ok(Json(PaymentInitiatedResponse {
        id: booking.id,
        status: booking.status,
        payment_ref: session.reference,
        redirect_url: session.redirect_url,
    }))
}

/// POST /api/bookings/{id}/cancel
async fn cancel_booking(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Booking>, AppError> {
    let booking = state.coordinator.cancel_booking(id).await?;
    Ok(Json(booking))
}
