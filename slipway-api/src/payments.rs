use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use slipway_booking::pricing;
use slipway_core::booking::Addons;
use slipway_core::repository::UnitRepository;

use crate::error::{internal, AppError};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/payments/quote", post(quote))
        .route("/api/payments/config", get(payments_config))
}

#[derive(Debug, Deserialize)]
pub struct QuoteRequest {
    pub unit_id: String,
    #[serde(default)]
    pub addons: Addons,
}

#[derive(Debug, Serialize)]
pub struct QuoteResponse {
    pub currency: String,
    pub amount_cents: i32,
}

/// POST /api/payments/quote
/// Authoritative server-side price for a selection.
async fn quote(
    State(state): State<AppState>,
    Json(req): Json<QuoteRequest>,
) -> Result<Json<QuoteResponse>, AppError> {
    let unit = state
        .units
        .get_unit(&req.unit_id)
        .await
        .map_err(internal)?
        .ok_or_else(|| AppError::ValidationError(format!("unknown unit: {}", req.unit_id)))?;
    let addon_pricing = state.units.addon_pricing().await.map_err(internal)?;

    Ok(Json(QuoteResponse {
        currency: pricing::CURRENCY.to_string(),
        amount_cents: pricing::quote(&unit, &addon_pricing, &req.addons),
    }))
}

#[derive(Debug, Serialize)]
pub struct PaymentsConfigResponse {
    pub public_key: String,
    pub currency: String,
}

/// GET /api/payments/config
async fn payments_config(State(state): State<AppState>) -> Json<PaymentsConfigResponse> {
    Json(PaymentsConfigResponse {
        public_key: state.payments.public_key.clone(),
        currency: state.payments.currency.clone(),
    })
}
