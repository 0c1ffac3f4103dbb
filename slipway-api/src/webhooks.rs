use axum::{extract::State, routing::post, Json, Router};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};

use slipway_core::payment::{PaymentEvent, PaymentOutcome};

use crate::error::AppError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/api/payments/webhook", post(handle_gateway_webhook))
}

#[derive(Debug, Deserialize)]
pub struct GatewayWebhook {
    pub id: String,
    #[serde(rename = "type")]
    pub type_: String,
    pub payload: WebhookPayload,
}

#[derive(Debug, Deserialize)]
pub struct WebhookPayload {
    pub reference: String,
    pub status: String,
}

/// POST /api/payments/webhook
/// Receive payment status updates from the gateway. Duplicate and late
/// deliveries are absorbed with a 200; the gateway retries anything else.
async fn handle_gateway_webhook(
    State(state): State<AppState>,
    Json(webhook): Json<GatewayWebhook>,
) -> Result<Json<Value>, AppError> {
    tracing::info!(
        "Received webhook: {} for checkout {}",
        webhook.type_,
        webhook.payload.reference
    );

    let outcome = match webhook.payload.status.to_lowercase().as_str() {
        "succeeded" | "successful" | "completed" | "approved" => PaymentOutcome::Succeeded,
        "failed" => PaymentOutcome::Failed,
        "cancelled" | "canceled" => PaymentOutcome::Cancelled,
        other => {
            tracing::info!(status = other, "ignoring webhook with unhandled status");
            return Ok(Json(json!({ "ok": true, "ignored": true })));
        }
    };

    let event = PaymentEvent {
        event_id: webhook.id,
        payment_ref: webhook.payload.reference,
        outcome,
        received_at: Utc::now(),
    };

    let disposition = state.coordinator.handle_payment_event(&event).await?;

    Ok(Json(json!({
        "ok": true,
        "status": disposition.status(),
    })))
}
