use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use slipway_core::notify::MailError;

use crate::error::AppError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/api/contact", post(contact))
}

#[derive(Debug, Deserialize, Validate)]
pub struct ContactRequest {
    #[validate(length(min = 2, max = 200))]
    pub full_name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 3, max = 50))]
    pub phone: String,
    #[validate(length(min = 2, max = 4000))]
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ContactResponse {
    pub ok: bool,
    pub id: Uuid,
}

/// POST /api/contact
/// Relay a contact-form message to the admin inbox.
async fn contact(
    State(state): State<AppState>,
    Json(req): Json<ContactRequest>,
) -> Result<Json<ContactResponse>, AppError> {
    req.validate()
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    state
        .dispatcher
        .send_contact(&req.full_name, &req.email, &req.phone, &req.message)
        .await
        .map_err(|err| match err {
            MailError::NotConfigured => {
                AppError::InternalServerError("mail recipient not configured".to_string())
            }
            other => AppError::InternalServerError(format!("email send failed: {}", other)),
        })?;

    Ok(Json(ContactResponse {
        ok: true,
        id: Uuid::new_v4(),
    }))
}
