use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use slipway_booking::BookingError;

#[derive(Debug)]
pub enum AppError {
    AuthenticationError(String),
    ValidationError(String),
    NotFoundError(String),
    ConflictError(String),
    InvalidStateError(String),
    GatewayError(String),
    InternalServerError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::AuthenticationError(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFoundError(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::ConflictError(msg) => (StatusCode::CONFLICT, msg),
            AppError::InvalidStateError(msg) => (StatusCode::CONFLICT, msg),
            AppError::GatewayError(msg) => {
                tracing::error!("Payment gateway error: {}", msg);
                // Retryable by the caller.
                let body = Json(json!({ "error": msg }));
                return (StatusCode::BAD_GATEWAY, [(header::RETRY_AFTER, "5")], body)
                    .into_response();
            }
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

impl From<BookingError> for AppError {
    fn from(err: BookingError) -> Self {
        match err {
            BookingError::Validation(msg) => AppError::ValidationError(msg),
            BookingError::Conflict(msg) => AppError::ConflictError(msg),
            BookingError::NotFound(msg) => AppError::NotFoundError(msg),
            BookingError::InvalidState { .. } => AppError::InvalidStateError(err.to_string()),
            BookingError::Gateway(inner) => AppError::GatewayError(inner.to_string()),
            BookingError::Storage(msg) => AppError::InternalServerError(msg),
        }
    }
}

/// Repository failures surfacing outside the coordinator.
pub fn internal(err: Box<dyn std::error::Error + Send + Sync>) -> AppError {
    AppError::InternalServerError(err.to_string())
}
