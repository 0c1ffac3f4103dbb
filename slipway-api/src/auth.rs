use axum_extra::headers::{authorization::Bearer, Authorization};
use axum_extra::TypedHeader;
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub role: String,
    pub exp: usize,
}

pub fn issue_admin_token(subject: &str, state: &AppState) -> Result<String, AppError> {
    let exp = (Utc::now() + chrono::Duration::seconds(state.auth.expiration as i64)).timestamp();
    let claims = Claims {
        sub: subject.to_string(),
        role: "admin".to_string(),
        exp: exp as usize,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(state.auth.secret.as_bytes()),
    )
    .map_err(|e| AppError::InternalServerError(e.to_string()))
}

/// Verify the bearer token on an admin route and return the subject.
pub fn require_admin(
    state: &AppState,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
) -> Result<String, AppError> {
    let TypedHeader(Authorization(bearer)) = bearer.ok_or_else(|| {
        AppError::AuthenticationError("Missing or invalid Authorization header".to_string())
    })?;

    let token_data = decode::<Claims>(
        bearer.token(),
        &DecodingKey::from_secret(state.auth.secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| AppError::AuthenticationError(e.to_string()))?;

    let claims = token_data.claims;
    if claims.role != "admin" {
        return Err(AppError::AuthenticationError("admin role required".into()));
    }
    let expected = state.admin.email.as_deref().unwrap_or("admin");
    if claims.sub != expected {
        return Err(AppError::AuthenticationError("invalid subject".into()));
    }
    Ok(claims.sub)
}
