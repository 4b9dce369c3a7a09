use axum::{extract::FromRequestParts, http::header};
use jsonwebtoken::{DecodingKey, Validation, decode};

use crate::{dto::auth::Claims, error::AppError, state::AppState};

/// The signed-in shop user, taken from a `Bearer` JWT.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: String,
    pub email: String,
}

pub fn decode_token(token: &str, secret: &str) -> Result<AuthUser, AppError> {
    let decoded = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| AppError::Unauthorized)?;

    if decoded.claims.sub.is_empty() {
        return Err(AppError::Unauthorized);
    }

    Ok(AuthUser {
        user_id: decoded.claims.sub,
        email: decoded.claims.email,
    })
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .ok_or(AppError::Unauthorized)?;

        let auth_str = auth_header
            .to_str()
            .map_err(|_| AppError::Unauthorized)?;

        let token = auth_str
            .strip_prefix("Bearer ")
            .map(str::trim)
            .ok_or(AppError::Unauthorized)?;

        decode_token(token, &state.jwt_secret)
    }
}
