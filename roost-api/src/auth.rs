use crate::error::AppError;
use crate::state::AppState;
use axum::extract::FromRequestParts;
use axum::http::{header::AUTHORIZATION, request::Parts};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const ROLE_ADMIN: &str = "admin";

/// Bearer claims issued by the identity provider.
///
/// The core trusts this identity completely; token issuance happens
/// elsewhere. `sub` carries the employee id, `role` the coarse role used to
/// gate the admin surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub role: String,
    pub exp: usize,
}

impl Claims {
    pub fn employee_id(&self) -> Result<Uuid, AppError> {
        Uuid::parse_str(&self.sub)
            .map_err(|_| AppError::Unauthenticated("Invalid subject in token".to_string()))
    }

    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.role == ROLE_ADMIN {
            Ok(())
        } else {
            Err(AppError::Forbidden(
                "Administrator role required".to_string(),
            ))
        }
    }
}

impl FromRequestParts<AppState> for Claims {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::Unauthenticated("Missing bearer token".to_string()))?;

        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::Unauthenticated("Missing bearer token".to_string()))?;

        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(state.auth.secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|e| AppError::Unauthenticated(format!("Invalid token: {e}")))?;

        Ok(token_data.claims)
    }
}
