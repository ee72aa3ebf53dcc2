//! JWT authentication extractor for Axum handlers.

use axum::{extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::user::UserRole;
use crate::services::auth::{self as auth_service, Claims};
use crate::services::session;
use crate::AppState;

/// Authenticated user extracted from a JWT Bearer token.
///
/// Every aggregation and data-access call takes the user id explicitly;
/// handlers get it from here.
/// ```ignore
/// async fn handler(current_user: CurrentUser) -> impl IntoResponse { ... }
/// ```
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: Uuid,
    pub email: String,
    pub role: UserRole,
    pub claims: Claims,
}

impl CurrentUser {
    pub fn is_teacher_or_admin(&self) -> bool {
        matches!(self.role, UserRole::Teacher | UserRole::Admin)
    }
}

/// Pull the token out of `Authorization: Bearer <token>`.
pub fn bearer_token(parts: &Parts) -> Result<&str, AppError> {
    parts
        .headers
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(AppError::Unauthorized)
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;
        let claims = auth_service::validate_token(token, &state.config.jwt_secret)?;

        if claims.token_type != "access" {
            return Err(AppError::Unauthorized);
        }

        if session::is_revoked(&state.redis, &claims.jti).await? {
            tracing::debug!(jti = %claims.jti, "Rejected revoked token");
            return Err(AppError::Unauthorized);
        }

        let id: Uuid = claims
            .user_id
            .parse()
            .map_err(|_| AppError::Unauthorized)?;

        let role = UserRole::parse(&claims.role)
            .ok_or_else(|| AppError::Internal(format!("Invalid role in token: {}", claims.role)))?;

        Ok(CurrentUser {
            id,
            email: claims.sub.clone(),
            role,
            claims,
        })
    }
}
