//! Authentication routes: registration, login, refresh, logout, profile.

use axum::{body::Bytes, extract::State, Json};
use serde::Deserialize;

use crate::errors::{ApiResponse, AppError};
use crate::middleware::auth::CurrentUser;
use crate::middleware::rbac::RequireAdmin;
use crate::models::user::{CreateUser, RegisterUser, UserResponse, UserRole};
use crate::services::auth::{self as auth_service, TokenPair};
use crate::services::session;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Deserialize, Default)]
pub struct LogoutRequest {
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// POST /api/v1/auth/register: self-service student or teacher account.
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterUser>,
) -> Result<Json<ApiResponse<UserResponse>>, AppError> {
    if body.role == UserRole::Admin {
        return Err(AppError::Forbidden(
            "Admin accounts cannot be self-registered".to_string(),
        ));
    }
    let user = auth_service::create_user(&state.db, &CreateUser::from(body)).await?;
    Ok(ApiResponse::success(UserResponse::from(user)))
}

/// POST /api/v1/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<ApiResponse<TokenPair>>, AppError> {
    let tokens = auth_service::login(
        &state.db,
        &body.email,
        &body.password,
        &state.config.jwt_secret,
        state.config.jwt_access_token_expiry_secs,
        state.config.jwt_refresh_token_expiry_secs,
    )
    .await?;

    Ok(ApiResponse::success(tokens))
}

/// POST /api/v1/auth/refresh: issues a new pair and revokes the presented refresh token.
pub async fn refresh(
    State(state): State<AppState>,
    Json(body): Json<RefreshRequest>,
) -> Result<Json<ApiResponse<TokenPair>>, AppError> {
    let claims = auth_service::validate_token(&body.refresh_token, &state.config.jwt_secret)?;
    if session::is_revoked(&state.redis, &claims.jti).await? {
        return Err(AppError::Unauthorized);
    }

    let tokens = auth_service::refresh_token(
        &state.db,
        &claims,
        &state.config.jwt_secret,
        state.config.jwt_access_token_expiry_secs,
        state.config.jwt_refresh_token_expiry_secs,
    )
    .await?;

    session::revoke(&state.redis, &claims.jti, claims.remaining_secs()).await?;
    Ok(ApiResponse::success(tokens))
}

/// POST /api/v1/auth/logout: revoke the access token and, if sent, the refresh token.
pub async fn logout(
    State(state): State<AppState>,
    current_user: CurrentUser,
    body: Bytes,
) -> Result<Json<ApiResponse<&'static str>>, AppError> {
    let claims = &current_user.claims;
    session::revoke(&state.redis, &claims.jti, claims.remaining_secs()).await?;

    // The body is optional; an empty or unreadable one only skips the refresh revoke.
    let request: LogoutRequest = serde_json::from_slice(&body).unwrap_or_default();
    if let Some(token) = request.refresh_token {
        // A refresh token for another account is ignored rather than revoked.
        if let Ok(refresh) = auth_service::validate_token(&token, &state.config.jwt_secret) {
            if refresh.user_id == claims.user_id {
                session::revoke(&state.redis, &refresh.jti, refresh.remaining_secs()).await?;
            }
        }
    }

    tracing::info!(user_id = %current_user.id, "User logged out");
    Ok(ApiResponse::success("Logged out successfully"))
}

/// POST /api/v1/auth/users: admin-only user creation with any role.
pub async fn create_user(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Json(body): Json<CreateUser>,
) -> Result<Json<ApiResponse<UserResponse>>, AppError> {
    let user = auth_service::create_user(&state.db, &body).await?;
    Ok(ApiResponse::success(UserResponse::from(user)))
}

/// GET /api/v1/auth/me: current user profile
pub async fn me(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> Result<Json<ApiResponse<UserResponse>>, AppError> {
    let user = auth_service::find_user_by_id(&state.db, current_user.id).await?;
    Ok(ApiResponse::success(UserResponse::from(user)))
}
