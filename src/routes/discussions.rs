//! Discussion forum routes.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use uuid::Uuid;

use crate::errors::{ApiResponse, AppError};
use crate::middleware::auth::CurrentUser;
use crate::models::discussion::{CategoryCounts, CreateDiscussion, Discussion};
use crate::services::auth as auth_service;
use crate::services::discussion::{self as discussion_service, DiscussionFilters};
use crate::AppState;

/// GET /api/v1/discussions?category=&search=
pub async fn list(
    State(state): State<AppState>,
    _user: CurrentUser,
    Query(filters): Query<DiscussionFilters>,
) -> Result<Json<ApiResponse<Vec<Discussion>>>, AppError> {
    let threads = discussion_service::list(&state.db, &filters).await?;
    Ok(ApiResponse::success(threads))
}

/// POST /api/v1/discussions
pub async fn create(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(body): Json<CreateDiscussion>,
) -> Result<Json<ApiResponse<Discussion>>, AppError> {
    let author = auth_service::find_user_by_id(&state.db, current_user.id).await?;
    let thread = discussion_service::create(&state.db, &author, &body).await?;
    Ok(ApiResponse::success(thread))
}

/// GET /api/v1/discussions/categories
pub async fn categories(
    State(state): State<AppState>,
    _user: CurrentUser,
) -> Result<Json<ApiResponse<CategoryCounts>>, AppError> {
    let counts = discussion_service::category_counts(&state.db).await?;
    Ok(ApiResponse::success(counts))
}

/// POST /api/v1/discussions/{id}/like
pub async fn like(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Discussion>>, AppError> {
    let thread = discussion_service::like(&state.db, id).await?;
    Ok(ApiResponse::success(thread))
}
