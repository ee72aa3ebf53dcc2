//! Dashboard routes, one per role.

use axum::{extract::State, Json};
use chrono::Utc;

use crate::errors::{ApiResponse, AppError};
use crate::middleware::auth::CurrentUser;
use crate::middleware::rbac::{RequireAdmin, RequireTeacher};
use crate::models::achievement::Achievement;
use crate::services::achievement;
use crate::services::dashboard::{
    self, AdminDashboard, ProgressView, StudentDashboard, TeacherDashboard,
};
use crate::AppState;

/// GET /api/v1/dashboard/student
pub async fn student(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> Result<Json<ApiResponse<StudentDashboard>>, AppError> {
    let view = dashboard::student_dashboard(&state.db, current_user.id, Utc::now()).await?;
    Ok(ApiResponse::success(view))
}

/// GET /api/v1/dashboard/progress
pub async fn progress(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> Result<Json<ApiResponse<ProgressView>>, AppError> {
    let view = dashboard::progress_view(&state.db, current_user.id, Utc::now()).await?;
    Ok(ApiResponse::success(view))
}

/// GET /api/v1/dashboard/teacher (teacher+)
pub async fn teacher(
    State(state): State<AppState>,
    RequireTeacher(user): RequireTeacher,
) -> Result<Json<ApiResponse<TeacherDashboard>>, AppError> {
    let view = dashboard::teacher_dashboard(&state.db, user.id).await?;
    Ok(ApiResponse::success(view))
}

/// GET /api/v1/dashboard/admin (admin)
pub async fn admin(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<ApiResponse<AdminDashboard>>, AppError> {
    let view = dashboard::admin_dashboard(&state.db, Utc::now()).await?;
    Ok(ApiResponse::success(view))
}

/// GET /api/v1/achievements
pub async fn achievements(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> Result<Json<ApiResponse<Vec<Achievement>>>, AppError> {
    let list = achievement::fetch_for_user(&state.db, current_user.id).await?;
    Ok(ApiResponse::success(list))
}
