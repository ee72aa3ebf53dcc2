//! Assignment, submission and grading routes.

use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use crate::errors::{ApiResponse, AppError};
use crate::middleware::auth::CurrentUser;
use crate::middleware::rbac::{RequireAdmin, RequireTeacher};
use crate::models::assignment::{
    Assignment, AssignmentCounts, AssignmentWithStatus, CreateAssignment, CreateSubmission,
    GradeSubmission, Submission,
};
use crate::routes::courses::read_upload;
use crate::services::aggregator;
use crate::services::assignment as assignment_service;
use crate::services::import::{self, ImportResult};
use crate::AppState;

/// The caller's assignment list with tab counts.
#[derive(Debug, Serialize)]
pub struct AssignmentBoard {
    pub assignments: Vec<AssignmentWithStatus>,
    pub counts: AssignmentCounts,
}

/// GET /api/v1/assignments: every assignment merged with the caller's status.
pub async fn list(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> Result<Json<ApiResponse<AssignmentBoard>>, AppError> {
    let (assignments, submissions) = tokio::try_join!(
        assignment_service::fetch_assignments(&state.db),
        assignment_service::fetch_submissions(&state.db, current_user.id),
    )?;

    let merged =
        aggregator::merge_assignment_status(current_user.id, &assignments, &submissions, Utc::now());
    let counts = aggregator::assignment_counts(&merged);

    Ok(ApiResponse::success(AssignmentBoard {
        assignments: merged,
        counts,
    }))
}

/// POST /api/v1/assignments (teacher+)
pub async fn create(
    State(state): State<AppState>,
    RequireTeacher(_teacher): RequireTeacher,
    Json(body): Json<CreateAssignment>,
) -> Result<Json<ApiResponse<Assignment>>, AppError> {
    let assignment = assignment_service::create(&state.db, &body).await?;
    Ok(ApiResponse::success(assignment))
}

/// POST /api/v1/assignments/import: bulk upload (admin).
pub async fn import(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    multipart: Multipart,
) -> Result<Json<ApiResponse<ImportResult>>, AppError> {
    let (data, format) = read_upload(multipart).await?;
    let rows = import::parse_rows(&data, format)?;
    let result = import::import_assignments(&state.db, &rows).await?;
    Ok(ApiResponse::success(result))
}

/// POST /api/v1/assignments/{id}/submissions
pub async fn submit(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<i32>,
    Json(body): Json<CreateSubmission>,
) -> Result<Json<ApiResponse<Submission>>, AppError> {
    let submission =
        assignment_service::record_submission(&state.db, current_user.id, id, &body).await?;
    Ok(ApiResponse::success(submission))
}

/// PUT /api/v1/submissions/{id}/grade (teacher+)
pub async fn grade(
    State(state): State<AppState>,
    RequireTeacher(_teacher): RequireTeacher,
    Path(id): Path<Uuid>,
    Json(body): Json<GradeSubmission>,
) -> Result<Json<ApiResponse<Submission>>, AppError> {
    let submission = assignment_service::grade_submission(&state.db, id, &body).await?;
    Ok(ApiResponse::success(submission))
}
