//! Catalog, enrollment and progress routes.

use axum::{
    extract::{Multipart, Path, Query, State},
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::errors::{ApiResponse, AppError};
use crate::middleware::auth::CurrentUser;
use crate::middleware::rbac::{RequireAdmin, RequireTeacher};
use crate::models::course::{Course, CreateCourse};
use crate::models::pagination::{PagedResult, Pagination};
use crate::models::progress::{CourseProgress, ProgressUpdate, ScoreUpdate};
use crate::services::catalog::{self, CourseFilters};
use crate::services::enrollment::{self, EnrollOutcome};
use crate::services::import::{self, ImportFormat, ImportResult};
use crate::services::progress;
use crate::AppState;

/// Course detail with the player-ready video link.
#[derive(Debug, Serialize)]
pub struct CourseDetail {
    #[serde(flatten)]
    pub course: Course,
    pub embed_url: Option<String>,
    pub enrolled: bool,
}

/// GET /api/v1/courses: catalog with filters and pagination.
pub async fn list(
    State(state): State<AppState>,
    _user: CurrentUser,
    Query(pagination): Query<Pagination>,
    Query(filters): Query<CourseFilters>,
) -> Result<Json<ApiResponse<PagedResult<Course>>>, AppError> {
    let result = catalog::list(&state.db, &filters, &pagination).await?;
    Ok(ApiResponse::success(result))
}

/// GET /api/v1/courses/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<CourseDetail>>, AppError> {
    let (course, enrolled) = tokio::try_join!(
        catalog::find_by_id(&state.db, id),
        enrollment::is_enrolled(&state.db, current_user.id, id),
    )?;
    let embed_url = course.video_url.as_deref().map(catalog::embed_url);
    Ok(ApiResponse::success(CourseDetail {
        course,
        embed_url,
        enrolled,
    }))
}

/// POST /api/v1/courses: add a catalog entry (teacher+). Teachers own what they add.
pub async fn create(
    State(state): State<AppState>,
    RequireTeacher(user): RequireTeacher,
    Json(mut body): Json<CreateCourse>,
) -> Result<Json<ApiResponse<Course>>, AppError> {
    if body.teacher_id.is_none() {
        body.teacher_id = Some(user.id);
    }
    let course = catalog::create(&state.db, &body).await?;
    Ok(ApiResponse::success(course))
}

/// POST /api/v1/courses/import: bulk upload (admin).
pub async fn import(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    multipart: Multipart,
) -> Result<Json<ApiResponse<ImportResult>>, AppError> {
    let (data, format) = read_upload(multipart).await?;
    let rows = import::parse_rows(&data, format)?;
    let result = import::import_courses(&state.db, &rows).await?;
    Ok(ApiResponse::success(result))
}

/// POST /api/v1/courses/{id}/enroll: idempotent.
pub async fn enroll(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<EnrollOutcome>>, AppError> {
    let outcome = enrollment::enroll(&state.db, current_user.id, id).await?;
    Ok(ApiResponse::success(outcome))
}

/// GET /api/v1/courses/{id}/progress: the caller's own record.
pub async fn get_progress(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<CourseProgress>>, AppError> {
    let record = progress::fetch_course_progress(&state.db, current_user.id, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Not enrolled in course {id}")))?;
    Ok(ApiResponse::success(record))
}

/// PUT /api/v1/courses/{id}/progress
pub async fn update_progress(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<i32>,
    Json(body): Json<ProgressUpdate>,
) -> Result<Json<ApiResponse<CourseProgress>>, AppError> {
    let record = progress::update_progress(&state.db, current_user.id, id, &body).await?;
    Ok(ApiResponse::success(record))
}

/// PUT /api/v1/courses/{id}/students/{user_id}/score (teacher+)
pub async fn record_score(
    State(state): State<AppState>,
    RequireTeacher(_teacher): RequireTeacher,
    Path((id, user_id)): Path<(i32, Uuid)>,
    Json(body): Json<ScoreUpdate>,
) -> Result<Json<ApiResponse<CourseProgress>>, AppError> {
    let record = progress::record_score(&state.db, user_id, id, body.score).await?;
    Ok(ApiResponse::success(record))
}

/// Read the `file` field of a multipart upload and detect its format.
/// Unknown extensions are treated as CSV.
pub(crate) async fn read_upload(mut multipart: Multipart) -> Result<(Vec<u8>, ImportFormat), AppError> {
    let mut file_data: Option<Vec<u8>> = None;
    let mut filename: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Multipart error: {e}")))?
    {
        if field.name() == Some("file") {
            filename = field.file_name().map(|s| s.to_string());
            file_data = Some(
                field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Failed to read file: {e}")))?
                    .to_vec(),
            );
        }
    }

    let data = file_data.ok_or_else(|| {
        AppError::Validation("Missing 'file' field in multipart request".to_string())
    })?;

    let format = filename
        .as_deref()
        .and_then(ImportFormat::from_filename)
        .unwrap_or(ImportFormat::Csv);

    Ok((data, format))
}
