//! Timetable and calendar event routes.

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::Utc;

use crate::errors::{ApiResponse, AppError};
use crate::middleware::auth::CurrentUser;
use crate::middleware::rbac::{RequireAdmin, RequireTeacher};
use crate::models::schedule::{
    CreateEvent, CreateScheduleItem, ScheduleItem, ScheduleQuery, UpcomingEvent,
};
use crate::services::schedule as schedule_service;
use crate::AppState;

/// GET /api/v1/schedule?date= or ?from=&to=. Defaults to today.
pub async fn list(
    State(state): State<AppState>,
    _user: CurrentUser,
    Query(query): Query<ScheduleQuery>,
) -> Result<Json<ApiResponse<Vec<ScheduleItem>>>, AppError> {
    let items = match (query.date, query.from, query.to) {
        (Some(date), _, _) => schedule_service::list_for_day(&state.db, date).await?,
        (None, Some(from), Some(to)) => schedule_service::list_range(&state.db, from, to).await?,
        (None, Some(from), None) => schedule_service::list_for_day(&state.db, from).await?,
        (None, None, Some(_)) => {
            return Err(AppError::Validation(
                "to requires from".to_string(),
            ))
        }
        (None, None, None) => {
            schedule_service::list_for_day(&state.db, Utc::now().date_naive()).await?
        }
    };
    Ok(ApiResponse::success(items))
}

/// POST /api/v1/schedule (teacher+)
pub async fn create_item(
    State(state): State<AppState>,
    RequireTeacher(_teacher): RequireTeacher,
    Json(body): Json<CreateScheduleItem>,
) -> Result<Json<ApiResponse<ScheduleItem>>, AppError> {
    let item = schedule_service::create_item(&state.db, &body).await?;
    Ok(ApiResponse::success(item))
}

/// GET /api/v1/schedule/events: today onward.
pub async fn events(
    State(state): State<AppState>,
    _user: CurrentUser,
) -> Result<Json<ApiResponse<Vec<UpcomingEvent>>>, AppError> {
    let events = schedule_service::upcoming_events(&state.db, Utc::now().date_naive()).await?;
    Ok(ApiResponse::success(events))
}

/// POST /api/v1/schedule/events (admin)
pub async fn create_event(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Json(body): Json<CreateEvent>,
) -> Result<Json<ApiResponse<UpcomingEvent>>, AppError> {
    let event = schedule_service::create_event(&state.db, &body).await?;
    Ok(ApiResponse::success(event))
}
