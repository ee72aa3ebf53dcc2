//! Route definitions for the studyhall API.

pub mod assignments;
pub mod auth;
pub mod courses;
pub mod dashboard;
pub mod discussions;
pub mod health;
pub mod schedule;

use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue, Method};
use axum::routing::{get, post, put};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::errors::AppError;
use crate::AppState;

/// The full service: routes plus tracing, CORS for the frontend origin,
/// compression and the upload size limit.
pub fn app(state: AppState) -> Result<Router, AppError> {
    let origin: HeaderValue = state.config.frontend_url.parse().map_err(|_| {
        AppError::Internal(format!(
            "FRONTEND_URL is not a valid origin: {}",
            state.config.frontend_url
        ))
    })?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);
    let max_upload_bytes = state.config.max_upload_bytes;

    // Outermost first: tracing sees every request, including rejected ones.
    Ok(router(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(cors)
            .layer(CompressionLayer::new())
            .layer(DefaultBodyLimit::max(max_upload_bytes)),
    ))
}

/// All `/health` and `/api/v1` routes, without middleware layers.
pub fn router(state: AppState) -> Router {
    let auth_routes = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/refresh", post(auth::refresh))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/users", post(auth::create_user))
        .route("/auth/me", get(auth::me));

    let course_routes = Router::new()
        .route("/courses", get(courses::list).post(courses::create))
        .route("/courses/import", post(courses::import))
        .route("/courses/{id}", get(courses::get_by_id))
        .route("/courses/{id}/enroll", post(courses::enroll))
        .route(
            "/courses/{id}/progress",
            get(courses::get_progress).put(courses::update_progress),
        )
        .route(
            "/courses/{id}/students/{user_id}/score",
            put(courses::record_score),
        );

    let assignment_routes = Router::new()
        .route(
            "/assignments",
            get(assignments::list).post(assignments::create),
        )
        .route("/assignments/import", post(assignments::import))
        .route("/assignments/{id}/submissions", post(assignments::submit))
        .route("/submissions/{id}/grade", put(assignments::grade));

    let community_routes = Router::new()
        .route(
            "/discussions",
            get(discussions::list).post(discussions::create),
        )
        .route("/discussions/categories", get(discussions::categories))
        .route("/discussions/{id}/like", post(discussions::like))
        .route(
            "/schedule",
            get(schedule::list).post(schedule::create_item),
        )
        .route(
            "/schedule/events",
            get(schedule::events).post(schedule::create_event),
        );

    let dashboard_routes = Router::new()
        .route("/dashboard/student", get(dashboard::student))
        .route("/dashboard/progress", get(dashboard::progress))
        .route("/dashboard/teacher", get(dashboard::teacher))
        .route("/dashboard/admin", get(dashboard::admin))
        .route("/achievements", get(dashboard::achievements));

    Router::new()
        .route("/health/live", get(health::live))
        .route("/health/ready", get(health::ready))
        .nest("/api/v1", auth_routes)
        .nest("/api/v1", course_routes)
        .nest("/api/v1", assignment_routes)
        .nest("/api/v1", community_routes)
        .nest("/api/v1", dashboard_routes)
        .with_state(state)
}
