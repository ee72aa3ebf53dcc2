//! Health check endpoints for liveness and readiness probes.

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::errors::ApiResponse;
use crate::AppState;

/// Readiness probe detail.
#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: String,
    pub database: String,
    pub redis: String,
}

/// Liveness probe: OK whenever the process is serving.
pub async fn live() -> &'static str {
    "OK"
}

/// Readiness probe: checks database and Redis connectivity.
pub async fn ready(State(state): State<AppState>) -> (StatusCode, Json<ApiResponse<HealthStatus>>) {
    let (db_ok, database) = match sqlx::query("SELECT 1").execute(&state.db).await {
        Ok(_) => (true, "connected".to_string()),
        Err(e) => {
            tracing::warn!(error = %e, "Database health check failed");
            (false, format!("error: {e}"))
        }
    };

    let (redis_ok, redis) = match state.redis.get_multiplexed_async_connection().await {
        Ok(_) => (true, "connected".to_string()),
        Err(e) => {
            tracing::warn!(error = %e, "Redis health check failed");
            (false, format!("error: {e}"))
        }
    };

    let healthy = db_ok && redis_ok;
    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        ApiResponse::success(HealthStatus {
            status: if healthy { "ok" } else { "degraded" }.to_string(),
            database,
            redis,
        }),
    )
}
