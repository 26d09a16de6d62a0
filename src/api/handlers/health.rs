//! Health check endpoints for liveness and readiness probes

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::api::{error::{ApiError, ErrorBody}, routes::ApiState};

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Service status (always "ok" when responding)
    #[schema(example = "ok")]
    pub status: String,
}

/// Readiness response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReadinessResponse {
    #[schema(example = "ok")]
    pub status: String,
    /// Database the API exposes
    pub database: String,
}

/// Liveness probe
///
/// Returns 200 OK whenever the HTTP server is running, without touching MongoDB.
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    )
)]
pub async fn health_handler() -> (StatusCode, Json<HealthResponse>) {
    (StatusCode::OK, Json(HealthResponse { status: "ok".to_string() }))
}

/// Readiness probe
///
/// Pings MongoDB and reports 503 when the deployment cannot be reached.
#[utoipa::path(
    get,
    path = "/health/ready",
    tag = "health",
    responses(
        (status = 200, description = "MongoDB reachable", body = ReadinessResponse),
        (status = 503, description = "MongoDB unreachable", body = ErrorBody)
    )
)]
pub async fn readiness_handler(
    State(state): State<ApiState>,
) -> Result<Json<ReadinessResponse>, ApiError> {
    state.store.ping().await.map_err(|e| {
        tracing::warn!(error = %e, "Readiness check failed");
        ApiError::service_unavailable(format!("MongoDB is not reachable: {}", e))
    })?;

    Ok(Json(ReadinessResponse {
        status: "ok".to_string(),
        database: state.store.database_name().to_string(),
    }))
}
