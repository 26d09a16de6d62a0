//! Database-wide statistics

use axum::{extract::State, Json};
use tracing::instrument;

use crate::api::{error::{ApiError, ErrorBody}, routes::ApiState};
use crate::storage::DatabaseStats;

/// Totals across all collections, with per-collection counts, sizes and index counts
#[utoipa::path(
    get,
    path = "/api/stats",
    tag = "database",
    responses(
        (status = 200, description = "Database statistics", body = DatabaseStats),
        (status = 503, description = "MongoDB unreachable", body = ErrorBody)
    )
)]
#[instrument(skip(state), name = "http_database_stats")]
pub async fn database_stats_handler(
    State(state): State<ApiState>,
) -> Result<Json<DatabaseStats>, ApiError> {
    let stats = state.store.collections().database_stats().await?;
    Ok(Json(stats))
}
