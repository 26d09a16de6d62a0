//! Aggregation pipeline endpoint

use axum::{
    extract::State,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::instrument;
use utoipa::ToSchema;

use crate::api::error::{ApiError, ErrorBody};
use crate::api::extract::{ApiJson, ApiPath};
use crate::api::routes::ApiState;
use crate::storage::convert::json_to_documents;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AggregateBody {
    /// Pipeline stages in Extended JSON
    #[schema(value_type = Option<Vec<Object>>)]
    pub pipeline: Option<Value>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AggregateResponse {
    pub collection: String,
    #[schema(value_type = Vec<Object>)]
    pub pipeline: Vec<Value>,
    #[schema(value_type = Vec<Object>)]
    pub result: Vec<Map<String, Value>>,
    pub count: usize,
}

#[utoipa::path(
    post,
    path = "/api/collections/{name}/aggregate",
    tag = "aggregation",
    params(("name" = String, Path, description = "Collection name")),
    request_body = AggregateBody,
    responses(
        (status = 200, description = "Pipeline output", body = AggregateResponse),
        (status = 400, description = "Pipeline is not an array of stages", body = ErrorBody)
    )
)]
#[instrument(skip(state, payload), fields(collection = %name), name = "http_aggregate")]
pub async fn aggregate_handler(
    State(state): State<ApiState>,
    ApiPath(name): ApiPath<String>,
    ApiJson(payload): ApiJson<AggregateBody>,
) -> Result<Json<AggregateResponse>, ApiError> {
    let Some(Value::Array(stages)) = payload.pipeline else {
        return Err(ApiError::bad_request("Pipeline must be an array"));
    };

    let pipeline = json_to_documents(stages.clone(), "pipeline stage")?;
    let result = state.store.documents().aggregate(&name, pipeline).await?;

    Ok(Json(AggregateResponse { collection: name, pipeline: stages, count: result.len(), result }))
}
