//! Schema inference endpoint

use axum::{
    extract::State,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use utoipa::{IntoParams, ToSchema};

use super::pagination::parse_int;
use crate::api::error::{ApiError, ErrorBody};
use crate::api::extract::{ApiPath, ApiQuery};
use crate::api::routes::ApiState;
use crate::schema::SchemaReport;
use crate::services::CollectionSchema;
use crate::storage::validate_collection_name;

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
#[serde(rename_all = "camelCase")]
pub struct SchemaQuery {
    /// Documents to sample (default 100, capped by configuration)
    #[param(value_type = Option<i64>)]
    pub sample_size: Option<String>,
}

/// Inferred schema of a collection
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SchemaResponse {
    pub collection: String,
    #[serde(flatten)]
    pub report: SchemaReport,
}

/// Response for a collection with no documents
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EmptySchemaResponse {
    #[schema(value_type = Object)]
    pub schema: serde_json::Map<String, serde_json::Value>,
    pub count: u64,
}

#[utoipa::path(
    get,
    path = "/api/collections/{name}/schema",
    tag = "schema",
    params(("name" = String, Path, description = "Collection name"), SchemaQuery),
    responses(
        (
            status = 200,
            description = "Field types, examples and per-type counts",
            body = SchemaResponse
        ),
        (status = 400, description = "Invalid collection name", body = ErrorBody)
    )
)]
#[instrument(skip(state, query), fields(collection = %name), name = "http_collection_schema")]
pub async fn schema_handler(
    State(state): State<ApiState>,
    ApiPath(name): ApiPath<String>,
    ApiQuery(query): ApiQuery<SchemaQuery>,
) -> Result<Response, ApiError> {
    validate_collection_name(&name)?;

    let requested = parse_int(query.sample_size.as_deref());
    let response = match state.schema.infer(&name, requested).await? {
        CollectionSchema::Empty => {
            Json(EmptySchemaResponse { schema: serde_json::Map::new(), count: 0 }).into_response()
        }
        CollectionSchema::Inferred(report) => {
            tracing::info!(
                collection = %name,
                fields = report.schema.len(),
                sample_size = report.sample_size,
                "Schema inferred"
            );
            Json(SchemaResponse { collection: name, report }).into_response()
        }
    };

    Ok(response)
}
