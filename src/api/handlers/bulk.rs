//! Bulk insert, update and delete endpoints

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::instrument;
use utoipa::ToSchema;

use super::documents::{DeletedResponse, UpdatedResponse};
use crate::api::error::{ApiError, ErrorBody};
use crate::api::extract::{ApiJson, ApiPath};
use crate::api::routes::ApiState;
use crate::storage::convert::{json_to_document, json_to_documents};
use crate::storage::InsertManySummary;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct BulkUpdateBody {
    /// Documents to update, as a query filter
    #[schema(value_type = Option<Object>)]
    pub filter: Option<Value>,
    /// Fields to `$set` on every matching document
    #[schema(value_type = Option<Object>)]
    pub update: Option<Value>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct BulkDeleteBody {
    /// Documents to delete, as a query filter; `{}` deletes everything
    #[schema(value_type = Option<Object>)]
    pub filter: Option<Value>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BulkInsertResponse {
    #[schema(example = "2 documents created successfully")]
    pub message: String,
    #[serde(flatten)]
    pub summary: InsertManySummary,
}

#[utoipa::path(
    post,
    path = "/api/collections/{name}/bulk",
    tag = "bulk",
    params(("name" = String, Path, description = "Collection name")),
    request_body(content = [Object], description = "Documents to insert"),
    responses(
        (status = 201, description = "Documents inserted", body = BulkInsertResponse),
        (status = 400, description = "Body is not a non-empty array of objects", body = ErrorBody)
    )
)]
#[instrument(skip(state, payload), fields(collection = %name), name = "http_bulk_insert")]
pub async fn bulk_insert_handler(
    State(state): State<ApiState>,
    ApiPath(name): ApiPath<String>,
    ApiJson(payload): ApiJson<Value>,
) -> Result<(StatusCode, Json<BulkInsertResponse>), ApiError> {
    let Value::Array(items) = payload else {
        return Err(ApiError::bad_request("Documents must be an array"));
    };
    if items.is_empty() {
        return Err(ApiError::bad_request("Documents must be a non-empty array"));
    }

    let documents = json_to_documents(items, "document")?;
    let summary = state.store.documents().insert_many(&name, documents).await?;

    Ok((
        StatusCode::CREATED,
        Json(BulkInsertResponse {
            message: format!("{} documents created successfully", summary.inserted_count),
            summary,
        }),
    ))
}

#[utoipa::path(
    put,
    path = "/api/collections/{name}/bulk",
    tag = "bulk",
    params(("name" = String, Path, description = "Collection name")),
    request_body = BulkUpdateBody,
    responses(
        (status = 200, description = "Documents updated", body = UpdatedResponse),
        (status = 400, description = "Missing filter or update", body = ErrorBody)
    )
)]
#[instrument(skip(state, payload), fields(collection = %name), name = "http_bulk_update")]
pub async fn bulk_update_handler(
    State(state): State<ApiState>,
    ApiPath(name): ApiPath<String>,
    ApiJson(payload): ApiJson<BulkUpdateBody>,
) -> Result<Json<UpdatedResponse>, ApiError> {
    let (Some(filter), Some(update)) = (payload.filter, payload.update) else {
        return Err(ApiError::bad_request("Filter and update are required"));
    };

    let filter = json_to_document(filter, "filter")?;
    let update = json_to_document(update, "update")?;
    let summary = state.store.documents().update_many(&name, filter, update).await?;

    Ok(Json(UpdatedResponse { message: "Bulk update completed".to_string(), summary }))
}

#[utoipa::path(
    delete,
    path = "/api/collections/{name}/bulk",
    tag = "bulk",
    params(("name" = String, Path, description = "Collection name")),
    request_body = BulkDeleteBody,
    responses(
        (status = 200, description = "Documents deleted", body = DeletedResponse),
        (status = 400, description = "Missing filter", body = ErrorBody)
    )
)]
#[instrument(skip(state, payload), fields(collection = %name), name = "http_bulk_delete")]
pub async fn bulk_delete_handler(
    State(state): State<ApiState>,
    ApiPath(name): ApiPath<String>,
    ApiJson(payload): ApiJson<BulkDeleteBody>,
) -> Result<Json<DeletedResponse>, ApiError> {
    let filter = payload.filter.ok_or_else(|| ApiError::bad_request("Filter is required"))?;
    let filter = json_to_document(filter, "filter")?;

    let summary = state.store.documents().delete_many(&name, filter).await?;

    Ok(Json(DeletedResponse { message: "Bulk delete completed".to_string(), summary }))
}
