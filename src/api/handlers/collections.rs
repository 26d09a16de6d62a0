//! Collection management endpoints

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::instrument;
use utoipa::ToSchema;

use crate::api::error::{ApiError, ErrorBody};
use crate::api::extract::{ApiJson, ApiPath};
use crate::api::routes::ApiState;
use crate::storage::convert::optional_document;
use crate::storage::{CollectionStats, CollectionSummary};

/// Generic confirmation message
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new<S: Into<String>>(message: S) -> Self {
        Self { message: message.into() }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateCollectionBody {
    /// Name of the new collection
    #[schema(example = "users")]
    pub name: Option<String>,
    /// Options forwarded to the `create` command (e.g. `capped`, `size`, `validator`)
    #[schema(value_type = Option<Object>)]
    pub options: Option<Value>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RenameCollectionBody {
    #[schema(example = "customers")]
    pub new_name: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/collections",
    tag = "collections",
    responses(
        (status = 200, description = "Collections with document counts", body = [CollectionSummary])
    )
)]
#[instrument(skip(state), name = "http_list_collections")]
pub async fn list_collections_handler(
    State(state): State<ApiState>,
) -> Result<Json<Vec<CollectionSummary>>, ApiError> {
    let collections = state.store.collections().list_with_counts().await?;
    Ok(Json(collections))
}

#[utoipa::path(
    post,
    path = "/api/collections",
    tag = "collections",
    request_body = CreateCollectionBody,
    responses(
        (status = 201, description = "Collection created", body = MessageResponse),
        (status = 400, description = "Missing or invalid name", body = ErrorBody),
        (status = 409, description = "Collection already exists", body = ErrorBody)
    )
)]
#[instrument(skip(state, payload), name = "http_create_collection")]
pub async fn create_collection_handler(
    State(state): State<ApiState>,
    ApiJson(payload): ApiJson<CreateCollectionBody>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let name = payload
        .name
        .filter(|n| !n.is_empty())
        .ok_or_else(|| ApiError::bad_request("Collection name is required"))?;
    let options = optional_document(payload.options, "options")?;

    state.store.collections().create(&name, options).await?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new(format!("Collection '{}' created successfully", name))),
    ))
}

#[utoipa::path(
    delete,
    path = "/api/collections/{name}",
    tag = "collections",
    params(("name" = String, Path, description = "Collection name")),
    responses(
        (status = 200, description = "Collection dropped", body = MessageResponse),
        (status = 404, description = "Collection not found", body = ErrorBody)
    )
)]
#[instrument(skip(state), fields(collection = %name), name = "http_drop_collection")]
pub async fn drop_collection_handler(
    State(state): State<ApiState>,
    ApiPath(name): ApiPath<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.store.collections().drop(&name).await?;
    Ok(Json(MessageResponse::new(format!("Collection '{}' dropped successfully", name))))
}

#[utoipa::path(
    put,
    path = "/api/collections/{name}/rename",
    tag = "collections",
    params(("name" = String, Path, description = "Collection name")),
    request_body = RenameCollectionBody,
    responses(
        (status = 200, description = "Collection renamed", body = MessageResponse),
        (status = 400, description = "Missing new name", body = ErrorBody),
        (status = 404, description = "Collection not found", body = ErrorBody),
        (status = 409, description = "Target name already exists", body = ErrorBody)
    )
)]
#[instrument(skip(state, payload), fields(collection = %name), name = "http_rename_collection")]
pub async fn rename_collection_handler(
    State(state): State<ApiState>,
    ApiPath(name): ApiPath<String>,
    ApiJson(payload): ApiJson<RenameCollectionBody>,
) -> Result<Json<MessageResponse>, ApiError> {
    let new_name = payload
        .new_name
        .filter(|n| !n.is_empty())
        .ok_or_else(|| ApiError::bad_request("New collection name is required"))?;

    state.store.collections().rename(&name, &new_name).await?;

    Ok(Json(MessageResponse::new(format!(
        "Collection '{}' renamed to '{}' successfully",
        name, new_name
    ))))
}

#[utoipa::path(
    get,
    path = "/api/collections/{name}/stats",
    tag = "collections",
    params(("name" = String, Path, description = "Collection name")),
    responses(
        (status = 200, description = "Collection statistics", body = CollectionStats),
        (status = 404, description = "Collection not found", body = ErrorBody)
    )
)]
#[instrument(skip(state), fields(collection = %name), name = "http_collection_stats")]
pub async fn collection_stats_handler(
    State(state): State<ApiState>,
    ApiPath(name): ApiPath<String>,
) -> Result<Json<CollectionStats>, ApiError> {
    let stats = state.store.collections().stats(&name).await?;
    Ok(Json(stats))
}
