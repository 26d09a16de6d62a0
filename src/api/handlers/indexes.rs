//! Index management endpoints

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::instrument;
use utoipa::ToSchema;

use super::collections::MessageResponse;
use crate::api::error::{ApiError, ErrorBody};
use crate::api::extract::{ApiJson, ApiPath};
use crate::api::routes::ApiState;
use crate::storage::convert::{json_to_document, optional_document};

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct IndexListResponse {
    pub collection: String,
    #[schema(value_type = Vec<Object>)]
    pub indexes: Vec<Value>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateIndexBody {
    /// Key specification, e.g. `{"email": 1}`
    #[schema(value_type = Option<Object>)]
    pub keys: Option<Value>,
    /// Index options such as `unique`, `name`, `expireAfterSeconds`
    #[schema(value_type = Option<Object>)]
    pub options: Option<Value>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateIndexResponse {
    pub message: String,
    pub index_name: String,
    #[schema(value_type = Object)]
    pub keys: Value,
    #[schema(value_type = Object)]
    pub options: Value,
}

#[utoipa::path(
    get,
    path = "/api/collections/{name}/indexes",
    tag = "indexes",
    params(("name" = String, Path, description = "Collection name")),
    responses(
        (status = 200, description = "Index specifications", body = IndexListResponse),
        (status = 404, description = "Collection not found", body = ErrorBody)
    )
)]
#[instrument(skip(state), fields(collection = %name), name = "http_list_indexes")]
pub async fn list_indexes_handler(
    State(state): State<ApiState>,
    ApiPath(name): ApiPath<String>,
) -> Result<Json<IndexListResponse>, ApiError> {
    let indexes = state.store.indexes().list(&name).await?;
    Ok(Json(IndexListResponse { collection: name, indexes }))
}

#[utoipa::path(
    post,
    path = "/api/collections/{name}/indexes",
    tag = "indexes",
    params(("name" = String, Path, description = "Collection name")),
    request_body = CreateIndexBody,
    responses(
        (status = 201, description = "Index created", body = CreateIndexResponse),
        (status = 400, description = "Missing keys or invalid options", body = ErrorBody),
        (status = 409, description = "Conflicting index", body = ErrorBody)
    )
)]
#[instrument(skip(state, payload), fields(collection = %name), name = "http_create_index")]
pub async fn create_index_handler(
    State(state): State<ApiState>,
    ApiPath(name): ApiPath<String>,
    ApiJson(payload): ApiJson<CreateIndexBody>,
) -> Result<(StatusCode, Json<CreateIndexResponse>), ApiError> {
    let keys_json = payload
        .keys
        .filter(|k| !k.is_null())
        .ok_or_else(|| ApiError::bad_request("Index keys are required"))?;
    let options_json = payload.options.filter(|o| !o.is_null()).unwrap_or_else(|| json!({}));

    let keys = json_to_document(keys_json.clone(), "index keys")?;
    let options = optional_document(Some(options_json.clone()), "index options")?;

    let index_name = state.store.indexes().create(&name, keys, options).await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateIndexResponse {
            message: "Index created successfully".to_string(),
            index_name,
            keys: keys_json,
            options: options_json,
        }),
    ))
}

#[utoipa::path(
    delete,
    path = "/api/collections/{name}/indexes/{index_name}",
    tag = "indexes",
    params(
        ("name" = String, Path, description = "Collection name"),
        ("index_name" = String, Path, description = "Index name")
    ),
    responses(
        (status = 200, description = "Index dropped", body = MessageResponse),
        (status = 400, description = "The _id index cannot be dropped", body = ErrorBody),
        (status = 404, description = "Index not found", body = ErrorBody)
    )
)]
#[instrument(
    skip(state),
    fields(collection = %name, index = %index_name),
    name = "http_drop_index"
)]
pub async fn drop_index_handler(
    State(state): State<ApiState>,
    ApiPath((name, index_name)): ApiPath<(String, String)>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.store.indexes().drop(&name, &index_name).await?;
    Ok(Json(MessageResponse::new(format!("Index '{}' dropped successfully", index_name))))
}
