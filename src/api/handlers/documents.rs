//! Document CRUD endpoints

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use mongodb::bson::doc;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::instrument;
use utoipa::{IntoParams, ToSchema};

use super::pagination::{parse_int, Pagination};
use crate::api::error::{ApiError, ErrorBody};
use crate::api::extract::{ApiJson, ApiPath, ApiQuery};
use crate::api::routes::ApiState;
use crate::storage::convert::json_to_document;
use crate::storage::{DeleteSummary, FindOptions, InsertOneSummary, UpdateSummary};

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListDocumentsQuery {
    /// Page number, starting at 1 (default: 1)
    #[param(value_type = Option<i64>)]
    pub page: Option<String>,
    /// Page size (default: 10, max: 1000)
    #[param(value_type = Option<i64>)]
    pub limit: Option<String>,
    /// Field to sort by (default: `_id`)
    pub sort: Option<String>,
    /// `asc` (default) or `desc`
    pub order: Option<String>,
}

/// One page of a collection
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DocumentListResponse {
    pub collection: String,
    pub page: i64,
    pub limit: i64,
    pub total: u64,
    pub total_pages: u64,
    #[schema(value_type = Vec<Object>)]
    pub documents: Vec<Map<String, Value>>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CreatedDocumentResponse {
    #[schema(example = "Document created successfully")]
    pub message: String,
    #[serde(flatten)]
    pub summary: InsertOneSummary,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UpdatedResponse {
    pub message: String,
    #[serde(flatten)]
    pub summary: UpdateSummary,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DeletedResponse {
    pub message: String,
    #[serde(flatten)]
    pub summary: DeleteSummary,
}

#[utoipa::path(
    get,
    path = "/api/collections/{name}",
    tag = "documents",
    params(("name" = String, Path, description = "Collection name"), ListDocumentsQuery),
    responses(
        (status = 200, description = "Page of documents", body = DocumentListResponse),
        (status = 400, description = "Invalid collection name", body = ErrorBody)
    )
)]
#[instrument(skip(state, query), fields(collection = %name), name = "http_list_documents")]
pub async fn list_documents_handler(
    State(state): State<ApiState>,
    ApiPath(name): ApiPath<String>,
    ApiQuery(query): ApiQuery<ListDocumentsQuery>,
) -> Result<Json<DocumentListResponse>, ApiError> {
    let pagination =
        Pagination::new(parse_int(query.page.as_deref()), parse_int(query.limit.as_deref()));
    let sort_field = query.sort.filter(|s| !s.is_empty()).unwrap_or_else(|| "_id".to_string());
    let direction = if query.order.as_deref() == Some("desc") { -1 } else { 1 };

    let mut sort = mongodb::bson::Document::new();
    sort.insert(sort_field, direction);

    let page = state
        .store
        .documents()
        .find_page(
            &name,
            FindOptions {
                filter: doc! {},
                sort: Some(sort),
                projection: None,
                skip: pagination.skip(),
                limit: pagination.limit,
            },
        )
        .await?;

    Ok(Json(DocumentListResponse {
        collection: name,
        page: pagination.page,
        limit: pagination.limit,
        total: page.total,
        total_pages: pagination.total_pages(page.total),
        documents: page.documents,
    }))
}

#[utoipa::path(
    post,
    path = "/api/collections/{name}",
    tag = "documents",
    params(("name" = String, Path, description = "Collection name")),
    request_body(content = Object, description = "Document to insert, in Extended JSON"),
    responses(
        (status = 201, description = "Document created", body = CreatedDocumentResponse),
        (status = 400, description = "Body is not a JSON object", body = ErrorBody),
        (status = 409, description = "Duplicate _id", body = ErrorBody)
    )
)]
#[instrument(skip(state, payload), fields(collection = %name), name = "http_create_document")]
pub async fn create_document_handler(
    State(state): State<ApiState>,
    ApiPath(name): ApiPath<String>,
    ApiJson(payload): ApiJson<Value>,
) -> Result<(StatusCode, Json<CreatedDocumentResponse>), ApiError> {
    let document = json_to_document(payload, "document")?;
    let summary = state.store.documents().insert_one(&name, document).await?;

    Ok((
        StatusCode::CREATED,
        Json(CreatedDocumentResponse {
            message: "Document created successfully".to_string(),
            summary,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/api/collections/{name}/{id}",
    tag = "documents",
    params(
        ("name" = String, Path, description = "Collection name"),
        ("id" = String, Path, description = "ObjectId hex string or string _id")
    ),
    responses(
        (status = 200, description = "The document", body = Object),
        (status = 404, description = "Document not found", body = ErrorBody)
    )
)]
#[instrument(skip(state), fields(collection = %name, id = %id), name = "http_get_document")]
pub async fn get_document_handler(
    State(state): State<ApiState>,
    ApiPath((name, id)): ApiPath<(String, String)>,
) -> Result<Json<Map<String, Value>>, ApiError> {
    state
        .store
        .documents()
        .find_by_id(&name, &id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Document not found"))
}

#[utoipa::path(
    put,
    path = "/api/collections/{name}/{id}",
    tag = "documents",
    params(
        ("name" = String, Path, description = "Collection name"),
        ("id" = String, Path, description = "ObjectId hex string or string _id")
    ),
    request_body(content = Object, description = "Fields to set"),
    responses(
        (status = 200, description = "Document updated", body = UpdatedResponse),
        (status = 400, description = "Invalid update", body = ErrorBody),
        (status = 404, description = "Document not found", body = ErrorBody)
    )
)]
#[instrument(
    skip(state, payload),
    fields(collection = %name, id = %id),
    name = "http_update_document"
)]
pub async fn update_document_handler(
    State(state): State<ApiState>,
    ApiPath((name, id)): ApiPath<(String, String)>,
    ApiJson(payload): ApiJson<Value>,
) -> Result<Json<UpdatedResponse>, ApiError> {
    let update = json_to_document(payload, "update")?;
    let summary = state.store.documents().update_by_id(&name, &id, update).await?;

    Ok(Json(UpdatedResponse { message: "Document updated successfully".to_string(), summary }))
}

#[utoipa::path(
    delete,
    path = "/api/collections/{name}/{id}",
    tag = "documents",
    params(
        ("name" = String, Path, description = "Collection name"),
        ("id" = String, Path, description = "ObjectId hex string or string _id")
    ),
    responses(
        (status = 200, description = "Document deleted", body = DeletedResponse),
        (status = 404, description = "Document not found", body = ErrorBody)
    )
)]
#[instrument(skip(state), fields(collection = %name, id = %id), name = "http_delete_document")]
pub async fn delete_document_handler(
    State(state): State<ApiState>,
    ApiPath((name, id)): ApiPath<(String, String)>,
) -> Result<Json<DeletedResponse>, ApiError> {
    let summary = state.store.documents().delete_by_id(&name, &id).await?;
    Ok(Json(DeletedResponse { message: "Document deleted successfully".to_string(), summary }))
}
