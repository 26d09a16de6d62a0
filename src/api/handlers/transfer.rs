//! Collection export and import endpoints

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::instrument;
use utoipa::{IntoParams, ToSchema};

use crate::api::error::{ApiError, ErrorBody};
use crate::api::extract::{ApiJson, ApiPath, ApiQuery};
use crate::api::routes::ApiState;
use crate::services::{ExportFormat, ImportMode};
use crate::storage::convert::json_to_documents;
use crate::storage::{validate_collection_name, ImportSummary};

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ExportQuery {
    /// `json` (default) or `csv`
    pub format: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ImportBody {
    /// Documents to import
    #[schema(value_type = Option<Vec<Object>>)]
    pub data: Option<Value>,
    /// `insert` (default) or `upsert`
    pub mode: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ImportResponse {
    pub message: String,
    #[serde(flatten)]
    pub summary: ImportSummary,
}

#[utoipa::path(
    get,
    path = "/api/collections/{name}/export",
    tag = "transfer",
    params(("name" = String, Path, description = "Collection name"), ExportQuery),
    responses(
        (status = 200, description = "Collection contents as a file download",
            content((String = "application/json"), (String = "text/csv"))),
        (status = 400, description = "Unsupported format", body = ErrorBody)
    )
)]
#[instrument(skip(state, query), fields(collection = %name), name = "http_export_collection")]
pub async fn export_handler(
    State(state): State<ApiState>,
    ApiPath(name): ApiPath<String>,
    ApiQuery(query): ApiQuery<ExportQuery>,
) -> Result<Response, ApiError> {
    let format = ExportFormat::from_param(query.format.as_deref())?;
    validate_collection_name(&name)?;

    let documents = state.store.documents().find_all(&name).await?;
    let body = format.render(&documents)?;

    tracing::info!(
        collection = %name,
        documents = documents.len(),
        format = format.extension(),
        "Collection exported"
    );

    Ok((
        [
            (header::CONTENT_TYPE, format.content_type().to_string()),
            (header::CONTENT_DISPOSITION, format.attachment(&name)),
        ],
        body,
    )
        .into_response())
}

#[utoipa::path(
    post,
    path = "/api/collections/{name}/import",
    tag = "transfer",
    params(("name" = String, Path, description = "Collection name")),
    request_body = ImportBody,
    responses(
        (status = 200, description = "Documents imported", body = ImportResponse),
        (status = 400, description = "Empty or non-array data, or unknown mode", body = ErrorBody)
    )
)]
#[instrument(skip(state, payload), fields(collection = %name), name = "http_import_collection")]
pub async fn import_handler(
    State(state): State<ApiState>,
    ApiPath(name): ApiPath<String>,
    ApiJson(payload): ApiJson<ImportBody>,
) -> Result<Json<ImportResponse>, ApiError> {
    let Some(Value::Array(items)) = payload.data else {
        return Err(ApiError::bad_request("Data must be an array"));
    };
    if items.is_empty() {
        return Err(ApiError::bad_request("Data must be a non-empty array"));
    }

    let mode = ImportMode::from_param(payload.mode.as_deref())?;
    let documents = json_to_documents(items, "document")?;
    let repository = state.store.documents();

    let (message, summary) = match mode {
        ImportMode::Insert => {
            let inserted = repository.insert_many(&name, documents).await?;
            let summary =
                ImportSummary { inserted_count: inserted.inserted_count, ..Default::default() };
            ("Data imported successfully", summary)
        }
        ImportMode::Upsert => {
            ("Data imported with upsert", repository.upsert_many(&name, documents).await?)
        }
    };

    tracing::info!(
        collection = %name,
        inserted = summary.inserted_count,
        upserted = summary.upserted_count,
        modified = summary.modified_count,
        "Import completed"
    );

    Ok(Json(ImportResponse { message: message.to_string(), summary }))
}
