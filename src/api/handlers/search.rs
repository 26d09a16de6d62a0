//! Search and ad-hoc query endpoints

use axum::{
    extract::State,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::instrument;
use utoipa::{IntoParams, ToSchema};

use super::pagination::{parse_int, Pagination};
use crate::api::error::{ApiError, ErrorBody};
use crate::api::extract::{ApiJson, ApiPath, ApiQuery};
use crate::api::routes::ApiState;
use crate::services::{build_search_filter, SearchType};
use crate::storage::convert::optional_document;
use crate::storage::{DocumentPage, FindOptions};

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchQuery {
    /// Text to look for
    pub query: Option<String>,
    /// Restrict the search to one field
    pub field: Option<String>,
    /// `text` (default), `regex`, `exact` or `number`
    #[serde(rename = "type")]
    pub search_type: Option<String>,
    #[param(value_type = Option<i64>)]
    pub page: Option<String>,
    #[param(value_type = Option<i64>)]
    pub limit: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub collection: String,
    pub query: Option<String>,
    pub field: Option<String>,
    #[serde(rename = "type")]
    pub search_type: String,
    pub page: i64,
    pub limit: i64,
    pub total: u64,
    pub total_pages: u64,
    #[schema(value_type = Vec<Object>)]
    pub documents: Vec<Map<String, Value>>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct QueryBody {
    /// Query filter in Extended JSON (default: `{}`)
    #[schema(value_type = Option<Object>)]
    pub filter: Option<Value>,
    /// Sort specification (default: `{"_id": 1}`)
    #[schema(value_type = Option<Object>)]
    pub sort: Option<Value>,
    /// Projection (default: all fields)
    #[schema(value_type = Option<Object>)]
    pub projection: Option<Value>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QueryResponse {
    pub collection: String,
    #[schema(value_type = Object)]
    pub filter: Value,
    #[schema(value_type = Object)]
    pub sort: Value,
    #[schema(value_type = Object)]
    pub projection: Value,
    pub page: i64,
    pub limit: i64,
    pub total: u64,
    pub total_pages: u64,
    #[schema(value_type = Vec<Object>)]
    pub documents: Vec<Map<String, Value>>,
}

#[utoipa::path(
    get,
    path = "/api/collections/{name}/search",
    tag = "search",
    params(("name" = String, Path, description = "Collection name"), SearchQuery),
    responses(
        (status = 200, description = "Matching documents", body = SearchResponse),
        (status = 400, description = "Invalid numeric query", body = ErrorBody),
        (status = 404, description = "Collection not found", body = ErrorBody)
    )
)]
#[instrument(skip(state, params), fields(collection = %name), name = "http_search_documents")]
pub async fn search_handler(
    State(state): State<ApiState>,
    ApiPath(name): ApiPath<String>,
    ApiQuery(params): ApiQuery<SearchQuery>,
) -> Result<Json<SearchResponse>, ApiError> {
    let pagination =
        Pagination::new(parse_int(params.page.as_deref()), parse_int(params.limit.as_deref()));
    let search_type = SearchType::from_param(params.search_type.as_deref());

    if !state.store.collections().exists(&name).await? {
        return Err(ApiError::not_found(format!("Collection '{}' not found", name)));
    }

    let documents = state.store.documents();
    let sample = documents.first(&name).await?;
    let filter = build_search_filter(
        params.query.as_deref(),
        params.field.as_deref(),
        search_type,
        sample.as_ref(),
    )?;

    // An empty collection matches nothing; skip the query so a `$text` filter
    // without a text index is never sent.
    let page = if sample.is_none() {
        DocumentPage::default()
    } else {
        tracing::debug!(collection = %name, filter = %filter, "Search filter built");

        let options = FindOptions {
            filter,
            skip: pagination.skip(),
            limit: pagination.limit,
            ..Default::default()
        };
        documents.find_page(&name, options).await?
    };

    Ok(Json(SearchResponse {
        collection: name,
        query: params.query,
        field: params.field,
        search_type: search_type.as_str().to_string(),
        page: pagination.page,
        limit: pagination.limit,
        total: page.total,
        total_pages: pagination.total_pages(page.total),
        documents: page.documents,
    }))
}

#[utoipa::path(
    post,
    path = "/api/collections/{name}/query",
    tag = "search",
    params(("name" = String, Path, description = "Collection name")),
    request_body = QueryBody,
    responses(
        (status = 200, description = "Matching documents", body = QueryResponse),
        (status = 400, description = "Invalid filter, sort or projection", body = ErrorBody)
    )
)]
#[instrument(skip(state, payload), fields(collection = %name), name = "http_query_documents")]
pub async fn query_handler(
    State(state): State<ApiState>,
    ApiPath(name): ApiPath<String>,
    ApiJson(payload): ApiJson<QueryBody>,
) -> Result<Json<QueryResponse>, ApiError> {
    let pagination = Pagination::new(payload.page, payload.limit);

    let filter_json = payload.filter.filter(|v| !v.is_null()).unwrap_or_else(|| json!({}));
    let sort_json = payload.sort.filter(|v| !v.is_null()).unwrap_or_else(|| json!({"_id": 1}));
    let projection_json = payload.projection.filter(|v| !v.is_null()).unwrap_or_else(|| json!({}));

    let options = FindOptions {
        filter: optional_document(Some(filter_json.clone()), "filter")?,
        sort: Some(optional_document(Some(sort_json.clone()), "sort")?),
        projection: Some(optional_document(Some(projection_json.clone()), "projection")?),
        skip: pagination.skip(),
        limit: pagination.limit,
    };

    let page = state.store.documents().find_page(&name, options).await?;

    Ok(Json(QueryResponse {
        collection: name,
        filter: filter_json,
        sort: sort_json,
        projection: projection_json,
        page: pagination.page,
        limit: pagination.limit,
        total: page.total,
        total_pages: pagination.total_pages(page.total),
        documents: page.documents,
    }))
}
