use axum::{routing::get, Json, Router};
use utoipa::OpenApi;

use super::routes::ApiState;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "mongorest",
        description = "REST API over a MongoDB database with collection schema inference"
    ),
    paths(
        crate::api::handlers::health::health_handler,
        crate::api::handlers::health::readiness_handler,
        crate::api::handlers::database::database_stats_handler,
        crate::api::handlers::collections::list_collections_handler,
        crate::api::handlers::collections::create_collection_handler,
        crate::api::handlers::collections::drop_collection_handler,
        crate::api::handlers::collections::rename_collection_handler,
        crate::api::handlers::collections::collection_stats_handler,
        crate::api::handlers::documents::list_documents_handler,
        crate::api::handlers::documents::create_document_handler,
        crate::api::handlers::documents::get_document_handler,
        crate::api::handlers::documents::update_document_handler,
        crate::api::handlers::documents::delete_document_handler,
        crate::api::handlers::bulk::bulk_insert_handler,
        crate::api::handlers::bulk::bulk_update_handler,
        crate::api::handlers::bulk::bulk_delete_handler,
        crate::api::handlers::search::search_handler,
        crate::api::handlers::search::query_handler,
        crate::api::handlers::schema::schema_handler,
        crate::api::handlers::aggregation::aggregate_handler,
        crate::api::handlers::indexes::list_indexes_handler,
        crate::api::handlers::indexes::create_index_handler,
        crate::api::handlers::indexes::drop_index_handler,
        crate::api::handlers::transfer::export_handler,
        crate::api::handlers::transfer::import_handler,
    ),
    components(
        schemas(
            crate::api::error::ErrorBody,
            crate::api::handlers::health::HealthResponse,
            crate::api::handlers::health::ReadinessResponse,
            crate::api::handlers::collections::MessageResponse,
            crate::api::handlers::collections::CreateCollectionBody,
            crate::api::handlers::collections::RenameCollectionBody,
            crate::api::handlers::documents::DocumentListResponse,
            crate::api::handlers::documents::CreatedDocumentResponse,
            crate::api::handlers::documents::UpdatedResponse,
            crate::api::handlers::documents::DeletedResponse,
            crate::api::handlers::bulk::BulkUpdateBody,
            crate::api::handlers::bulk::BulkDeleteBody,
            crate::api::handlers::bulk::BulkInsertResponse,
            crate::api::handlers::search::SearchResponse,
            crate::api::handlers::search::QueryBody,
            crate::api::handlers::search::QueryResponse,
            crate::api::handlers::schema::SchemaResponse,
            crate::api::handlers::schema::EmptySchemaResponse,
            crate::api::handlers::aggregation::AggregateBody,
            crate::api::handlers::aggregation::AggregateResponse,
            crate::api::handlers::indexes::IndexListResponse,
            crate::api::handlers::indexes::CreateIndexBody,
            crate::api::handlers::indexes::CreateIndexResponse,
            crate::api::handlers::transfer::ImportBody,
            crate::api::handlers::transfer::ImportResponse,
            crate::schema::SchemaReport,
            crate::schema::FieldSummary,
            crate::schema::TypeTag,
            crate::storage::CollectionSummary,
            crate::storage::CollectionStats,
            crate::storage::CollectionDetail,
            crate::storage::DatabaseStats,
            crate::storage::InsertOneSummary,
            crate::storage::InsertManySummary,
            crate::storage::UpdateSummary,
            crate::storage::DeleteSummary,
            crate::storage::ImportSummary,
        )
    ),
    tags(
        (name = "health", description = "Liveness and readiness probes"),
        (name = "database", description = "Database-wide statistics"),
        (name = "collections", description = "Collection management"),
        (name = "documents", description = "Document CRUD"),
        (name = "bulk", description = "Bulk writes"),
        (name = "search", description = "Search and ad-hoc queries"),
        (name = "schema", description = "Schema inference from sampled documents"),
        (name = "aggregation", description = "Aggregation pipelines"),
        (name = "indexes", description = "Index management"),
        (name = "transfer", description = "Export and import"),
    )
)]
pub struct ApiDoc;

pub fn docs_router() -> Router<ApiState> {
    Router::new().route("/api-docs/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
}
