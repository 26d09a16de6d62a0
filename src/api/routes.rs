use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    limit::RequestBodyLimitLayer,
};

use crate::config::{ApiServerConfig, SchemaConfig};
use crate::observability::trace_http_requests;
use crate::services::SchemaService;
use crate::storage::MongoStore;

use super::{
    docs,
    error::ApiError,
    handlers::{
        aggregate_handler, bulk_delete_handler, bulk_insert_handler, bulk_update_handler,
        collection_stats_handler, create_collection_handler, create_document_handler,
        create_index_handler, database_stats_handler, delete_document_handler,
        drop_collection_handler, drop_index_handler, export_handler, get_document_handler,
        health_handler, import_handler, list_collections_handler, list_documents_handler,
        list_indexes_handler, query_handler, readiness_handler, rename_collection_handler,
        schema_handler, search_handler, update_document_handler,
    },
};

/// Shared handler state
#[derive(Clone, Debug)]
pub struct ApiState {
    pub store: MongoStore,
    pub schema: SchemaService,
}

impl ApiState {
    pub fn new(store: MongoStore, schema_config: SchemaConfig) -> Self {
        let schema = SchemaService::new(Arc::new(store.documents()), schema_config);
        Self { store, schema }
    }
}

pub fn build_router(state: ApiState, config: &ApiServerConfig) -> Router {
    let collection_routes = Router::new()
        .route("/api/collections", get(list_collections_handler).post(create_collection_handler))
        .route(
            "/api/collections/{name}",
            get(list_documents_handler)
                .post(create_document_handler)
                .delete(drop_collection_handler),
        )
        .route("/api/collections/{name}/rename", put(rename_collection_handler))
        .route(
            "/api/collections/{name}/bulk",
            post(bulk_insert_handler).put(bulk_update_handler).delete(bulk_delete_handler),
        )
        .route("/api/collections/{name}/search", get(search_handler))
        .route("/api/collections/{name}/query", post(query_handler))
        .route("/api/collections/{name}/schema", get(schema_handler))
        .route("/api/collections/{name}/aggregate", post(aggregate_handler))
        .route("/api/collections/{name}/stats", get(collection_stats_handler))
        .route(
            "/api/collections/{name}/indexes",
            get(list_indexes_handler).post(create_index_handler),
        )
        .route("/api/collections/{name}/indexes/{index_name}", delete(drop_index_handler))
        .route("/api/collections/{name}/export", get(export_handler))
        .route("/api/collections/{name}/import", post(import_handler))
        .route(
            "/api/collections/{name}/{id}",
            get(get_document_handler).put(update_document_handler).delete(delete_document_handler),
        );

    Router::new()
        .route("/health", get(health_handler))
        .route("/health/ready", get(readiness_handler))
        .route("/api/stats", get(database_stats_handler))
        .merge(collection_routes)
        .merge(docs::docs_router())
        .fallback(|| async { ApiError::not_found("Route not found") })
        .with_state(state)
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(config.max_body_bytes))
        .layer(cors_layer(&config.cors_origins))
        .layer(middleware::from_fn(trace_http_requests))
}

/// Any origin when none are configured, otherwise exactly the configured ones.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any);

    if origins.is_empty() {
        return layer.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(origin = %origin, error = %e, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    layer.allow_origin(AllowOrigin::list(allowed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request, http::StatusCode};
    use tower::ServiceExt;

    async fn test_router(config: &ApiServerConfig) -> Router {
        let store = MongoStore::connect(&crate::config::DatabaseConfig {
            server_selection_timeout_seconds: 1,
            ..Default::default()
        })
        .await
        .unwrap();
        build_router(ApiState::new(store, SchemaConfig::default()), config)
    }

    #[tokio::test]
    async fn test_cors_preflight_allows_any_origin_by_default() {
        let app = test_router(&ApiServerConfig::default()).await;
        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri("/api/collections")
            .header("origin", "http://example.com")
            .header("access-control-request-method", "GET")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.headers().get("access-control-allow-origin").unwrap(), "*");
    }

    #[tokio::test]
    async fn test_cors_restricted_to_configured_origins() {
        let config = ApiServerConfig {
            cors_origins: vec!["http://allowed.test".to_string()],
            ..Default::default()
        };
        let app = test_router(&config).await;
        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri("/api/collections")
            .header("origin", "http://other.test")
            .header("access-control-request-method", "GET")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert!(response.headers().get("access-control-allow-origin").is_none());
    }

    #[tokio::test]
    async fn test_body_limit_enforced() {
        let config = ApiServerConfig { max_body_bytes: 16, ..Default::default() };
        let app = test_router(&config).await;
        let body = r#"{"pipeline": [{"$match": {"status": "active"}}]}"#;
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/collections/users/aggregate")
            .header("content-type", "application/json")
            .header("content-length", body.len())
            .body(Body::from(body))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }
}
