//! HTTP contract tests that never reach MongoDB.
//!
//! The driver connects lazily, so every request here is rejected (or served)
//! before the first round trip to the server.

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use mongorest::{
    api::{build_router, ApiState},
    config::{ApiServerConfig, DatabaseConfig, SchemaConfig},
    storage::MongoStore,
};
use serde_json::{json, Value};
use tower::ServiceExt;

async fn app() -> Router {
    let store = MongoStore::connect(&DatabaseConfig {
        uri: "mongodb://127.0.0.1:1".to_string(),
        database_name: "mongorest_contract".to_string(),
        server_selection_timeout_seconds: 1,
        ..Default::default()
    })
    .await
    .expect("lazy client");

    build_router(ApiState::new(store, SchemaConfig::default()), &ApiServerConfig::default())
}

async fn send(request: Request<Body>) -> (StatusCode, Value) {
    let response = app().await.oneshot(request).await.expect("router response");
    let status = response.status();
    let bytes = response.into_body().collect().await.expect("body").to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn assert_bad_request(status: StatusCode, body: &Value, message: &str) {
    assert_eq!(status, StatusCode::BAD_REQUEST, "body: {body}");
    assert_eq!(body["error"], "bad_request");
    assert_eq!(body["message"], message);
}

#[tokio::test]
async fn health_reports_ok() {
    let (status, body) = send(get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok"}));
}

#[tokio::test]
async fn unknown_route_is_not_found() {
    let (status, body) = send(get("/api/nope")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
    assert_eq!(body["message"], "Route not found");
}

#[tokio::test]
async fn openapi_document_lists_collection_routes() {
    let (status, body) = send(get("/api-docs/openapi.json")).await;
    assert_eq!(status, StatusCode::OK);

    let paths = body["paths"].as_object().expect("paths object");
    assert!(paths.contains_key("/api/collections"));
    assert!(paths.contains_key("/api/collections/{name}/schema"));
    assert!(paths.contains_key("/api/collections/{name}/export"));
}

#[tokio::test]
async fn create_collection_requires_name() {
    let (status, body) =
        send(json_request(Method::POST, "/api/collections", json!({"options": {}}))).await;
    assert_bad_request(status, &body, "Collection name is required");
}

#[tokio::test]
async fn rename_requires_new_name() {
    let (status, body) =
        send(json_request(Method::PUT, "/api/collections/users/rename", json!({}))).await;
    assert_bad_request(status, &body, "New collection name is required");
}

#[tokio::test]
async fn bulk_insert_requires_non_empty_array() {
    let (status, body) =
        send(json_request(Method::POST, "/api/collections/users/bulk", json!({"a": 1}))).await;
    assert_bad_request(status, &body, "Documents must be an array");

    let (status, body) =
        send(json_request(Method::POST, "/api/collections/users/bulk", json!([]))).await;
    assert_bad_request(status, &body, "Documents must be a non-empty array");
}

#[tokio::test]
async fn bulk_update_requires_filter_and_update() {
    let (status, body) = send(json_request(
        Method::PUT,
        "/api/collections/users/bulk",
        json!({"filter": {"active": false}}),
    ))
    .await;
    assert_bad_request(status, &body, "Filter and update are required");
}

#[tokio::test]
async fn bulk_delete_requires_filter() {
    let (status, body) =
        send(json_request(Method::DELETE, "/api/collections/users/bulk", json!({}))).await;
    assert_bad_request(status, &body, "Filter is required");
}

#[tokio::test]
async fn bulk_delete_rejects_non_object_filter() {
    let (status, body) = send(json_request(
        Method::DELETE,
        "/api/collections/users/bulk",
        json!({"filter": [1, 2]}),
    ))
    .await;
    assert_bad_request(status, &body, "Filter must be a JSON object");
}

#[tokio::test]
async fn aggregate_requires_pipeline_array() {
    let (status, body) =
        send(json_request(Method::POST, "/api/collections/users/aggregate", json!({}))).await;
    assert_bad_request(status, &body, "Pipeline must be an array");

    let (status, body) = send(json_request(
        Method::POST,
        "/api/collections/users/aggregate",
        json!({"pipeline": {"$match": {}}}),
    ))
    .await;
    assert_bad_request(status, &body, "Pipeline must be an array");
}

#[tokio::test]
async fn export_rejects_unknown_format() {
    let (status, body) = send(get("/api/collections/users/export?format=xml")).await;
    assert_bad_request(status, &body, "Unsupported format. Use json or csv");
}

#[tokio::test]
async fn import_validates_payload_and_mode() {
    let (status, body) = send(json_request(
        Method::POST,
        "/api/collections/users/import",
        json!({"data": {"a": 1}}),
    ))
    .await;
    assert_bad_request(status, &body, "Data must be an array");

    let (status, body) = send(json_request(
        Method::POST,
        "/api/collections/users/import",
        json!({"data": [{"a": 1}], "mode": "merge"}),
    ))
    .await;
    assert_bad_request(status, &body, "Invalid mode. Use insert or upsert");
}

#[tokio::test]
async fn create_index_requires_keys() {
    let (status, body) = send(json_request(
        Method::POST,
        "/api/collections/users/indexes",
        json!({"options": {"unique": true}}),
    ))
    .await;
    assert_bad_request(status, &body, "Index keys are required");
}

#[tokio::test]
async fn system_collections_are_rejected() {
    let (status, body) = send(get("/api/collections/system.users/schema")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");
}

#[tokio::test]
async fn query_rejects_non_object_filter() {
    let (status, body) = send(json_request(
        Method::POST,
        "/api/collections/users/query",
        json!({"filter": "name = 'x'"}),
    ))
    .await;
    assert_bad_request(status, &body, "Filter must be a JSON object");
}

#[tokio::test]
async fn malformed_json_body_uses_error_shape() {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/collections/users/aggregate")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let (status, body) = send(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn body_without_json_content_type_uses_error_shape() {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/collections/users/bulk")
        .body(Body::from("[{\"a\": 1}]"))
        .unwrap();

    let (status, body) = send(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");
}
