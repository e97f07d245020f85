//! Integration tests for the HTTP layer.
//!
//! Requests go straight through the router with `tower::ServiceExt::oneshot`;
//! no socket is opened.

use api_template::api::{AppState, build_router};
use api_template::config::Config;
use api_template::db::{DatabaseRegistry, ManagerOptions};
use api_template::services::AppServices;
use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{HeaderMap, Request, StatusCode, header};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

fn router_with(config: Config, registry: DatabaseRegistry) -> Router {
    let services = AppServices::new(&config);
    build_router(AppState::new(config, registry, services))
}

fn default_router() -> Router {
    router_with(Config::default_config(), DatabaseRegistry::new())
}

async fn send(router: Router, request: Request<Body>) -> (StatusCode, HeaderMap, Value) {
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, headers, body)
}

async fn get(router: Router, uri: &str) -> (StatusCode, HeaderMap, Value) {
    send(router, Request::get(uri).body(Body::empty()).unwrap()).await
}

async fn get_with_token(router: Router, uri: &str, token: &str) -> (StatusCode, HeaderMap, Value) {
    let request = Request::get(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();
    send(router, request).await
}

#[tokio::test]
async fn test_api_info() {
    let (status, _, body) = get(default_router(), "/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "API Template");
    assert_eq!(body["environment"], "development");
    assert_eq!(body["api_version"], "v1");
    assert_eq!(body["api_prefix"], "/api/v1");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_request_tracking_headers() {
    let (_, headers, _) = get(default_router(), "/").await;

    let request_id = headers.get("x-request-id").unwrap().to_str().unwrap();
    assert!(uuid::Uuid::parse_str(request_id).is_ok());

    let process_time: f64 = headers
        .get("x-process-time")
        .unwrap()
        .to_str()
        .unwrap()
        .parse()
        .unwrap();
    assert!(process_time >= 0.0);
}

#[tokio::test]
async fn test_health_without_databases() {
    let (status, _, body) = get(default_router(), "/system/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["uptime"], "running");
    assert_eq!(body["databases"]["status"], "no databases configured");
    assert!(body["uptime_secs"].is_u64());
    assert!(
        chrono::DateTime::parse_from_rfc3339(body["timestamp"].as_str().unwrap()).is_ok()
    );
}

#[tokio::test]
async fn test_health_reports_degraded_database() {
    let dir = TempDir::new().unwrap();
    let broken = format!("sqlite:{}", dir.path().join("nope").join("x.db").display());

    let mut registry = DatabaseRegistry::new();
    registry
        .register_sql("main", "sqlite::memory:", ManagerOptions::default())
        .await
        .unwrap();
    registry
        .register_sql("archive", &broken, ManagerOptions::default())
        .await
        .unwrap();
    registry.connect_all().await;

    let (status, _, body) = get(
        router_with(Config::default_config(), registry),
        "/system/health",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["databases"]["main"], true);
    assert_eq!(body["databases"]["archive"], false);
}

#[tokio::test]
async fn test_health_all_databases_up() {
    let mut registry = DatabaseRegistry::new();
    registry
        .register_generic("main", "sqlite::memory:", ManagerOptions::default())
        .await
        .unwrap();
    registry.connect_all().await;

    let (_, _, body) = get(
        router_with(Config::default_config(), registry),
        "/system/health",
    )
    .await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["databases"]["main"], true);
}

#[tokio::test]
async fn test_basic_example_optional_auth() {
    let (status, _, body) = get(default_router(), "/api/v1/examples/basic").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["authenticated"], false);
    assert!(body["user_id"].is_null());
    assert_eq!(body["environment"], "development");

    let (_, _, body) = get_with_token(default_router(), "/api/v1/examples/basic", "token").await;
    assert_eq!(body["authenticated"], true);
    assert_eq!(body["user_id"], "user123");
}

#[tokio::test]
async fn test_protected_example_requires_token() {
    let (status, headers, body) = get(default_router(), "/api/v1/examples/protected").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(headers.get(header::WWW_AUTHENTICATE).unwrap(), "Bearer");
    assert_eq!(body["error"], "UnauthorizedError");
    assert_eq!(body["status_code"], 401);
    assert_eq!(
        body["request_id"],
        headers.get("x-request-id").unwrap().to_str().unwrap()
    );

    let (status, _, body) =
        get_with_token(default_router(), "/api/v1/examples/protected", "token").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["username"], "testuser");
    assert_eq!(body["message"], "This is a protected example endpoint");
}

#[tokio::test]
async fn test_malformed_authorization_is_anonymous() {
    let request = Request::get("/api/v1/examples/basic")
        .header(header::AUTHORIZATION, "Basic dXNlcjpwYXNz")
        .body(Body::empty())
        .unwrap();
    let (status, _, body) = send(default_router(), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["authenticated"], false);
}

#[tokio::test]
async fn test_paginated_example() {
    let (status, _, body) = get(
        default_router(),
        "/api/v1/examples/paginated?skip=15&limit=10&sort_by=name&sort_order=asc",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 20);
    assert_eq!(body["skip"], 15);
    assert_eq!(body["limit"], 10);
    assert_eq!(body["sort_by"], "name");
    assert_eq!(body["sort_order"], "asc");
    assert_eq!(body["user_authenticated"], false);

    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 5);
    assert_eq!(items[0]["id"], 16);
    assert_eq!(items[0]["name"], "Item 16");
}

#[tokio::test]
async fn test_paginated_defaults_and_clamping() {
    let (_, _, body) = get(default_router(), "/api/v1/examples/paginated").await;
    assert_eq!(body["skip"], 0);
    assert_eq!(body["limit"], 100);
    assert_eq!(body["sort_by"], "created_at");
    assert_eq!(body["sort_order"], "desc");
    assert_eq!(body["items"].as_array().unwrap().len(), 20);

    let (_, _, body) = get(
        default_router(),
        "/api/v1/examples/paginated?skip=-4&limit=5000",
    )
    .await;
    assert_eq!(body["skip"], 0);
    assert_eq!(body["limit"], 1000);
}

#[tokio::test]
async fn test_paginated_rejects_non_numeric_query() {
    let (status, _, body) = get(default_router(), "/api/v1/examples/paginated?limit=lots").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "ValidationError");
    assert_eq!(body["status_code"], 422);
    assert!(body["request_id"].is_string());
}

#[tokio::test]
async fn test_unknown_route_uses_error_envelope() {
    let (status, headers, body) = get(default_router(), "/does/not/exist").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "NotFoundError");
    assert_eq!(body["status_code"], 404);
    assert_eq!(
        body["request_id"],
        headers.get("x-request-id").unwrap().to_str().unwrap()
    );
}

#[tokio::test]
async fn test_custom_api_prefix() {
    let mut config = Config::default_config();
    config.api_v1_prefix = "/v2".to_string();
    let router = router_with(config, DatabaseRegistry::new());

    let (status, _, _) = get(router.clone(), "/v2/examples/basic").await;
    assert_eq!(status, StatusCode::OK);

    let (status, _, _) = get(router, "/api/v1/examples/basic").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_cors_wildcard_origin() {
    let request = Request::get("/")
        .header(header::ORIGIN, "https://app.example.com")
        .body(Body::empty())
        .unwrap();
    let (_, headers, _) = send(default_router(), request).await;
    assert_eq!(
        headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        "*"
    );
}

#[tokio::test]
async fn test_cors_explicit_origins_allow_credentials() {
    let mut config = Config::default_config();
    config.allowed_hosts = vec!["https://app.example.com".to_string()];
    let router = router_with(config, DatabaseRegistry::new());

    let request = Request::get("/")
        .header(header::ORIGIN, "https://app.example.com")
        .body(Body::empty())
        .unwrap();
    let (_, headers, _) = send(router.clone(), request).await;
    assert_eq!(
        headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        "https://app.example.com"
    );
    assert_eq!(
        headers
            .get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS)
            .unwrap(),
        "true"
    );

    let request = Request::get("/")
        .header(header::ORIGIN, "https://evil.example.com")
        .body(Body::empty())
        .unwrap();
    let (_, headers, _) = send(router, request).await;
    assert!(headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
}
