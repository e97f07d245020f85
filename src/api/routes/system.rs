//! System endpoints: API info, health, and the 404 fallback.

use crate::api::AppState;
use crate::api::error::ApiError;
use crate::api::middleware::RequestId;
use crate::api::models::{ApiInfoResponse, DatabaseHealth, HealthResponse};
use axum::Json;
use axum::extract::State;
use axum::http::Uri;
use chrono::{SecondsFormat, Utc};

pub async fn api_info(State(state): State<AppState>) -> Json<ApiInfoResponse> {
    Json(ApiInfoResponse {
        name: state.config.app_name.clone(),
        version: env!("CARGO_PKG_VERSION"),
        environment: state.config.environment,
        api_version: "v1",
        api_prefix: state.config.api_v1_prefix.clone(),
    })
}

/// Always 200; `status` is "degraded" when any registered database fails
/// its health check.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let databases = DatabaseHealth::from_checks(state.databases.health_check_all().await);
    let status = if databases.all_healthy() {
        "healthy"
    } else {
        "degraded"
    };

    Json(HealthResponse {
        status,
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
        uptime: "running",
        uptime_secs: state.started_at.elapsed().as_secs(),
        databases,
    })
}

pub async fn not_found(request_id: RequestId, uri: Uri) -> ApiError {
    ApiError::not_found(format!("No route for {}", uri.path())).with_request_id(request_id.0)
}
