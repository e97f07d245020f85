//! HTTP layer.
//!
//! - `routes/`: handlers (system endpoints and examples)
//! - `middleware.rs`: request tracking and CORS
//! - `auth.rs` / `extract.rs`: request extractors
//! - `error.rs`: the JSON error envelope
//! - `models.rs`: response bodies

pub mod auth;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod models;
pub mod routes;

use crate::config::Config;
use crate::db::DatabaseRegistry;
use crate::services::AppServices;
use axum::Router;
use axum::routing::get;
use std::sync::Arc;
use std::time::Instant;

/// Application context handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub databases: Arc<DatabaseRegistry>,
    pub services: Arc<AppServices>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(config: Config, databases: DatabaseRegistry, services: AppServices) -> Self {
        Self {
            config: Arc::new(config),
            databases: Arc::new(databases),
            services: Arc::new(services),
            started_at: Instant::now(),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    let cors = middleware::cors_layer(&state.config);
    let api_prefix = state.config.api_v1_prefix.clone();

    Router::new()
        .route("/", get(routes::system::api_info))
        .route("/system/health", get(routes::system::health))
        .nest(&api_prefix, routes::examples::router())
        .fallback(routes::system::not_found)
        .layer(axum::middleware::from_fn(middleware::track_request))
        .layer(cors)
        .with_state(state)
}
