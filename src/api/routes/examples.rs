//! Example endpoints showing the extractor patterns.

use crate::api::AppState;
use crate::api::auth::{AuthenticatedUser, CurrentUser};
use crate::api::extract::CommonQuery;
use crate::api::models::{ExampleResponse, ItemModel, ItemsListResponse, ProtectedResponse};
use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use tracing::info;

const MOCK_ITEM_COUNT: i64 = 20;

pub fn router() -> Router<AppState> {
    Router::new().nest(
        "/examples",
        Router::new()
            .route("/basic", get(basic))
            .route("/protected", get(protected))
            .route("/paginated", get(paginated)),
    )
}

/// Optional authentication.
async fn basic(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Json<ExampleResponse> {
    info!("Basic example endpoint called");
    Json(ExampleResponse {
        message: "This is a basic example endpoint",
        environment: state.config.environment,
        authenticated: user.is_some(),
        user_id: user.map(|u| u.id),
    })
}

/// Required authentication; the extractor answers 401 before this runs.
async fn protected(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Json<ProtectedResponse> {
    Json(ProtectedResponse {
        message: "This is a protected example endpoint",
        user,
        environment: state.config.environment,
    })
}

async fn paginated(query: CommonQuery, CurrentUser(user): CurrentUser) -> Json<ItemsListResponse> {
    let items: Vec<ItemModel> = (1..=MOCK_ITEM_COUNT)
        .map(|id| ItemModel {
            id,
            name: format!("Item {}", id),
            created_at: "2024-01-01T00:00:00Z".to_string(),
        })
        .collect();
    let total = items.len();
    let page = items[query.pagination().range(total)].to_vec();

    Json(ItemsListResponse {
        items: page,
        total,
        skip: query.skip,
        limit: query.limit,
        sort_by: query.sort_by,
        sort_order: query.sort_order,
        user_authenticated: user.is_some(),
    })
}
