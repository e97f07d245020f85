//! Shared query extractors.

use crate::api::error::ApiError;
use crate::api::middleware::RequestId;
use crate::utils::{DEFAULT_MAX_LIMIT, Pagination, normalize_pagination};
use axum::extract::{FromRequestParts, Query};
use axum::http::request::Parts;
use serde::Deserialize;

pub const DEFAULT_LIMIT: i64 = 100;
pub const DEFAULT_SORT_BY: &str = "created_at";
pub const DEFAULT_SORT_ORDER: &str = "desc";

#[derive(Debug, Default, Deserialize)]
struct RawCommonQuery {
    skip: Option<i64>,
    limit: Option<i64>,
    sort_by: Option<String>,
    sort_order: Option<String>,
}

/// `?skip&limit&sort_by&sort_order` for list endpoints, with pagination
/// already clamped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommonQuery {
    pub skip: i64,
    pub limit: i64,
    pub sort_by: String,
    pub sort_order: String,
}

impl CommonQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination {
            skip: self.skip,
            limit: self.limit,
        }
    }
}

impl From<RawCommonQuery> for CommonQuery {
    fn from(raw: RawCommonQuery) -> Self {
        let page = normalize_pagination(
            raw.skip.unwrap_or(0),
            raw.limit.unwrap_or(DEFAULT_LIMIT),
            DEFAULT_MAX_LIMIT,
        );
        Self {
            skip: page.skip,
            limit: page.limit,
            sort_by: raw.sort_by.unwrap_or_else(|| DEFAULT_SORT_BY.to_string()),
            sort_order: raw
                .sort_order
                .unwrap_or_else(|| DEFAULT_SORT_ORDER.to_string()),
        }
    }
}

impl<S: Send + Sync> FromRequestParts<S> for CommonQuery {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(raw) = Query::<RawCommonQuery>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| {
                let request_id = parts
                    .extensions
                    .get::<RequestId>()
                    .cloned()
                    .unwrap_or_default();
                ApiError::validation(rejection.body_text()).with_request_id(request_id.0)
            })?;
        Ok(raw.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let query = CommonQuery::from(RawCommonQuery::default());
        assert_eq!(query.skip, 0);
        assert_eq!(query.limit, DEFAULT_LIMIT);
        assert_eq!(query.sort_by, "created_at");
        assert_eq!(query.sort_order, "desc");
    }

    #[test]
    fn test_values_are_clamped() {
        let query = CommonQuery::from(RawCommonQuery {
            skip: Some(-3),
            limit: Some(5000),
            sort_by: Some("name".to_string()),
            sort_order: Some("asc".to_string()),
        });
        assert_eq!(query.pagination(), Pagination { skip: 0, limit: 1000 });
        assert_eq!(query.sort_by, "name");
    }
}
