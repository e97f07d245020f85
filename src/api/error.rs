//! JSON error envelope for HTTP responses.

use crate::error::DbError;
use axum::Json;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

/// Message sent to clients instead of internal error details.
pub const INTERNAL_ERROR_MESSAGE: &str = "An unexpected error occurred";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    Validation,
    NotFound,
    Unauthorized,
    Internal,
}

impl ApiErrorKind {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation => StatusCode::UNPROCESSABLE_ENTITY,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Value of the `error` field in the response body.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation => "ValidationError",
            Self::NotFound => "NotFoundError",
            Self::Unauthorized => "UnauthorizedError",
            Self::Internal => "InternalServerError",
        }
    }
}

#[derive(Debug, Error)]
#[error("{message}")]
pub struct ApiError {
    kind: ApiErrorKind,
    message: String,
    request_id: Option<String>,
}

/// Serialized form of [`ApiError`].
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub message: String,
    pub status_code: u16,
    pub request_id: Option<String>,
}

impl ApiError {
    pub fn new(kind: ApiErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            request_id: None,
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Validation, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::NotFound, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Unauthorized, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Internal, message)
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    pub fn kind(&self) -> ApiErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn status(&self) -> StatusCode {
        self.kind.status()
    }

    pub fn body(&self) -> ErrorBody {
        let message = match self.kind {
            ApiErrorKind::Internal => INTERNAL_ERROR_MESSAGE.to_string(),
            _ => self.message.clone(),
        };
        ErrorBody {
            error: self.kind.code(),
            message,
            status_code: self.status().as_u16(),
            request_id: self.request_id.clone(),
        }
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotRegistered { .. } => Self::not_found(err.to_string()),
            other => Self::internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self.kind {
            ApiErrorKind::Internal => error!(error = %self.message, "Unexpected error"),
            _ => warn!(status = self.status().as_u16(), error = %self.message, "Request failed"),
        }

        let mut response = (self.status(), Json(self.body())).into_response();
        if self.kind == ApiErrorKind::Unauthorized {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_internal_message_is_hidden() {
        let err = ApiError::internal("connection refused at 10.0.0.3").with_request_id("abc");
        let body = err.body();
        assert_eq!(body.error, "InternalServerError");
        assert_eq!(body.message, INTERNAL_ERROR_MESSAGE);
        assert_eq!(body.status_code, 500);
        assert_eq!(body.request_id.as_deref(), Some("abc"));
    }

    #[test]
    fn test_validation_message_is_kept() {
        let body = ApiError::validation("limit must be a number").body();
        assert_eq!(body.status_code, 422);
        assert_eq!(body.message, "limit must be a number");
        assert!(body.request_id.is_none());
    }

    #[test]
    fn test_db_error_mapping() {
        let err: ApiError = DbError::not_registered("reports").into();
        assert_eq!(err.kind(), ApiErrorKind::NotFound);
        assert_eq!(err.message(), "Database 'reports' not registered");

        let err: ApiError = DbError::not_connected("main").into();
        assert_eq!(err.kind(), ApiErrorKind::Internal);
    }

    #[test]
    fn test_unauthorized_sets_challenge_header() {
        let response = ApiError::unauthorized("Authentication required").into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
            "Bearer"
        );
    }
}
