//! Placeholder bearer authentication.
//!
//! Any non-empty bearer token maps to a fixed mock user; no signature or
//! expiry is checked. Replace [`resolve_user`] with real token validation.

use crate::api::error::ApiError;
use crate::api::middleware::RequestId;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::{HeaderMap, header};
use serde::Serialize;
use std::convert::Infallible;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
}

impl User {
    fn placeholder() -> Self {
        Self {
            id: "user123".to_string(),
            username: "testuser".to_string(),
            email: "test@example.com".to_string(),
        }
    }
}

/// Optional authentication: `None` when no usable bearer token was sent.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Option<User>);

/// Required authentication: rejects with 401 when no user is present.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub User);

fn extract_bearer_token(headers: &HeaderMap) -> Result<Option<&str>, &'static str> {
    let Some(auth_header) = headers.get(header::AUTHORIZATION) else {
        return Ok(None);
    };

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Authorization header contains invalid characters")?;

    let Some(token) = auth_str.strip_prefix("Bearer ") else {
        return Err("Invalid Authorization header format. Expected 'Bearer <token>'");
    };

    let token = token.trim();
    if token.is_empty() {
        return Err("Bearer token is empty");
    }

    Ok(Some(token))
}

fn resolve_user(headers: &HeaderMap) -> Option<User> {
    match extract_bearer_token(headers) {
        Ok(Some(_token)) => Some(User::placeholder()),
        Ok(None) => None,
        Err(reason) => {
            debug!(reason, "Ignoring Authorization header");
            None
        }
    }
}

impl<S: Send + Sync> FromRequestParts<S> for CurrentUser {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(resolve_user(&parts.headers)))
    }
}

impl<S: Send + Sync> FromRequestParts<S> for AuthenticatedUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match resolve_user(&parts.headers) {
            Some(user) => Ok(Self(user)),
            None => {
                let request_id = parts
                    .extensions
                    .get::<RequestId>()
                    .cloned()
                    .unwrap_or_default();
                Err(ApiError::unauthorized("Authentication required").with_request_id(request_id.0))
            }
        }
    }
}
