//! Response bodies.

use crate::api::auth::User;
use crate::config::Environment;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Serialize)]
pub struct ApiInfoResponse {
    pub name: String,
    pub version: &'static str,
    pub environment: Environment,
    pub api_version: &'static str,
    pub api_prefix: String,
}

/// Either the per-database health map or a marker when nothing is registered.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum DatabaseHealth {
    Checked(BTreeMap<String, bool>),
    Unconfigured { status: &'static str },
}

impl DatabaseHealth {
    pub fn from_checks(checks: BTreeMap<String, bool>) -> Self {
        if checks.is_empty() {
            Self::Unconfigured {
                status: "no databases configured",
            }
        } else {
            Self::Checked(checks)
        }
    }

    pub fn all_healthy(&self) -> bool {
        match self {
            Self::Checked(checks) => checks.values().all(|healthy| *healthy),
            Self::Unconfigured { .. } => true,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// "healthy" or "degraded"
    pub status: &'static str,
    /// RFC 3339, UTC
    pub timestamp: String,
    pub uptime: &'static str,
    pub uptime_secs: u64,
    pub databases: DatabaseHealth,
}

#[derive(Debug, Serialize)]
pub struct ExampleResponse {
    pub message: &'static str,
    pub environment: Environment,
    pub authenticated: bool,
    pub user_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ProtectedResponse {
    pub message: &'static str,
    pub user: User,
    pub environment: Environment,
}

#[derive(Debug, Clone, Serialize)]
pub struct ItemModel {
    pub id: i64,
    pub name: String,
    pub created_at: String,
}

#[derive(Debug, Serialize)]
pub struct ItemsListResponse {
    pub items: Vec<ItemModel>,
    pub total: usize,
    pub skip: i64,
    pub limit: i64,
    pub sort_by: String,
    pub sort_order: String,
    pub user_authenticated: bool,
}
