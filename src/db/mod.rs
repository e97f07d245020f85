//! Database layer.
//!
//! - Backend selection by URL scheme
//! - Database managers (SQL engine, generic driver, document store)
//! - The registry of named managers and its startup wiring
//! - Dispatch macros for the dialect-specific pool and session enums

#[macro_use]
pub mod macros;
pub mod document;
pub mod generic;
pub mod kind;
pub mod manager;
pub mod registry;
pub mod setup;
pub mod sql;

pub use document::DocumentManager;
pub use generic::GenericManager;
pub use kind::{BackendKind, Resolution, SqlDialect, mask_password, normalize_url, url_path};
pub use manager::{DatabaseManager, ManagerOptions};
pub use registry::DatabaseRegistry;
pub use setup::configure_databases;
pub use sql::{DbPool, Session, SqlManager};
