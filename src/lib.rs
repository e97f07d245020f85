//! API template library.
//!
//! An axum HTTP application skeleton whose core is a registry of named
//! database managers (SQL engine, generic driver, document store) that are
//! connected at startup, health-checked on demand and disconnected at
//! shutdown.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod server;
pub mod services;
pub mod utils;

pub use api::{AppState, build_router};
pub use config::Config;
pub use db::{DatabaseManager, DatabaseRegistry};
pub use error::{DbError, DbResult};
