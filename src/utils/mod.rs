//! Small helpers shared by handlers and services.

pub mod helpers;
pub mod security;

pub use helpers::{DEFAULT_MAX_LIMIT, Pagination, deep_merge, normalize_pagination};
pub use security::{generate_random_string, hash_string};
