//! Database dispatch macros for reducing code duplication.
//!
//! The SQL-engine manager keeps one concrete sqlx pool per dialect. These
//! macros expand the per-dialect match arms at compile time so every
//! operation reads as a single expression.

/// Macro for generating `DbPool` dispatch match arms.
///
/// # Example
///
/// ```ignore
/// impl_db_dispatch!(&pool, {
///     MySql(p) => sqlx::query("SELECT 1").execute(p).await.map(|_| ()),
///     Postgres(p) => sqlx::query("SELECT 1").execute(p).await.map(|_| ()),
///     SQLite(p) => sqlx::query("SELECT 1").execute(p).await.map(|_| ()),
/// });
/// ```
#[macro_export]
macro_rules! impl_db_dispatch {
    ($pool:expr, { $($variant:ident($p:ident) => $body:expr),+ $(,)? }) => {
        match $pool {
            $(
                $crate::db::sql::DbPool::$variant($p) => $body,
            )+
        }
    };
}

/// Same as [`impl_db_dispatch!`] for `Session` transactions.
#[macro_export]
macro_rules! impl_session_dispatch {
    ($session:expr, { $($variant:ident($tx:ident) => $body:expr),+ $(,)? }) => {
        match $session {
            $(
                $crate::db::sql::Session::$variant($tx) => $body,
            )+
        }
    };
}
