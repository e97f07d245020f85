//! Error types for the database layer.
//!
//! This module defines all database error types using `thiserror`. Every
//! failure inside a manager is expressed as a `DbError`; the registry decides
//! which of them reach the caller (only lookups do) and which are contained
//! and logged.

use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Connection failed: {message}")]
    Connection { message: String, suggestion: String },

    #[error("Database error: {message}")]
    Database {
        message: String,
        /// e.g., "42P01" for undefined table
        sql_state: Option<String>,
        suggestion: String,
    },

    #[error("Timeout: {operation} exceeded {}", describe_limit(.limit))]
    Timeout {
        operation: String,
        /// Unknown when the error came straight from the driver.
        limit: Option<Duration>,
    },

    #[error("Database '{name}' not registered")]
    NotRegistered { name: String },

    #[error("Database '{name}' not connected")]
    NotConnected { name: String },

    #[error("Driver unavailable: {backend} support is not compiled in (enable the '{feature}' feature)")]
    DriverUnavailable {
        backend: &'static str,
        feature: &'static str,
    },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DbError {
    /// Create a connection error with a helpful suggestion.
    pub fn connection(message: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
            suggestion: suggestion.into(),
        }
    }

    /// Create a database error with optional SQL state.
    pub fn database(
        message: impl Into<String>,
        sql_state: Option<String>,
        suggestion: impl Into<String>,
    ) -> Self {
        Self::Database {
            message: message.into(),
            sql_state,
            suggestion: suggestion.into(),
        }
    }

    pub fn timeout(operation: impl Into<String>, limit: Duration) -> Self {
        Self::Timeout {
            operation: operation.into(),
            limit: Some(limit),
        }
    }

    /// Fill in the configured limit of a timeout raised by the driver.
    pub fn with_timeout_limit(self, limit: Duration) -> Self {
        match self {
            Self::Timeout {
                operation,
                limit: None,
            } => Self::Timeout {
                operation,
                limit: Some(limit),
            },
            other => other,
        }
    }

    pub fn not_registered(name: impl Into<String>) -> Self {
        Self::NotRegistered { name: name.into() }
    }

    pub fn not_connected(name: impl Into<String>) -> Self {
        Self::NotConnected { name: name.into() }
    }

    pub fn driver_unavailable(backend: &'static str, feature: &'static str) -> Self {
        Self::DriverUnavailable { backend, feature }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Get the suggestion for this error, if available.
    pub fn suggestion(&self) -> Option<&str> {
        match self {
            Self::Connection { suggestion, .. } => Some(suggestion),
            Self::Database { suggestion, .. } => Some(suggestion),
            _ => None,
        }
    }

    /// True when the backend library is simply not built in. Managers treat
    /// this as "skip the backend" rather than a connect failure.
    pub fn is_driver_unavailable(&self) -> bool {
        matches!(self, Self::DriverUnavailable { .. })
    }
}

/// Convert sqlx errors to DbError.
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Configuration(msg) => DbError::connection(
                msg.to_string(),
                "Check the connection string format and credentials",
            ),
            sqlx::Error::Database(db_err) => {
                let code = db_err.code().map(|c| c.to_string());
                DbError::database(
                    db_err.message(),
                    code,
                    "Check the SQL syntax and referenced objects",
                )
            }
            sqlx::Error::RowNotFound => DbError::database(
                "No rows returned",
                None,
                "Verify the query conditions match existing data",
            ),
            sqlx::Error::PoolTimedOut => DbError::Timeout {
                operation: "connection pool acquire".to_string(),
                limit: None,
            },
            sqlx::Error::PoolClosed => {
                DbError::connection("Connection pool is closed", "Reconnect to the database")
            }
            sqlx::Error::Io(io_err) => DbError::connection(
                format!("I/O error: {}", io_err),
                "Check network connectivity and database server status",
            ),
            sqlx::Error::Tls(tls_err) => DbError::connection(
                format!("TLS error: {}", tls_err),
                "Verify TLS configuration and certificates",
            ),
            sqlx::Error::Protocol(msg) => DbError::connection(
                format!("Protocol error: {}", msg),
                "Check database server compatibility",
            ),
            sqlx::Error::AnyDriverError(err) => DbError::connection(
                format!("Driver error: {}", err),
                "Check that the URL scheme is supported by the generic driver",
            ),
            sqlx::Error::WorkerCrashed => DbError::internal("Database worker crashed"),
            _ => DbError::internal(format!("Unknown database error: {}", err)),
        }
    }
}

#[cfg(feature = "mongodb")]
impl From<mongodb::error::Error> for DbError {
    fn from(err: mongodb::error::Error) -> Self {
        DbError::connection(
            format!("MongoDB error: {}", err),
            "Check that the MongoDB server is reachable and the URI is valid",
        )
    }
}

fn describe_limit(limit: &Option<Duration>) -> String {
    match limit {
        Some(limit) => format!("{}ms", limit.as_millis()),
        None => "its time limit".to_string(),
    }
}

/// Result type alias for database operations.
pub type DbResult<T> = Result<T, DbError>;
