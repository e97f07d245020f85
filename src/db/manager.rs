//! Database manager: lifecycle of one named database connection.
//!
//! A manager is one of three variants, chosen when the database is registered:
//!
//! - [`SqlManager`]: dialect-specific sqlx pools with scoped sessions
//! - [`GenericManager`]: the sqlx `Any` driver
//! - [`DocumentManager`]: a MongoDB client (behind the `mongodb` feature)
//!
//! The variants only know how to open, probe and close their handle. The
//! policy shared by all of them lives here: connect timeouts, treating a
//! missing driver as "skip this backend", logging, and converting every
//! health-check failure into `false`.

use crate::config::PoolOptions;
use crate::db::document::DocumentManager;
use crate::db::generic::GenericManager;
use crate::db::kind::{self, BackendKind};
use crate::db::sql::SqlManager;
use crate::error::{DbError, DbResult};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Database name used by the document store when none is configured.
pub const DEFAULT_DOCUMENT_DATABASE: &str = "main";

/// Variant-independent options for a manager.
#[derive(Debug, Clone)]
pub struct ManagerOptions {
    pub pool: PoolOptions,
    /// Database selected on the document-store client (default: "main").
    pub database_name: Option<String>,
    /// Log every SQL statement at debug level.
    pub log_statements: bool,
    /// Bounds pool/client creation plus the first liveness probe.
    pub connect_timeout: Duration,
    /// Bounds each health-check probe.
    pub probe_timeout: Duration,
}

impl ManagerOptions {
    pub fn with_pool(mut self, pool: PoolOptions) -> Self {
        self.pool = pool;
        self
    }

    pub fn with_database_name(mut self, database_name: impl Into<String>) -> Self {
        self.database_name = Some(database_name.into());
        self
    }

    pub fn database_name_or_default(&self) -> &str {
        self.database_name
            .as_deref()
            .unwrap_or(DEFAULT_DOCUMENT_DATABASE)
    }
}

impl Default for ManagerOptions {
    fn default() -> Self {
        Self {
            pool: PoolOptions::default(),
            database_name: None,
            log_statements: false,
            connect_timeout: Duration::from_secs(crate::config::DEFAULT_CONNECT_TIMEOUT_SECS),
            probe_timeout: Duration::from_secs(crate::config::DEFAULT_HEALTH_CHECK_TIMEOUT_SECS),
        }
    }
}

/// State shared by every manager variant.
#[derive(Debug)]
pub(crate) struct ManagerCore {
    pub(crate) name: String,
    pub(crate) connection_url: String,
    pub(crate) options: ManagerOptions,
    connected: AtomicBool,
}

impl ManagerCore {
    pub(crate) fn new(name: String, connection_url: String, options: ManagerOptions) -> Self {
        Self {
            name,
            connection_url,
            options,
            connected: AtomicBool::new(false),
        }
    }

    pub(crate) fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    /// Configured pool acquire timeout.
    pub(crate) fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.options.pool.acquire_timeout_or_default())
    }

    /// Only called while the variant holds the write lock on its handle.
    pub(crate) fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::Release);
    }
}

/// Lifecycle owner of one named database.
#[derive(Debug)]
pub enum DatabaseManager {
    Sql(SqlManager),
    Generic(GenericManager),
    Document(DocumentManager),
}

impl DatabaseManager {
    /// Build the variant for `kind`. The URL is normalized but no connection
    /// is attempted.
    pub fn new(
        name: impl Into<String>,
        connection_url: &str,
        kind: BackendKind,
        options: ManagerOptions,
    ) -> DbResult<Self> {
        let name = name.into();
        let url = kind::normalize_url(connection_url)?;
        let manager = match kind {
            BackendKind::Sql => Self::Sql(SqlManager::new(name, url, options)?),
            BackendKind::Generic => Self::Generic(GenericManager::new(name, url, options)),
            BackendKind::Document => Self::Document(DocumentManager::new(name, url, options)),
        };
        Ok(manager)
    }

    fn core(&self) -> &ManagerCore {
        match self {
            Self::Sql(m) => &m.core,
            Self::Generic(m) => &m.core,
            Self::Document(m) => &m.core,
        }
    }

    pub fn name(&self) -> &str {
        &self.core().name
    }

    /// Contains credentials - use [`masked_url`](Self::masked_url) for logs.
    pub fn connection_url(&self) -> &str {
        &self.core().connection_url
    }

    pub fn masked_url(&self) -> String {
        kind::mask_password(self.connection_url())
    }

    pub fn options(&self) -> &ManagerOptions {
        &self.core().options
    }

    pub fn kind(&self) -> BackendKind {
        match self {
            Self::Sql(_) => BackendKind::Sql,
            Self::Generic(_) => BackendKind::Generic,
            Self::Document(_) => BackendKind::Document,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.core().is_connected()
    }

    pub fn as_sql(&self) -> Option<&SqlManager> {
        match self {
            Self::Sql(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_generic(&self) -> Option<&GenericManager> {
        match self {
            Self::Generic(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_document(&self) -> Option<&DocumentManager> {
        match self {
            Self::Document(m) => Some(m),
            _ => None,
        }
    }

    /// Open the connection and run one liveness probe.
    ///
    /// A backend whose driver is not compiled in is skipped with a warning
    /// and `Ok(())`; the manager stays disconnected. Every other failure is
    /// logged and returned.
    pub async fn connect(&self) -> DbResult<()> {
        if self.is_connected() {
            debug!(database = %self.name(), "Database already connected");
            return Ok(());
        }

        let timeout = self.options().connect_timeout;
        let attempt = async {
            match self {
                Self::Sql(m) => m.connect().await,
                Self::Generic(m) => m.connect().await,
                Self::Document(m) => m.connect().await,
            }
        };
        let result = match tokio::time::timeout(timeout, attempt).await {
            Ok(result) => result,
            Err(_) => Err(DbError::timeout("connect", timeout)),
        };

        match result {
            Ok(()) => {
                info!(
                    database = %self.name(),
                    backend = %self.kind(),
                    url = %self.masked_url(),
                    "Database connected successfully"
                );
                Ok(())
            }
            Err(e) if e.is_driver_unavailable() => {
                warn!(
                    database = %self.name(),
                    backend = %self.kind(),
                    reason = %e,
                    "Driver not installed, skipping database"
                );
                Ok(())
            }
            Err(e) => {
                error!(
                    database = %self.name(),
                    backend = %self.kind(),
                    error = %e,
                    "Failed to connect to database"
                );
                Err(e)
            }
        }
    }

    /// Release the connection. No-op when not connected; never fails.
    pub async fn disconnect(&self) {
        if !self.is_connected() {
            return;
        }

        let timeout = self.options().connect_timeout;
        let closing = async {
            match self {
                Self::Sql(m) => m.disconnect().await,
                Self::Generic(m) => m.disconnect().await,
                Self::Document(m) => m.disconnect().await,
            }
        };
        if tokio::time::timeout(timeout, closing).await.is_err() {
            // The handle was already taken out of the manager; dropping the
            // close future abandons whatever connections are still busy.
            warn!(
                database = %self.name(),
                timeout_ms = timeout.as_millis() as u64,
                "Timed out waiting for connections to close"
            );
            self.core().set_connected(false);
        }
        info!(database = %self.name(), backend = %self.kind(), "Database disconnected");
    }

    /// Re-run the liveness probe. Any error or timeout reports `false`.
    pub async fn health_check(&self) -> bool {
        if !self.is_connected() {
            return false;
        }

        let timeout = self.options().probe_timeout;
        let probe = async {
            match self {
                Self::Sql(m) => m.probe().await,
                Self::Generic(m) => m.probe().await,
                Self::Document(m) => m.probe().await,
            }
        };
        match tokio::time::timeout(timeout, probe).await {
            Ok(Ok(())) => true,
            Ok(Err(e)) => {
                warn!(database = %self.name(), error = %e, "Database health check failed");
                false
            }
            Err(_) => {
                warn!(
                    database = %self.name(),
                    timeout_ms = timeout.as_millis() as u64,
                    "Database health check timed out"
                );
                false
            }
        }
    }
}
