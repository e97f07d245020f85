//! Generic-driver manager built on the sqlx `Any` driver.
//!
//! Used for URLs whose scheme no dedicated backend claims; the concrete
//! driver is picked at runtime from the installed `Any` drivers.

use crate::db::manager::{ManagerCore, ManagerOptions};
use crate::error::{DbError, DbResult};
use sqlx::any::{AnyConnectOptions, AnyPoolOptions};
use sqlx::{AnyPool, ConnectOptions};
use std::str::FromStr;
use std::time::Duration;
use tokio::sync::RwLock;

#[derive(Debug)]
pub struct GenericManager {
    pub(crate) core: ManagerCore,
    pool: RwLock<Option<AnyPool>>,
}

impl GenericManager {
    pub(crate) fn new(name: String, url: String, options: ManagerOptions) -> Self {
        Self {
            core: ManagerCore::new(name, url, options),
            pool: RwLock::new(None),
        }
    }

    /// Clone of the live pool.
    pub async fn pool(&self) -> DbResult<AnyPool> {
        self.pool
            .read()
            .await
            .clone()
            .ok_or_else(|| DbError::not_connected(&self.core.name))
    }

    pub(crate) async fn connect(&self) -> DbResult<()> {
        let mut slot = self.pool.write().await;
        if slot.is_some() {
            return Ok(());
        }

        // Idempotent; registers every driver compiled into sqlx.
        sqlx::any::install_default_drivers();

        let url = self.core.connection_url.as_str();
        let opts = &self.core.options.pool;
        let is_sqlite = url.starts_with("sqlite:");

        let mut options = AnyConnectOptions::from_str(url).map_err(|e| {
            DbError::connection(
                format!("Unsupported connection string: {}", e),
                "The generic driver supports postgres, mysql and sqlite URLs",
            )
        })?;
        if !self.core.options.log_statements {
            options = options.disable_statement_logging();
        }

        let pool = AnyPoolOptions::new()
            .min_connections(opts.min_connections_or_default())
            .max_connections(opts.max_connections_or_default(is_sqlite))
            .acquire_timeout(self.core.acquire_timeout())
            .idle_timeout(Some(Duration::from_secs(opts.idle_timeout_or_default())))
            .test_before_acquire(opts.test_before_acquire_or_default())
            .connect_with(options)
            .await
            .map_err(|e| {
                DbError::connection(
                    format!("Failed to connect: {}", e),
                    "Check that the database server is running and the URL is correct",
                )
            })?;

        if let Err(e) = ping(&pool).await {
            pool.close().await;
            return Err(e.with_timeout_limit(self.core.acquire_timeout()));
        }

        *slot = Some(pool);
        self.core.set_connected(true);
        Ok(())
    }

    pub(crate) async fn disconnect(&self) {
        let pool = {
            let mut slot = self.pool.write().await;
            self.core.set_connected(false);
            slot.take()
        };
        if let Some(pool) = pool {
            pool.close().await;
        }
    }

    pub(crate) async fn probe(&self) -> DbResult<()> {
        ping(&self.pool().await?)
            .await
            .map_err(|e| e.with_timeout_limit(self.core.acquire_timeout()))
    }
}

async fn ping(pool: &AnyPool) -> DbResult<()> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_connect_and_query_through_any_driver() {
        let manager = GenericManager::new(
            "any".to_string(),
            "sqlite::memory:".to_string(),
            ManagerOptions::default(),
        );
        manager.connect().await.unwrap();

        let pool = manager.pool().await.unwrap();
        let value: i64 = sqlx::query_scalar("SELECT 41 + 1")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(value, 42);

        manager.disconnect().await;
        assert!(manager.pool().await.is_err());
    }

    #[tokio::test]
    async fn test_unknown_scheme_fails_to_connect() {
        let manager = GenericManager::new(
            "odd".to_string(),
            "cockroach://localhost:26257/db".to_string(),
            ManagerOptions::default(),
        );
        assert!(manager.connect().await.is_err());
        assert!(!manager.core.is_connected());
    }
}
