//! Document-store manager (MongoDB).
//!
//! The driver is optional. Without the `mongodb` feature every connect
//! reports [`DbError::DriverUnavailable`], which the manager layer turns into
//! a logged skip so the application still starts.

use crate::db::manager::{ManagerCore, ManagerOptions};
use crate::error::{DbError, DbResult};
#[cfg(feature = "mongodb")]
use tokio::sync::RwLock;

#[derive(Debug)]
pub struct DocumentManager {
    pub(crate) core: ManagerCore,
    #[cfg(feature = "mongodb")]
    client: RwLock<Option<mongodb::Client>>,
}

impl DocumentManager {
    pub(crate) fn new(name: String, url: String, options: ManagerOptions) -> Self {
        Self {
            core: ManagerCore::new(name, url, options),
            #[cfg(feature = "mongodb")]
            client: RwLock::new(None),
        }
    }

    /// Database selected on the client.
    pub fn database_name(&self) -> &str {
        self.core.options.database_name_or_default()
    }
}

#[cfg(feature = "mongodb")]
impl DocumentManager {
    /// Clone of the live client (clients are reference counted).
    pub async fn client(&self) -> DbResult<mongodb::Client> {
        self.client
            .read()
            .await
            .clone()
            .ok_or_else(|| DbError::not_connected(&self.core.name))
    }

    /// Handle to the configured database.
    pub async fn database(&self) -> DbResult<mongodb::Database> {
        Ok(self.client().await?.database(self.database_name()))
    }

    pub(crate) async fn connect(&self) -> DbResult<()> {
        use mongodb::options::ClientOptions;

        let mut slot = self.client.write().await;
        if slot.is_some() {
            return Ok(());
        }

        let mut options = ClientOptions::parse(&self.core.connection_url).await?;
        options.server_selection_timeout = Some(self.core.options.connect_timeout);
        options.connect_timeout = Some(self.core.options.connect_timeout);
        if let Some(max) = self.core.options.pool.max_connections {
            options.max_pool_size = Some(max);
        }
        let client = mongodb::Client::with_options(options)?;

        if let Err(e) = ping(&client).await {
            client.shutdown().await;
            return Err(e);
        }

        *slot = Some(client);
        self.core.set_connected(true);
        Ok(())
    }

    pub(crate) async fn disconnect(&self) {
        let client = {
            let mut slot = self.client.write().await;
            self.core.set_connected(false);
            slot.take()
        };
        if let Some(client) = client {
            client.shutdown().await;
        }
    }

    pub(crate) async fn probe(&self) -> DbResult<()> {
        ping(&self.client().await?).await
    }
}

#[cfg(feature = "mongodb")]
async fn ping(client: &mongodb::Client) -> DbResult<()> {
    client
        .database("admin")
        .run_command(mongodb::bson::doc! { "ping": 1 })
        .await?;
    Ok(())
}

#[cfg(not(feature = "mongodb"))]
impl DocumentManager {
    pub(crate) async fn connect(&self) -> DbResult<()> {
        Err(DbError::driver_unavailable("MongoDB", "mongodb"))
    }

    pub(crate) async fn disconnect(&self) {
        self.core.set_connected(false);
    }

    pub(crate) async fn probe(&self) -> DbResult<()> {
        Err(DbError::not_connected(&self.core.name))
    }
}
