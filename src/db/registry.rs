//! Registry of named database managers.
//!
//! Registration happens during startup and needs `&mut self`; afterwards the
//! registry is shared behind an `Arc` and only the `&self` bulk operations
//! and lookups are available. Bulk operations run every manager concurrently
//! and contain per-database failures: one unreachable database never stops
//! the others from connecting, disconnecting or reporting health.

use crate::db::kind::BackendKind;
use crate::db::manager::{DatabaseManager, ManagerOptions};
use crate::error::{DbError, DbResult};
use futures_util::future::join_all;
use std::collections::{BTreeMap, HashMap};
use tracing::{error, info, warn};

#[derive(Debug, Default)]
pub struct DatabaseRegistry {
    databases: HashMap<String, DatabaseManager>,
}

impl DatabaseRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `name` with the manager variant for `kind`.
    ///
    /// An existing entry under the same name is disconnected and replaced.
    pub async fn register(
        &mut self,
        name: &str,
        connection_url: &str,
        kind: BackendKind,
        options: ManagerOptions,
    ) -> DbResult<()> {
        let manager = DatabaseManager::new(name, connection_url, kind, options)?;

        if let Some(previous) = self.databases.remove(name) {
            warn!(
                database = %name,
                previous_backend = %previous.kind(),
                backend = %kind,
                "Database already registered, replacing it"
            );
            previous.disconnect().await;
        }

        info!(
            database = %name,
            backend = %kind,
            url = %manager.masked_url(),
            "Registered database"
        );
        self.databases.insert(name.to_string(), manager);
        Ok(())
    }

    pub async fn register_sql(
        &mut self,
        name: &str,
        connection_url: &str,
        options: ManagerOptions,
    ) -> DbResult<()> {
        self.register(name, connection_url, BackendKind::Sql, options)
            .await
    }

    pub async fn register_generic(
        &mut self,
        name: &str,
        connection_url: &str,
        options: ManagerOptions,
    ) -> DbResult<()> {
        self.register(name, connection_url, BackendKind::Generic, options)
            .await
    }

    pub async fn register_document(
        &mut self,
        name: &str,
        connection_url: &str,
        options: ManagerOptions,
    ) -> DbResult<()> {
        self.register(name, connection_url, BackendKind::Document, options)
            .await
    }

    /// Connect every registered database concurrently.
    ///
    /// Failures are logged by each manager and counted here; nothing is
    /// returned to the caller.
    pub async fn connect_all(&self) {
        if self.databases.is_empty() {
            info!("No databases registered, skipping connect");
            return;
        }

        let results = join_all(self.databases.values().map(|manager| async move {
            (manager.name(), manager.connect().await)
        }))
        .await;

        let failed = results.iter().filter(|(_, result)| result.is_err()).count();
        if failed > 0 {
            let names: Vec<&str> = results
                .iter()
                .filter(|(_, result)| result.is_err())
                .map(|(name, _)| *name)
                .collect();
            error!(failed = ?names, "Some databases failed to connect");
        }

        info!(
            "Connected to {}/{} databases",
            self.connected_count(),
            self.databases.len()
        );
    }

    /// Disconnect every connected database concurrently. Idempotent.
    pub async fn disconnect_all(&self) {
        let connected: Vec<&DatabaseManager> = self
            .databases
            .values()
            .filter(|manager| manager.is_connected())
            .collect();
        if connected.is_empty() {
            return;
        }

        let count = connected.len();
        join_all(connected.into_iter().map(|manager| manager.disconnect())).await;
        info!(count, "Disconnected databases");
    }

    /// Health of every registered database, keyed by name.
    pub async fn health_check_all(&self) -> BTreeMap<String, bool> {
        join_all(self.databases.iter().map(|(name, manager)| async move {
            (name.clone(), manager.health_check().await)
        }))
        .await
        .into_iter()
        .collect()
    }

    pub fn get(&self, name: &str) -> DbResult<&DatabaseManager> {
        self.databases
            .get(name)
            .ok_or_else(|| DbError::not_registered(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.databases.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.databases.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.databases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.databases.is_empty()
    }

    pub fn connected_count(&self) -> usize {
        self.databases
            .values()
            .filter(|manager| manager.is_connected())
            .count()
    }
}
