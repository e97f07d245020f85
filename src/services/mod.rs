//! Application services with lifecycle hooks.
//!
//! Stateless helpers are plain structs. Services that hold connections or
//! other resources implement [`StatefulService`] and are listed in
//! [`AppServices::stateful`] so they get initialized after the databases
//! connect and cleaned up before the databases disconnect.

pub mod cache;

pub use cache::{CacheService, InMemoryCache};

use crate::config::Config;
use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;
use tracing::{error, info};

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Service '{service}' failed to initialize: {message}")]
    Initialize { service: String, message: String },

    #[error("Service '{service}' failed to clean up: {message}")]
    Cleanup { service: String, message: String },

    #[error("Service '{service}' is not initialized")]
    NotInitialized { service: String },
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// A service that owns resources across the application lifetime.
#[async_trait]
pub trait StatefulService: Send + Sync {
    fn name(&self) -> &str;

    /// Called once at startup, after databases are connected.
    async fn initialize(&self) -> ServiceResult<()>;

    /// Called once at shutdown, before databases are disconnected.
    async fn cleanup(&self) -> ServiceResult<()>;

    async fn health_check(&self) -> bool;
}

/// Typed service container shared through the application state.
#[derive(Debug)]
pub struct AppServices {
    pub cache: Arc<InMemoryCache>,
    initialized: AtomicBool,
}

impl AppServices {
    pub fn new(_config: &Config) -> Self {
        Self {
            cache: Arc::new(InMemoryCache::new()),
            initialized: AtomicBool::new(false),
        }
    }

    /// Services with lifecycle hooks, in initialization order.
    pub fn stateful(&self) -> Vec<&dyn StatefulService> {
        vec![self.cache.as_ref()]
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Acquire)
    }

    /// Initialize every stateful service. A failing service is logged and
    /// does not stop the others. Idempotent.
    pub async fn initialize_all(&self) {
        if self.initialized.swap(true, Ordering::AcqRel) {
            return;
        }

        info!("Initializing application services");
        for service in self.stateful() {
            match service.initialize().await {
                Ok(()) => info!(service = %service.name(), "Service initialized"),
                Err(e) => error!(service = %service.name(), error = %e, "Failed to initialize service"),
            }
        }
        info!("Service initialization complete");
    }

    /// Clean up every stateful service in reverse order. Idempotent.
    pub async fn cleanup_all(&self) {
        if !self.initialized.swap(false, Ordering::AcqRel) {
            return;
        }

        info!("Cleaning up application services");
        for service in self.stateful().into_iter().rev() {
            match service.cleanup().await {
                Ok(()) => info!(service = %service.name(), "Service cleaned up"),
                Err(e) => error!(service = %service.name(), error = %e, "Failed to clean up service"),
            }
        }
        info!("Service cleanup complete");
    }
}
