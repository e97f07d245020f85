//! Startup wiring: settings to registrations.

use crate::config::{Config, DEFAULT_SQLITE_DIR, DEFAULT_SQLITE_URL, DatabaseSpec, MAIN_DATABASE};
use crate::db::kind::{self, BackendKind};
use crate::db::registry::DatabaseRegistry;
use crate::error::{DbError, DbResult};
use tracing::{info, warn};

/// Build the registry from configuration. Nothing is connected yet.
///
/// With database support disabled the registry is empty. Otherwise `main`
/// is registered from `DATABASE_URL` (or a local SQLite file under `temp/`
/// when unset), followed by every `--database` spec.
pub async fn configure_databases(config: &Config) -> DbResult<DatabaseRegistry> {
    let mut registry = DatabaseRegistry::new();

    if !config.use_database {
        if !config.databases.is_empty() {
            warn!(
                count = config.databases.len(),
                "Additional databases configured but USE_DATABASE is false, ignoring them"
            );
        }
        info!("Database support disabled");
        return Ok(registry);
    }

    let options = config.manager_options();

    match config.database_url.as_deref() {
        Some(url) => {
            let kind = resolve_logged(MAIN_DATABASE, url)?;
            let mut main_options = options.clone();
            if kind == BackendKind::Document {
                if let Some(name) = url_database_name(url) {
                    main_options = main_options.with_database_name(name);
                }
            }
            registry
                .register(MAIN_DATABASE, url, kind, main_options)
                .await?;
        }
        None => {
            std::fs::create_dir_all(DEFAULT_SQLITE_DIR).map_err(|e| {
                DbError::internal(format!(
                    "Failed to create directory '{}': {}",
                    DEFAULT_SQLITE_DIR, e
                ))
            })?;
            info!(url = DEFAULT_SQLITE_URL, "DATABASE_URL not set, using local SQLite");
            registry
                .register_sql(MAIN_DATABASE, DEFAULT_SQLITE_URL, options.clone())
                .await?;
        }
    }

    let specs = config.parse_databases().map_err(DbError::invalid_input)?;
    for spec in specs {
        register_spec(&mut registry, spec, config).await?;
    }

    Ok(registry)
}

async fn register_spec(
    registry: &mut DatabaseRegistry,
    spec: DatabaseSpec,
    config: &Config,
) -> DbResult<()> {
    if registry.contains(&spec.name) {
        return Err(DbError::invalid_input(format!(
            "Database '{}' is configured more than once",
            spec.name
        )));
    }

    let kind = match spec.backend {
        Some(kind) => kind,
        None => resolve_logged(&spec.name, &spec.connection_url)?,
    };

    let mut options = config.manager_options().with_pool(spec.pool_options);
    if let Some(database) = spec.database {
        options = options.with_database_name(database);
    }

    registry
        .register(&spec.name, &spec.connection_url, kind, options)
        .await
}

fn resolve_logged(name: &str, url: &str) -> DbResult<BackendKind> {
    let resolution = BackendKind::resolve(url)?;
    if resolution.fallback {
        warn!(
            database = %name,
            backend = %resolution.kind,
            "No dedicated backend for URL scheme, using the generic driver"
        );
    }
    Ok(resolution.kind)
}

fn url_database_name(url: &str) -> Option<String> {
    if !url.contains("://") {
        return None;
    }
    kind::url_path(url)?
        .trim_start_matches('/')
        .split('/')
        .next()
        .filter(|s| !s.is_empty())
        .map(String::from)
}
