//! API template - main entry point.
//!
//! Startup: load `.env`, parse and validate configuration, set up logging,
//! register and connect databases, initialize services, then serve until a
//! shutdown signal. Shutdown runs the same steps in reverse.

use api_template::api::{AppState, build_router};
use api_template::config::Config;
use api_template::db::configure_databases;
use api_template::logging::init_tracing;
use api_template::server::HttpServer;
use api_template::services::AppServices;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A missing .env file is fine
    dotenv::dotenv().ok();

    let config = Config::parse_args();
    if let Err(e) = config.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(2);
    }

    init_tracing(&config);

    info!(
        environment = %config.environment,
        "Starting {} v{}",
        config.app_name,
        env!("CARGO_PKG_VERSION")
    );

    let databases = match configure_databases(&config).await {
        Ok(registry) => registry,
        Err(e) => {
            error!(error = %e, "Failed to configure databases");
            return Err(e.into());
        }
    };
    databases.connect_all().await;

    let services = AppServices::new(&config);
    services.initialize_all().await;

    let bind_addr = config.bind_addr();
    let state = AppState::new(config, databases, services);
    let router = build_router(state.clone());

    let result = match HttpServer::bind(&bind_addr, router).await {
        Ok(server) => server.run().await,
        Err(e) => Err(e),
    };

    info!("Shutting down");
    state.services.cleanup_all().await;
    state.databases.disconnect_all().await;

    if let Err(e) = result {
        error!(error = %e, "Server error");
        return Err(e.into());
    }

    info!("Shutdown complete");
    Ok(())
}
