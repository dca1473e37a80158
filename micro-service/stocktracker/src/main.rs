use anyhow::Context;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{error, info};

use app_config::AppConfig;
use app_database::db_connect::initialize_db;
use app_error::AppError;
use app_middleware::SigningKey;
use micro_stocktracker::{routes, state::AppServices, telemetry};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let config = AppConfig::load()?;

    let _sentry_guard = telemetry::init_sentry(&config.monitoring.sentry);
    telemetry::init_tracing(&config.monitoring.logging)?;

    info!("Starting stock tracker at {}", chrono::Utc::now());
    info!("Environment: {}", config.environment);

    let db = initialize_db(&config.database).await?;

    // Never persisted: tokens from a previous run stop verifying
    let signing_key = SigningKey::generate()?;

    let services = AppServices::new(&config, db, &signing_key)?;
    let app = routes::create_routes(services, &config);

    let address = config.server.bind_address();
    let listener = TcpListener::bind(&address)
        .await
        .context(format!("Failed to bind to address: {}", address))?;

    info!("Server listening on http://{}", address);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => {
            error!("Failed to listen for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
