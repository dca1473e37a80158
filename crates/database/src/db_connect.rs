use app_config::DatabaseConfig;
use app_error::AppError;
use std::sync::Arc;

use crate::{Database, service::DbCredentials};

pub async fn initialize_db(db_config: &DatabaseConfig) -> Result<Arc<Database>, AppError> {
    tracing::debug!("Connecting to SurrealDB: {}", db_config.endpoint);

    if db_config.endpoint.starts_with("wss://") || db_config.endpoint.starts_with("https://") {
        tracing::info!("Using secure TLS connection to database");
    } else if db_config.is_remote() {
        tracing::warn!("Using non-secure database connection");
    }

    // Embedded engines have no users to sign in as
    let credentials = db_config
        .is_remote()
        .then(|| DbCredentials::new(db_config.username.clone(), db_config.password.clone()));

    let db = Database::initialize(
        &db_config.endpoint,
        &db_config.namespace,
        &db_config.database,
        credentials.as_ref(),
    )
    .await?;

    tracing::info!("Successfully connected to SurrealDB at {}", db_config.endpoint);

    Ok(Arc::new(db))
}

pub async fn initialize_memory_db() -> Result<Arc<Database>, AppError> {
    let db = Database::initialize_memory_db("stocktracker", "portfolio").await?;

    tracing::info!("Successfully connected to in-memory SurrealDB");

    Ok(Arc::new(db))
}
