use anyhow::Context;
use app_error::{AppError, AppErrorExt, AppResult};
use tracing::info;

use crate::Database;

/// Table and index definitions. The unique indexes are what arbitrate
/// concurrent duplicate writes, not application code.
pub const SCHEMA: &str = r#"
DEFINE TABLE IF NOT EXISTS users SCHEMALESS;
DEFINE INDEX IF NOT EXISTS users_username_unique ON TABLE users FIELDS username UNIQUE;
DEFINE TABLE IF NOT EXISTS favorites SCHEMALESS;
DEFINE INDEX IF NOT EXISTS favorites_user_symbol_unique ON TABLE favorites
    FIELDS user_id, symbol UNIQUE;
DEFINE INDEX IF NOT EXISTS favorites_user_id ON TABLE favorites FIELDS user_id;
"#;

pub async fn apply(db: &Database) -> AppResult<()> {
    db.client()
        .query(SCHEMA)
        .await
        .context("Failed to send schema definition")
        .db_err()?
        .check()
        .context("Failed to apply schema definition")
        .db_err()?;

    info!("Database schema applied");
    Ok(())
}

/// True when a write was refused by a UNIQUE index
pub fn is_unique_violation(error: &AppError) -> bool {
    match error {
        AppError::DatabaseError(err) => err
            .chain()
            .any(|cause| cause.to_string().contains("already contains")),
        _ => false,
    }
}

/// True when the datastore aborted a transaction because a concurrent one
/// touched the same keys. The write did not happen and can be reissued.
pub fn is_write_conflict(error: &AppError) -> bool {
    match error {
        AppError::DatabaseError(err) => err.chain().any(|cause| {
            let message = cause.to_string();
            message.contains("read or write conflict") || message.contains("can be retried")
        }),
        _ => false,
    }
}
