use app_error::{AppError, AppResult};
use app_models::user::{USERS_TABLE, User};
use std::sync::Arc;
use tracing::{debug, info};

use crate::{Database, schema::is_unique_violation, service::DbService};

/// Persistent username -> password digest mapping
pub struct CredentialStore {
    users: DbService<User>,
}

impl CredentialStore {
    pub fn new(db: Arc<Database>) -> Self {
        Self {
            users: DbService::new(db, USERS_TABLE),
        }
    }

    /// Insert a new identity. Fails with `ResourceExistsError` when the
    /// username is taken, as decided by the unique index. Transaction
    /// conflicts with a concurrent registration are retried until the index
    /// gives a definite answer.
    pub async fn create(&self, username: &str, password_hash: &str) -> AppResult<User> {
        let user = User::new(username.to_string(), password_hash.to_string());

        match self.users.create_record_with_retry(user).await {
            Ok(Some(stored)) => {
                info!("Stored new user: {}", stored.username);
                Ok(stored)
            }
            Ok(None) => Err(AppError::DatabaseError(anyhow::anyhow!(
                "Database did not return the stored user"
            ))),
            Err(e) if is_unique_violation(&e) => {
                debug!("Registration refused, username exists: {}", username);
                Err(AppError::username_taken())
            }
            Err(e) => Err(e),
        }
    }

    pub async fn find_by_username(&self, username: &str) -> AppResult<User> {
        self.users
            .get_records_by_field("username", username.to_string())
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AppError::resource_not_found("User"))
    }
}
