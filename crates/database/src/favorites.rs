use app_error::{AppError, AppResult};
use app_models::favorite::{FAVORITES_TABLE, Favorite};
use std::sync::Arc;

use crate::{Database, schema::is_unique_violation, service::DbService};

pub struct FavoriteStore {
    favorites: DbService<Favorite>,
}

impl FavoriteStore {
    pub fn new(db: Arc<Database>) -> Self {
        Self {
            favorites: DbService::new(db, FAVORITES_TABLE),
        }
    }

    /// Returns `false` when the symbol was already in the portfolio.
    /// Concurrent adds of the same symbol settle on one record.
    pub async fn add(&self, user_id: &str, symbol: &str) -> AppResult<bool> {
        let favorite = Favorite::new(user_id.to_string(), symbol.to_string());

        match self.favorites.create_record_with_retry(favorite).await {
            Ok(_) => Ok(true),
            Err(e) if is_unique_violation(&e) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Favorites of one user, oldest first
    pub async fn list(&self, user_id: &str) -> AppResult<Vec<Favorite>> {
        let mut favorites = self
            .favorites
            .get_records_by_field("user_id", user_id.to_string())
            .await?;
        favorites.sort_by_key(|f| f.created_at);
        Ok(favorites)
    }

    /// Returns `false` when nothing matched
    pub async fn remove(&self, user_id: &str, symbol: &str) -> AppResult<bool> {
        let sql = format!(
            "DELETE {} WHERE user_id = $user_id AND symbol = $symbol RETURN BEFORE",
            self.favorites.table_name()
        );

        let removed: Vec<Favorite> = self
            .favorites
            .database()
            .query(sql)
            .bind(("user_id", user_id.to_string()))
            .bind(("symbol", symbol.to_string()))
            .execute()
            .await?
            .take(0)
            .map_err(|e| match e {
                AppError::DatabaseError(err) => {
                    AppError::DatabaseError(err.context("Failed to delete favorite"))
                }
                other => other,
            })?;

        Ok(!removed.is_empty())
    }
}
