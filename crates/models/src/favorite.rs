use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::sql::Thing;
use uuid::Uuid;

pub const FAVORITES_TABLE: &str = "favorites";

/// A stock symbol in a user's portfolio
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Favorite {
    #[serde(default = "Favorite::generate_id")]
    pub id: Thing,
    pub user_id: String,
    pub symbol: String,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl Favorite {
    fn generate_id() -> Thing {
        Thing::from((FAVORITES_TABLE.to_string(), Uuid::new_v4().to_string()))
    }

    pub fn new(user_id: String, symbol: String) -> Self {
        Self {
            id: Self::generate_id(),
            user_id,
            symbol,
            created_at: Utc::now(),
        }
    }
}

/// Body of `POST /add-favorite`
#[derive(Debug, Deserialize)]
pub struct AddFavoriteInput {
    pub symbol: String,
}

// API representation of a favorite
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct FavoriteView {
    pub id: String,
    pub user_id: String,
    pub symbol: String,
    pub created_at: DateTime<Utc>,
}

impl From<Favorite> for FavoriteView {
    fn from(favorite: Favorite) -> Self {
        Self {
            id: favorite.id.id.to_raw(),
            user_id: favorite.user_id,
            symbol: favorite.symbol,
            created_at: favorite.created_at,
        }
    }
}
