use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use surrealdb::sql::Thing;
use uuid::Uuid;

pub const USERS_TABLE: &str = "users";

/// A registered identity. `password_hash` is a PHC-format Argon2id digest.
#[derive(Serialize, Deserialize, Clone)]
pub struct User {
    #[serde(default = "User::generate_id")]
    pub id: Thing,
    pub username: String,
    pub password_hash: String,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl User {
    fn generate_id() -> Thing {
        Thing::from((USERS_TABLE.to_string(), Uuid::new_v4().to_string()))
    }

    pub fn new(username: String, password_hash: String) -> Self {
        Self {
            id: Self::generate_id(),
            username,
            password_hash,
            created_at: Utc::now(),
        }
    }

    /// Record key without the table prefix, used as the favorites foreign key
    pub fn record_key(&self) -> String {
        self.id.id.to_raw()
    }
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("password_hash", &"[REDACTED]")
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// Body of `POST /register` and `POST /login`
#[derive(Deserialize, Clone)]
pub struct CredentialsInput {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for CredentialsInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialsInput")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    #[serde(rename = "login-token")]
    pub token: String,
}
