//! Configuration for the stock tracker services.
//!
//! Settings come from a JSON document (embedded default or the file named by
//! `APP_CONFIG_PATH`) with a handful of environment overrides on top. The JWT
//! signing key is intentionally absent: it is generated per process.

use std::fmt;

mod config_loader;
pub use config_loader::*;

/// Path of a JSON config file replacing the embedded default
pub const CONFIG_PATH_ENV: &str = "APP_CONFIG_PATH";
/// Quote API key override
pub const API_KEY_ENV: &str = "FINNHUB_API_KEY";
pub const SERVER_PORT_ENV: &str = "SERVER_PORT";
pub const DATABASE_ENDPOINT_ENV: &str = "DATABASE_ENDPOINT";

impl AppConfig {
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl DatabaseConfig {
    /// Remote engines need a root sign-in; embedded ones do not.
    pub fn is_remote(&self) -> bool {
        ["ws://", "wss://", "http://", "https://"]
            .iter()
            .any(|scheme| self.endpoint.starts_with(scheme))
    }
}

// Don't accidentally log credentials
impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("endpoint", &self.endpoint)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("namespace", &self.namespace)
            .field("database", &self.database)
            .finish()
    }
}

impl fmt::Debug for QuotesConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuotesConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .field("symbols", &self.symbols)
            .finish()
    }
}
