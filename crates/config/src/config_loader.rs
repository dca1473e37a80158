use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};
use tracing::{debug, info, warn};

use app_error::{AppError, AppResult};

use crate::{API_KEY_ENV, CONFIG_PATH_ENV, DATABASE_ENDPOINT_ENV, SERVER_PORT_ENV};

/// Complete application configuration loaded from JSON file
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    pub environment: String,
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub security: SecurityConfig,
    pub quotes: QuotesConfig,
    pub monitoring: MonitoringConfig,
}

#[derive(Serialize, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub endpoint: String,
    pub username: String,
    pub password: String,
    pub namespace: String,
    pub database: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub body_limit: usize,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SecurityConfig {
    pub cors: CorsConfig,
    pub password: PasswordConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
    pub allowed_methods: Vec<String>,
    pub allowed_headers: Vec<String>,
    #[serde(default)]
    pub allow_credentials: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PasswordConfig {
    pub argon2: Argon2Config,
}

/// Argon2id work factor. `memory` is in KiB.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Argon2Config {
    pub memory: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

#[derive(Serialize, Deserialize, Clone)]
pub struct QuotesConfig {
    pub base_url: String,
    #[serde(default)]
    pub api_key: String,
    pub symbols: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct MonitoringConfig {
    pub sentry: SentryConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SentryConfig {
    pub dsn: String,
    pub sample_rate: f32,
    pub traces_sample_rate: f32,
    pub environment: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl AppConfig {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config: AppConfig = serde_json::from_str(&fs::read_to_string(path)?)?;
        debug!("Configuration loaded from file");
        Ok(config)
    }

    /// Load configuration from `APP_CONFIG_PATH` or the embedded default,
    /// apply environment overrides and validate.
    pub fn load() -> AppResult<Self> {
        dotenv::dotenv().ok();

        let mut config = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => {
                info!("Loading configuration from {}", path);
                Self::from_file(&path).map_err(|e| {
                    AppError::ConfigError(e.context(format!("Failed to read config file {}", path)))
                })?
            }
            Err(_) => Self::embedded(),
        };

        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;

        info!("Loaded configuration for environment: {}", config.environment);
        Ok(config)
    }

    fn embedded() -> Self {
        let config_content = include_str!("../res/app-config.json");

        match serde_json::from_str::<AppConfig>(config_content) {
            Ok(conf) => conf,
            Err(e) => {
                warn!(
                    "Failed to parse embedded config: {}. Using default configuration.",
                    e
                );
                Self::default()
            }
        }
    }

    /// Apply overrides from a key lookup (normally the process environment)
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(api_key) = lookup(API_KEY_ENV).filter(|v| !v.trim().is_empty()) {
            self.quotes.api_key = api_key;
        }

        if let Some(port) = lookup(SERVER_PORT_ENV) {
            match port.trim().parse::<u16>() {
                Ok(port) => self.server.port = port,
                Err(_) => warn!("Ignoring invalid {} value: {}", SERVER_PORT_ENV, port),
            }
        }

        if let Some(endpoint) = lookup(DATABASE_ENDPOINT_ENV).filter(|v| !v.trim().is_empty()) {
            self.database.endpoint = endpoint;
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> AppResult<()> {
        let mut errors = Vec::new();
        let is_production = self.is_production();

        self.validate_database_config(is_production, &mut errors);

        if self.server.host.trim().is_empty() {
            errors.push("Server host cannot be empty".to_string());
        }

        if self.server.port == 0 {
            errors.push("Server port cannot be 0".to_string());
        }

        if self.server.body_limit == 0 {
            errors.push("Server body limit must be greater than 0".to_string());
        }

        let argon2 = &self.security.password.argon2;
        if argon2.iterations == 0 {
            errors.push("Argon2 iterations must be at least 1".to_string());
        }
        if argon2.parallelism == 0 {
            errors.push("Argon2 parallelism must be at least 1".to_string());
        }
        if argon2.memory < argon2.parallelism.saturating_mul(8) {
            errors.push("Argon2 memory must be at least 8 KiB per lane".to_string());
        }

        let cors = &self.security.cors;
        if cors.allow_credentials && cors.allowed_origins.iter().any(|o| o == "*") {
            errors.push("CORS credentials cannot be combined with a wildcard origin".to_string());
        }

        if self.quotes.base_url.trim().is_empty() {
            errors.push("Quote API base URL cannot be empty".to_string());
        }

        if is_production && self.quotes.api_key.trim().is_empty() {
            errors.push(format!(
                "Quote API key must be configured in production (set {})",
                API_KEY_ENV
            ));
        }

        if !errors.is_empty() {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "Invalid configuration: {}",
                errors.join(", ")
            )));
        }

        Ok(())
    }

    fn validate_database_config(&self, is_production: bool, errors: &mut Vec<String>) {
        let db_config = &self.database;

        if db_config.endpoint.trim().is_empty() {
            errors.push("Database endpoint cannot be empty".to_string());
        }

        if db_config.namespace.trim().is_empty() {
            errors.push("Database namespace cannot be empty".to_string());
        }

        if db_config.database.trim().is_empty() {
            errors.push("Database name cannot be empty".to_string());
        }

        if is_production && db_config.is_remote() {
            if db_config.username == "root" {
                errors.push(
                    "Using default 'root' database username in production is insecure".to_string(),
                );
            }

            if db_config.password == "root" {
                errors.push(
                    "Using default 'root' database password in production is insecure".to_string(),
                );
            }
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            database: DatabaseConfig {
                endpoint: "mem://".to_string(),
                username: "root".to_string(),
                password: "root".to_string(),
                namespace: "stocktracker".to_string(),
                database: "portfolio".to_string(),
            },
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
                body_limit: 65536,
            },
            security: SecurityConfig {
                cors: CorsConfig {
                    allowed_origins: vec!["http://localhost:3000".to_string()],
                    allowed_methods: vec![
                        "GET".to_string(),
                        "POST".to_string(),
                        "DELETE".to_string(),
                        "OPTIONS".to_string(),
                    ],
                    allowed_headers: vec![
                        "Origin".to_string(),
                        "Content-Type".to_string(),
                        "Authorization".to_string(),
                    ],
                    allow_credentials: true,
                },
                password: PasswordConfig {
                    argon2: Argon2Config {
                        memory: 19456,
                        iterations: 2,
                        parallelism: 1,
                    },
                },
            },
            quotes: QuotesConfig {
                base_url: "https://finnhub.io/api/v1".to_string(),
                api_key: String::new(),
                symbols: [
                    "AAPL", "GOOGL", "MSFT", "AMZN", "FB", "TSLA", "NVDA", "INTC", "ADBE", "PYPL",
                ]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            },
            monitoring: MonitoringConfig {
                sentry: SentryConfig {
                    dsn: "".to_string(),
                    sample_rate: 1.0,
                    traces_sample_rate: 0.2,
                    environment: "development".to_string(),
                },
                logging: LoggingConfig {
                    level: "info".to_string(),
                    format: "pretty".to_string(),
                },
            },
        }
    }
}
