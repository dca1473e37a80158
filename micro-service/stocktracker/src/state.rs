use std::sync::Arc;

use app_config::AppConfig;
use app_database::{CredentialStore, Database};
use app_error::AppResult;
use app_middleware::{JwtService, PasswordHasher, SigningKey};
use app_utils::QuoteClient;

use crate::service::{AuthService, PortfolioService};

/// Shared services handed to the router as extensions
#[derive(Clone)]
pub struct AppServices {
    pub auth: Arc<AuthService>,
    pub portfolio: Arc<PortfolioService>,
    pub quotes: Arc<QuoteClient>,
}

impl AppServices {
    pub fn new(config: &AppConfig, db: Arc<Database>, signing_key: &SigningKey) -> AppResult<Self> {
        let jwt_service = Arc::new(JwtService::new(signing_key));
        let hasher = PasswordHasher::from_config(&config.security.password.argon2)?;

        let auth = AuthService::new(
            jwt_service,
            hasher,
            CredentialStore::new(Arc::clone(&db)),
        );

        Ok(Self {
            auth: Arc::new(auth),
            portfolio: Arc::new(PortfolioService::new(db)),
            quotes: Arc::new(QuoteClient::from_config(&config.quotes)?),
        })
    }
}
