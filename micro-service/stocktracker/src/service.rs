use app_database::{CredentialStore, Database, FavoriteStore};
use app_error::{AppError, AppResult};
use app_middleware::{JwtService, PasswordHasher, validation};
use app_models::{CredentialsInput, FavoriteView, LoginResponse};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Trait defining the authentication service interface
#[async_trait]
pub trait AuthServiceTrait: Send + Sync {
    /// Register a new user
    async fn register(&self, input: CredentialsInput) -> AppResult<()>;

    /// Check credentials and issue a session token
    async fn login(&self, input: CredentialsInput) -> AppResult<LoginResponse>;

    /// Get the JWT service
    fn get_jwt_service(&self) -> Arc<JwtService>;
}

/// Validation container to reduce boilerplate
struct ValidationInput {
    username: String,
    password: String,
}

impl ValidationInput {
    fn from_credentials(input: CredentialsInput) -> Self {
        Self {
            username: validation::sanitize_string(&input.username),
            password: input.password,
        }
    }

    fn validate_registration(&self) -> AppResult<()> {
        validation::validate_username(&self.username)?;
        validation::validate_password(&self.password)?;
        Ok(())
    }
}

pub struct AuthService {
    jwt_service: Arc<JwtService>,
    hasher: PasswordHasher,
    credentials: CredentialStore,
}

impl AuthService {
    pub fn new(
        jwt_service: Arc<JwtService>,
        hasher: PasswordHasher,
        credentials: CredentialStore,
    ) -> Self {
        Self {
            jwt_service,
            hasher,
            credentials,
        }
    }

    // Argon2 is deliberately slow; keep it off the async workers
    async fn hash_password(&self, password: String) -> AppResult<String> {
        let hasher = self.hasher.clone();
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| AppError::HashError(anyhow::anyhow!("Hashing task failed: {}", e)))?
    }

    async fn verify_password(&self, password: String, password_hash: String) -> AppResult<bool> {
        let hasher = self.hasher.clone();
        tokio::task::spawn_blocking(move || hasher.verify(&password, &password_hash))
            .await
            .map_err(|e| AppError::HashError(anyhow::anyhow!("Verification task failed: {}", e)))?
    }
}

#[async_trait]
impl AuthServiceTrait for AuthService {
    async fn register(&self, input: CredentialsInput) -> AppResult<()> {
        let input = ValidationInput::from_credentials(input);
        input.validate_registration()?;

        let password_hash = self.hash_password(input.password).await?;
        self.credentials.create(&input.username, &password_hash).await?;

        info!("User registered: {}", input.username);
        Ok(())
    }

    async fn login(&self, input: CredentialsInput) -> AppResult<LoginResponse> {
        let input = ValidationInput::from_credentials(input);

        if input.username.is_empty() || input.password.is_empty() {
            return Err(AppError::invalid_credentials());
        }

        let user = match self.credentials.find_by_username(&input.username).await {
            Ok(user) => user,
            Err(AppError::NotFoundError(_)) => {
                debug!("Login failed: unknown user");
                return Err(AppError::invalid_credentials());
            }
            Err(e) => {
                error!("Failed to look up user for login: {}", e);
                return Err(e);
            }
        };

        if !self
            .verify_password(input.password, user.password_hash.clone())
            .await?
        {
            debug!("Login failed: password mismatch for {}", user.username);
            return Err(AppError::invalid_credentials());
        }

        let token = self.jwt_service.issue_token(&user.username)?;

        info!("User logged in: {}", user.username);
        Ok(LoginResponse { token })
    }

    fn get_jwt_service(&self) -> Arc<JwtService> {
        Arc::clone(&self.jwt_service)
    }
}

/// Per-user favorites, always scoped to the authenticated username
pub struct PortfolioService {
    credentials: CredentialStore,
    favorites: FavoriteStore,
}

impl PortfolioService {
    pub fn new(db: Arc<Database>) -> Self {
        Self {
            credentials: CredentialStore::new(Arc::clone(&db)),
            favorites: FavoriteStore::new(db),
        }
    }

    async fn user_key(&self, username: &str) -> AppResult<String> {
        Ok(self.credentials.find_by_username(username).await?.record_key())
    }

    /// Adding a symbol twice is not an error
    pub async fn add_favorite(&self, username: &str, symbol: &str) -> AppResult<()> {
        let symbol = validation::validate_symbol(symbol)?;
        let user_id = self.user_key(username).await?;

        if self.favorites.add(&user_id, &symbol).await? {
            info!("{} added {} to portfolio", username, symbol);
        } else {
            debug!("{} already in portfolio of {}", symbol, username);
        }

        Ok(())
    }

    pub async fn list_favorites(&self, username: &str) -> AppResult<Vec<FavoriteView>> {
        let user_id = self.user_key(username).await?;

        Ok(self
            .favorites
            .list(&user_id)
            .await?
            .into_iter()
            .map(FavoriteView::from)
            .collect())
    }

    pub async fn remove_favorite(&self, username: &str, symbol: &str) -> AppResult<()> {
        let symbol = validation::validate_symbol(symbol)?;
        let user_id = self.user_key(username).await?;

        if !self.favorites.remove(&user_id, &symbol).await? {
            return Err(AppError::NotFoundError(format!(
                "{} is not in the portfolio",
                symbol
            )));
        }

        info!("{} removed {} from portfolio", username, symbol);
        Ok(())
    }
}
