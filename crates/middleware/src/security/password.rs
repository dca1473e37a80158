use app_config::Argon2Config;
use app_error::{AppError, AppResult};
use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{
        self, PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString,
        rand_core::OsRng,
    },
};
use tracing::{debug, error};

/// Argon2id hashing with a fixed work factor.
///
/// Both operations are CPU and memory heavy; async callers should run them
/// on the blocking pool.
#[derive(Clone)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
}

impl PasswordHasher {
    /// `memory` is in KiB
    pub fn new(memory: u32, iterations: u32, parallelism: u32) -> AppResult<Self> {
        let params = Params::new(memory, iterations, parallelism, None).map_err(|e| {
            AppError::HashError(anyhow::anyhow!("Invalid Argon2 parameters: {}", e))
        })?;

        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }

    pub fn from_config(config: &Argon2Config) -> AppResult<Self> {
        Self::new(config.memory, config.iterations, config.parallelism)
    }

    /// Hash a password with a fresh random salt, PHC string output
    pub fn hash(&self, password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);

        debug!("Hashing password");
        let password_hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| {
                error!("Failed to hash password: {}", e);
                AppError::HashError(anyhow::anyhow!("Failed to hash password: {}", e))
            })?
            .to_string();

        Ok(password_hash)
    }

    /// Verify a password against a stored digest. A mismatch is `Ok(false)`;
    /// only a corrupt digest or an internal failure is an error.
    pub fn verify(&self, password: &str, password_hash: &str) -> AppResult<bool> {
        let parsed_hash = PasswordHash::new(password_hash).map_err(|e| {
            error!("Invalid password hash: {}", e);
            AppError::HashError(anyhow::anyhow!("Invalid password hash: {}", e))
        })?;

        match self.argon2.verify_password(password.as_bytes(), &parsed_hash) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(e) => {
                error!("Failed to verify password: {}", e);
                Err(AppError::HashError(anyhow::anyhow!(
                    "Failed to verify password: {}",
                    e
                )))
            }
        }
    }
}

impl std::fmt::Debug for PasswordHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordHasher").finish_non_exhaustive()
    }
}
