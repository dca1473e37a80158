use app_error::{AppError, AppResult};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rand::{TryRngCore, rngs::OsRng};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};

/// Every token expires exactly this long after issue
pub const TOKEN_LIFETIME_HOURS: i64 = 24;
pub const SIGNING_ALGORITHM: Algorithm = Algorithm::HS256;

const KEY_LENGTH: usize = 32;

/// 256-bit HMAC secret. Lives only in memory for the lifetime of the process.
#[derive(Clone)]
pub struct SigningKey([u8; KEY_LENGTH]);

impl SigningKey {
    /// Draw a fresh key from the OS CSPRNG
    pub fn generate() -> AppResult<Self> {
        let mut bytes = [0u8; KEY_LENGTH];
        OsRng.try_fill_bytes(&mut bytes).map_err(|e| {
            AppError::SigningError(anyhow::anyhow!("Failed to generate signing key: {}", e))
        })?;

        Ok(Self(bytes))
    }

    pub fn from_bytes(bytes: [u8; KEY_LENGTH]) -> Self {
        Self(bytes)
    }

    fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SigningKey([REDACTED])")
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String, // Username
    pub iat: i64,
    pub exp: i64,
}

/// Issues and verifies session tokens with one signing key
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtService {
    pub fn new(key: &SigningKey) -> Self {
        let mut validation = Validation::new(SIGNING_ALGORITHM);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(key.as_bytes()),
            decoding_key: DecodingKey::from_secret(key.as_bytes()),
            validation,
        }
    }

    pub fn issue_token(&self, username: &str) -> AppResult<String> {
        let now = Utc::now();
        let expires_at = now + Duration::hours(TOKEN_LIFETIME_HOURS);

        let claims = Claims {
            sub: username.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        encode(&Header::new(SIGNING_ALGORITHM), &claims, &self.encoding_key).map_err(|e| {
            AppError::SigningError(anyhow::anyhow!("Failed to generate token: {}", e))
        })
    }

    /// Check signature, algorithm and expiry; returns the claims on success
    pub fn verify_token(&self, token: &str) -> AppResult<Claims> {
        if token.trim().is_empty() {
            return Err(AppError::token_invalid("Empty token"));
        }

        let token_data =
            decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
                warn!("Token validation failed: {}", e);
                AppError::token_invalid(e.to_string())
            })?;

        debug!("Token validated for user: {}", token_data.claims.sub);
        Ok(token_data.claims)
    }
}
