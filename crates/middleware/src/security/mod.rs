pub mod jwt;
pub mod password;

// Re-export key items for convenience
pub use jwt::{Claims, JwtService, SigningKey, TOKEN_LIFETIME_HOURS};
pub use password::PasswordHasher;
