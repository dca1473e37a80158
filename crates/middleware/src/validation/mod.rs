pub mod symbol;
pub mod user_account;

pub use symbol::validate_symbol;
pub use user_account::{sanitize_string, validate_password, validate_username};
