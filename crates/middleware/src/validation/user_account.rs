use app_error::{AppResult, validation_error};
use lazy_static::lazy_static;
use regex::Regex;

/// Upper bound on accepted password length, in bytes
pub const MAX_PASSWORD_LENGTH: usize = 128;

lazy_static! {
    // Alphanumeric characters, underscores, and hyphens, 3-30 characters
    static ref USERNAME_REGEX: Regex = Regex::new(r"^[a-zA-Z0-9_-]{3,30}$").unwrap();
}

/// Validates a username
pub fn validate_username(username: &str) -> AppResult<()> {
    if username.trim().is_empty() {
        return validation_error!("username", "cannot be empty");
    }

    if !USERNAME_REGEX.is_match(username) {
        return validation_error!(
            "username",
            "must be 3-30 characters long and can only contain letters, numbers, underscores, and hyphens"
        );
    }

    Ok(())
}

/// Passwords carry no composition rules, only bounds
pub fn validate_password(password: &str) -> AppResult<()> {
    if password.is_empty() {
        return validation_error!("password", "cannot be empty");
    }

    if password.len() > MAX_PASSWORD_LENGTH {
        return validation_error!(
            "password",
            format!("cannot exceed {} characters", MAX_PASSWORD_LENGTH)
        );
    }

    Ok(())
}

/// Sanitizes a string input by trimming whitespace
pub fn sanitize_string(input: &str) -> String {
    input.trim().to_string()
}
