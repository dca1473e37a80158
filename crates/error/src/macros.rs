/// Simplifies creating validation errors
///
/// # Example
/// ```
/// fn check(username: &str) -> app_error::AppResult<()> {
///     if username.is_empty() {
///         return app_error::validation_error!("username", "cannot be empty");
///     }
///     Ok(())
/// }
/// assert!(check("").is_err());
/// ```
#[macro_export]
macro_rules! validation_error {
    ($field:expr, $message:expr) => {
        Err($crate::AppError::ValidationError(format!(
            "Invalid {}: {}",
            $field, $message
        )))
    };
}
