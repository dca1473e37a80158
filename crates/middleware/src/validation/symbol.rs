use app_error::{AppResult, validation_error};
use lazy_static::lazy_static;
use regex::Regex;

use super::user_account::sanitize_string;

lazy_static! {
    // Exchange tickers, e.g. BRK.B or RDS-A
    static ref SYMBOL_REGEX: Regex = Regex::new(r"^[A-Za-z0-9.\-]{1,10}$").unwrap();
}

/// Validate a ticker symbol and return its canonical upper-case form
pub fn validate_symbol(symbol: &str) -> AppResult<String> {
    let symbol = sanitize_string(symbol);

    if symbol.is_empty() {
        return validation_error!("symbol", "cannot be empty");
    }

    if !SYMBOL_REGEX.is_match(&symbol) {
        return validation_error!(
            "symbol",
            "must be 1-10 characters of letters, digits, '.' or '-'"
        );
    }

    Ok(symbol.to_ascii_uppercase())
}
