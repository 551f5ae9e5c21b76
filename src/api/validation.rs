//! Input validation for form submissions.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Lower-case only; `A@B.COM` is rejected on purpose.
    static ref EMAIL_REGEX: Regex = Regex::new(
        r"^[a-z0-9._%+\-]+@[a-z0-9.\-]+\.[a-z]{2,}$"
    ).unwrap();
}

/// Check whether the provided email has a valid format
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_REGEX.is_match(email)
}

/// Validate an email address
pub fn validate_email(email: &str) -> Result<(), String> {
    if is_valid_email(email) {
        Ok(())
    } else {
        Err("Invalid email format".to_string())
    }
}

/// Validate that every `(field, value)` pair is non-empty.
/// Reports the first offending field.
pub fn require_fields(fields: &[(&str, &str)]) -> Result<(), String> {
    match fields.iter().find(|(_, value)| value.trim().is_empty()) {
        Some((field, _)) => Err(format!("{} is required", field)),
        None => Ok(()),
    }
}

/// Parse a positive user id submitted as text
pub fn parse_user_id(id: &str) -> Result<i64, String> {
    match id.trim().parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err("Invalid user id".to_string()),
    }
}
