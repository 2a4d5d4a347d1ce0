// src/services/validation.rs
use std::sync::OnceLock;

use regex::Regex;

use crate::errors::ServiceError;

pub const MIN_PASSWORD_LEN: usize = 6;

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)^[A-Z0-9._%+-]+@[A-Z0-9.-]+\.[A-Z]{2,}$").expect("email pattern is valid")
    })
}

pub fn looks_like_email(email: &str) -> bool {
    email_regex().is_match(email)
}

/// Emails are the login key; compare them trimmed and lowercased.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Collect the names of blank required fields into one validation error.
pub fn require_fields(fields: &[(&str, &str)]) -> Result<(), ServiceError> {
    let missing: Vec<&str> = fields
        .iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| *name)
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(ServiceError::validation(format!(
            "Required fields are missing: {}",
            missing.join(", ")
        )))
    }
}

pub fn check_email(email: &str) -> Result<(), ServiceError> {
    if looks_like_email(email) {
        Ok(())
    } else {
        Err(ServiceError::validation("Invalid email format"))
    }
}

pub fn check_password(password: &str) -> Result<(), ServiceError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ServiceError::validation(format!(
            "Password must be at least {} characters long",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}
