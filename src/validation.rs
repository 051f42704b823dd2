use std::sync::LazyLock;

use regex::Regex;

use crate::error::AppError;

pub const MIN_PASSWORD_LEN: usize = 6;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex compiles"));

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Password strength check; `label` prefixes the error ("Password", "New password").
pub fn check_password(password: &str, label: &str) -> Result<(), AppError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::BadRequest(format!(
            "{label} must be at least {MIN_PASSWORD_LEN} characters long"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_format() {
        assert!(is_valid_email("ama@example.com"));
        assert!(is_valid_email("first.last+tag@mail.example.gh"));
        assert!(!is_valid_email("ama@example"));
        assert!(!is_valid_email("ama example@mail.com"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn password_length() {
        assert!(check_password("abcdef", "Password").is_ok());
        let err = check_password("abc", "New password").unwrap_err();
        assert_eq!(
            err.to_string(),
            "New password must be at least 6 characters long"
        );
    }

    #[test]
    fn blank_detection() {
        assert!(is_blank("   "));
        assert!(!is_blank(" x "));
    }
}
