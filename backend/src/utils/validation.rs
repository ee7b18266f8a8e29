use once_cell::sync::Lazy;
use regex::Regex;
use uuid::Uuid;

use crate::constants::*;
use crate::error::{codes, AppError, AppResult};

static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9\-]+(\.[A-Za-z0-9\-]+)*\.[A-Za-z]{2,}$")
        .expect("email regex is valid")
});

fn check_char_len(field: &str, value: &str, min: usize, max: usize) -> AppResult<()> {
    let len = value.chars().count();
    if len < min || len > max {
        return Err(AppError::validation(
            codes::INVALID_REQUEST,
            format!("{} must be between {} and {} characters", field, min, max),
        ));
    }
    Ok(())
}

pub fn validate_username(username: &str) -> AppResult<()> {
    check_char_len("username", username, USERNAME_MIN_CHARS, USERNAME_MAX_CHARS)
}

pub fn validate_display_name(display_name: &str) -> AppResult<()> {
    check_char_len("display_name", display_name, DISPLAY_NAME_MIN_CHARS, DISPLAY_NAME_MAX_CHARS)
}

pub fn validate_email(email: &str) -> AppResult<()> {
    if !EMAIL_REGEX.is_match(email) {
        return Err(AppError::validation(codes::INVALID_REQUEST, "email must be a valid email address"));
    }
    Ok(())
}

/// Byte length, not chars: bcrypt truncates past 72 bytes.
pub fn validate_password(password: &str) -> AppResult<()> {
    if password.len() < PASSWORD_MIN_BYTES || password.len() > PASSWORD_MAX_BYTES {
        return Err(AppError::validation(
            codes::INVALID_REQUEST,
            format!(
                "password must be between {} and {} bytes",
                PASSWORD_MIN_BYTES, PASSWORD_MAX_BYTES
            ),
        ));
    }
    Ok(())
}

/// Parse a path identifier. Malformed ids are a validation failure, not a miss.
pub fn parse_id(raw: &str, what: &str) -> AppResult<Uuid> {
    Uuid::parse_str(raw.trim())
        .map_err(|_| AppError::validation(codes::INVALID_ID, format!("Invalid {} ID format", what)))
}

/// Resolve the `limit` query parameter: default when absent, clamped into range.
pub fn parse_search_limit(raw: Option<&str>) -> AppResult<usize> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(SEARCH_DEFAULT_LIMIT);
    };

    let (negative, digits) = match raw.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, raw.strip_prefix('+').unwrap_or(raw)),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AppError::validation(codes::INVALID_REQUEST, "limit must be an integer"));
    }

    // Integers too wide for u64 still clamp to the nearest bound.
    let limit = match (negative, digits.parse::<u64>()) {
        (true, _) => SEARCH_MIN_LIMIT,
        (false, Ok(n)) => n.clamp(SEARCH_MIN_LIMIT as u64, SEARCH_MAX_LIMIT as u64) as usize,
        (false, Err(_)) => SEARCH_MAX_LIMIT,
    };
    Ok(limit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_username_bounds() {
        assert!(validate_username("abc").is_ok());
        assert!(validate_username(&"a".repeat(30)).is_ok());
        assert!(validate_username("ab").is_err());
        assert!(validate_username(&"a".repeat(31)).is_err());
    }

    #[test]
    fn test_display_name_counts_chars_not_bytes() {
        assert!(validate_display_name("Zoë").is_ok());
        assert!(validate_display_name(&"é".repeat(100)).is_ok());
        assert!(validate_display_name("").is_err());
    }

    #[test]
    fn test_email_format() {
        assert!(validate_email("john@example.com").is_ok());
        assert!(validate_email("first.last+tag@mail.example.org").is_ok());
        assert!(validate_email("not-an-email").is_err());
        assert!(validate_email("john@localhost").is_err());
        assert!(validate_email("@example.com").is_err());
    }

    #[test]
    fn test_password_bounds() {
        assert!(validate_password("password1").is_ok());
        assert!(validate_password("short").is_err());
        assert!(validate_password(&"x".repeat(73)).is_err());
    }

    #[test]
    fn test_parse_id_rejects_garbage_as_validation() {
        let id = Uuid::new_v4();
        assert_eq!(parse_id(&id.to_string(), "user").unwrap(), id);

        let err = parse_id("not-a-uuid", "user").unwrap_err();
        assert_eq!(err.code(), codes::INVALID_ID);
        assert!(matches!(err, AppError::Validation { .. }));
    }

    #[test]
    fn test_search_limit_defaults_and_clamps() {
        assert_eq!(parse_search_limit(None).unwrap(), 20);
        assert_eq!(parse_search_limit(Some("")).unwrap(), 20);
        assert_eq!(parse_search_limit(Some("10")).unwrap(), 10);
        assert_eq!(parse_search_limit(Some("0")).unwrap(), 1);
        assert_eq!(parse_search_limit(Some("-5")).unwrap(), 1);
        assert_eq!(parse_search_limit(Some("500")).unwrap(), 100);
        assert!(parse_search_limit(Some("ten")).is_err());
    }

    #[test]
    fn test_search_limit_clamps_integers_of_any_width() {
        assert_eq!(parse_search_limit(Some("99999999999999999999")).unwrap(), 100);
        assert_eq!(parse_search_limit(Some("-99999999999999999999")).unwrap(), 1);
        assert_eq!(parse_search_limit(Some("+7")).unwrap(), 7);
        assert_eq!(parse_search_limit(Some("-0")).unwrap(), 1);

        for raw in ["-", "+", "1.5", "1e3", "--1", "0x10"] {
            let err = parse_search_limit(Some(raw)).unwrap_err();
            assert!(matches!(err, AppError::Validation { .. }), "{raw}");
        }
    }
}
