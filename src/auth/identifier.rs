//! Identifier normalization and validation.
//!
//! Identifiers are email addresses. Normalization happens before any store
//! access so "A@X.com" and "a@x.com " always address the same account.

use regex::Regex;

/// Normalize an identifier for lookup and uniqueness checks.
#[must_use]
pub fn normalize_identifier(identifier: &str) -> String {
    identifier.trim().to_lowercase()
}

/// Basic email format check on already-normalized input.
#[must_use]
pub fn valid_identifier(identifier: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_ok_and(|regex| regex.is_match(identifier))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_trims_and_lowercases() {
        assert_eq!(normalize_identifier(" Alice@Example.COM "), "alice@example.com");
    }

    #[test]
    fn valid_identifier_accepts_basic_format() {
        assert!(valid_identifier("a@example.com"));
        assert!(valid_identifier("name.surname@example.co"));
    }

    #[test]
    fn valid_identifier_rejects_missing_parts() {
        assert!(!valid_identifier("not-an-email"));
        assert!(!valid_identifier("missing-at.example.com"));
        assert!(!valid_identifier("missing-domain@"));
    }
}
