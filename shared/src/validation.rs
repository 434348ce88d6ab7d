//! Input validation functions
//!
//! Custom validators referenced by the request types in [`crate::types`],
//! plus helpers the backend uses when normalizing identifiers.

use validator::ValidationError;

fn invalid(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    err
}

/// Validate password strength
///
/// Policy: 8-128 characters, at least one letter and one digit.
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.len() < 8 {
        return Err(invalid("password", "Password must be at least 8 characters"));
    }
    if password.len() > 128 {
        return Err(invalid("password", "Password must be at most 128 characters"));
    }
    if !password.chars().any(|c| c.is_ascii_alphabetic()) {
        return Err(invalid("password", "Password must contain a letter"));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(invalid("password", "Password must contain a digit"));
    }
    Ok(())
}

/// Validate username: 3-32 characters, letters, digits and underscores
pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    if username.len() < 3 || username.len() > 32 {
        return Err(invalid("username", "Username must be 3-32 characters"));
    }
    let pattern = regex_lite::Regex::new(r"^[A-Za-z0-9_]+$").expect("valid pattern");
    if !pattern.is_match(username) {
        return Err(invalid(
            "username",
            "Username may only contain letters, digits and underscores",
        ));
    }
    Ok(())
}

/// Canonical form of an email address for storage and lookup
///
/// Emails are unique case-insensitively; everything is stored lowercased.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Password123", true)]
    #[case("abcdefg1", true)]
    #[case("short1", false)]
    #[case("allletters", false)]
    #[case("12345678", false)]
    fn password_policy(#[case] candidate: &str, #[case] ok: bool) {
        assert_eq!(validate_password(candidate).is_ok(), ok);
    }

    #[test]
    fn password_rejects_oversize() {
        let long = format!("a1{}", "x".repeat(130));
        assert!(validate_password(&long).is_err());
    }

    #[rstest]
    #[case("alice", true)]
    #[case("a_b_9", true)]
    #[case("ab", false)]
    #[case("has space", false)]
    #[case("dash-ed", false)]
    fn username_rules(#[case] candidate: &str, #[case] ok: bool) {
        assert_eq!(validate_username(candidate).is_ok(), ok);
    }

    #[test]
    fn username_rejects_oversize() {
        assert!(validate_username(&"a".repeat(33)).is_err());
    }

    #[test]
    fn email_normalization_lowercases_and_trims() {
        assert_eq!(normalize_email("  Alice@Example.COM "), "alice@example.com");
    }

    proptest::proptest! {
        /// Normalization is idempotent: storing a normalized email and
        /// normalizing a lookup for it always agree.
        #[test]
        fn prop_normalize_email_is_idempotent(raw in "\\PC{0,60}") {
            let once = normalize_email(&raw);
            proptest::prop_assert_eq!(normalize_email(&once), once);
        }

        /// Accepted usernames always fit the documented bounds.
        #[test]
        fn prop_valid_usernames_are_bounded(name in "[A-Za-z0-9_]{3,32}") {
            proptest::prop_assert!(validate_username(&name).is_ok());
        }
    }
}
