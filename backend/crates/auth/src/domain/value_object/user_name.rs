//! User Name Value Object
//!
//! The public handle an account logs in with.
//!
//! - NFKC normalized, then validated
//! - ASCII only: `a-z`, `0-9`, `_`, `.`, `-`
//! - Upper case input is accepted; uniqueness and lookups use the
//!   lower-case canonical form
//! - 3 to 30 characters, starts and ends with a letter or digit,
//!   no consecutive dots, not a reserved word

use serde::{Deserialize, Serialize};
use std::fmt;
use unicode_normalization::UnicodeNormalization;

use super::InvalidValue;

pub const USER_NAME_MIN_LENGTH: usize = 3;
pub const USER_NAME_MAX_LENGTH: usize = 30;

const ALLOWED_SPECIAL_CHARS: &[char] = &['_', '.', '-'];

const RESERVED_WORDS: &[&str] = &[
    "admin",
    "administrator",
    "root",
    "system",
    "support",
    "api",
    "auth",
    "login",
    "logout",
    "signup",
    "me",
    "null",
    "undefined",
];

#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserName(String);

impl UserName {
    pub fn new(raw: impl AsRef<str>) -> Result<Self, InvalidValue> {
        let normalized: String = raw.as_ref().trim().nfkc().collect();

        if normalized.is_empty() {
            return Err(InvalidValue::new("Username is required"));
        }

        let len = normalized.chars().count();
        if !(USER_NAME_MIN_LENGTH..=USER_NAME_MAX_LENGTH).contains(&len) {
            return Err(InvalidValue::new(format!(
                "Username must be between {USER_NAME_MIN_LENGTH} and {USER_NAME_MAX_LENGTH} characters"
            )));
        }

        if !normalized
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || ALLOWED_SPECIAL_CHARS.contains(&c))
        {
            return Err(InvalidValue::new(
                "Username may only contain letters, digits, '_', '.' and '-'",
            ));
        }

        let starts_ok = normalized.starts_with(|c: char| c.is_ascii_alphanumeric());
        let ends_ok = normalized.ends_with(|c: char| c.is_ascii_alphanumeric());
        if !starts_ok || !ends_ok {
            return Err(InvalidValue::new(
                "Username must start and end with a letter or digit",
            ));
        }

        if normalized.contains("..") {
            return Err(InvalidValue::new("Username cannot contain consecutive dots"));
        }

        let canonical = normalized.to_ascii_lowercase();
        if RESERVED_WORDS.contains(&canonical.as_str()) {
            return Err(InvalidValue::new("This username is reserved"));
        }

        Ok(Self(canonical))
    }

    /// Create from database value (assumed already validated)
    pub fn from_db(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Canonical (lower-case) form
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for UserName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UserName({})", self.0)
    }
}

impl fmt::Display for UserName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_names() {
        for name in ["user1", "abc", "john.doe", "a_b-c", &"x".repeat(30)] {
            assert!(UserName::new(name).is_ok(), "{name:?} should be accepted");
        }
    }

    #[test]
    fn test_canonical_lowercase() {
        assert_eq!(UserName::new("  JohnDoe ").unwrap().as_str(), "johndoe");
        assert_eq!(UserName::new("JohnDoe").unwrap(), UserName::new("johndoe").unwrap());
    }

    #[test]
    fn test_fullwidth_is_normalized() {
        assert_eq!(UserName::new("ｕｓｅｒ１").unwrap().as_str(), "user1");
    }

    #[test]
    fn test_rejected_names() {
        for name in ["", "ab", &"x".repeat(31), "has space", "émile", "_lead", "trail.", "a..b", "Admin", "me"] {
            assert!(UserName::new(name).is_err(), "{name:?} should be rejected");
        }
    }
}
