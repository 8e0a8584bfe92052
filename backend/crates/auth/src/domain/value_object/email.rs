//! Email Value Object
//!
//! Represents a syntactically valid, lower-cased email address.
//! Ownership is proven separately through the verification flow.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::InvalidValue;

/// Maximum email length (per RFC 5321)
const EMAIL_MAX_LENGTH: usize = 254;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    pub fn new(email: impl AsRef<str>) -> Result<Self, InvalidValue> {
        let email = email.as_ref().trim().to_lowercase();

        if email.is_empty() {
            return Err(InvalidValue::new("Email is required"));
        }

        if email.len() > EMAIL_MAX_LENGTH {
            return Err(InvalidValue::new(format!(
                "Email must be at most {EMAIL_MAX_LENGTH} characters"
            )));
        }

        if !Self::is_valid_format(&email) {
            return Err(InvalidValue::new("Invalid email format"));
        }

        Ok(Self(email))
    }

    fn is_valid_format(email: &str) -> bool {
        let Some((local, domain)) = email.split_once('@') else {
            return false;
        };

        if local.is_empty() || local.len() > 64 || local.chars().any(char::is_whitespace) {
            return false;
        }

        if domain.is_empty() || !domain.contains('.') || domain.contains("..") {
            return false;
        }

        domain
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
            && !domain.starts_with(['.', '-'])
            && !domain.ends_with(['.', '-'])
    }

    /// Create from database value (assumed already validated)
    pub fn from_db(email: impl Into<String>) -> Self {
        Self(email.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Email {
    type Err = InvalidValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Email::new(s)
    }
}

impl std::fmt::Display for Email {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_valid() {
        assert!(Email::new("a@x.com").is_ok());
        assert!(Email::new("user.name+tag@example.co.jp").is_ok());
    }

    #[test]
    fn test_email_invalid() {
        for bad in ["", "userexample.com", "user@", "@example.com", "user@@example.com", "user@example", "a b@x.com", "user@-x.com", "user@x..com"] {
            assert!(Email::new(bad).is_err(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn test_email_case_and_whitespace_normalization() {
        let email = Email::new("  User@Example.COM ").unwrap();
        assert_eq!(email.as_str(), "user@example.com");
    }
}
