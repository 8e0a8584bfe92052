//! Full Name Value Object

use serde::{Deserialize, Serialize};
use std::fmt;

use super::InvalidValue;

pub const FULL_NAME_MAX_LENGTH: usize = 100;

/// Display name, trimmed, 1 to 100 characters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FullName(String);

impl FullName {
    pub fn new(raw: impl AsRef<str>) -> Result<Self, InvalidValue> {
        let trimmed = raw.as_ref().trim();

        if trimmed.is_empty() {
            return Err(InvalidValue::new("Full name is required"));
        }
        if trimmed.chars().count() > FULL_NAME_MAX_LENGTH {
            return Err(InvalidValue::new(format!(
                "Full name must be at most {FULL_NAME_MAX_LENGTH} characters"
            )));
        }
        if trimmed.chars().any(char::is_control) {
            return Err(InvalidValue::new("Full name contains invalid characters"));
        }

        Ok(Self(trimmed.to_string()))
    }

    pub fn from_db(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FullName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_name() {
        assert_eq!(FullName::new("  A B ").unwrap().as_str(), "A B");
        assert!(FullName::new("山田 太郎").is_ok());
        assert!(FullName::new("   ").is_err());
        assert!(FullName::new("a\u{0007}b").is_err());
        assert!(FullName::new("n".repeat(FULL_NAME_MAX_LENGTH + 1)).is_err());
    }
}
