//! Security Token Value Objects
//!
//! Single-use tokens mailed out for password reset and email verification.
//! Only the SHA-256 of the plaintext is ever stored.

use chrono::{DateTime, Utc};
use std::fmt;

use crate::domain::services::secure_token::SecureTokenFactory;

/// What an outstanding security token may be redeemed for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenPurpose {
    PasswordReset,
    EmailVerification,
}

impl TokenPurpose {
    pub const fn as_str(&self) -> &'static str {
        match self {
            TokenPurpose::PasswordReset => "password_reset",
            TokenPurpose::EmailVerification => "email_verification",
        }
    }
}

impl fmt::Display for TokenPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lower-case hex SHA-256 digest of a security token
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SecurityTokenHash(String);

impl SecurityTokenHash {
    pub(crate) fn from_hex(hex: String) -> Self {
        Self(hex)
    }

    pub fn from_db(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SecurityTokenHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // a prefix is enough to correlate log lines
        let prefix: String = self.0.chars().take(8).collect();
        write!(f, "SecurityTokenHash({prefix}…)")
    }
}

/// Hash and expiry of the live token for one purpose; set and cleared together
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutstandingToken {
    pub hash: SecurityTokenHash,
    pub expires_at: DateTime<Utc>,
}

impl OutstandingToken {
    pub fn new(hash: SecurityTokenHash, expires_at: DateTime<Utc>) -> Self {
        Self { hash, expires_at }
    }

    /// Valid strictly before `expires_at`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Whether `plaintext` redeems this token at `now`
    pub fn redeemable_by(&self, plaintext: &str, now: DateTime<Utc>) -> bool {
        let matches = SecureTokenFactory::verify(plaintext, &self.hash);
        let live = !self.is_expired_at(now);
        matches & live
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_expiry_boundary_is_exclusive() {
        let issued = SecureTokenFactory::generate();
        let now = Utc::now();
        let token = OutstandingToken::new(issued.hash.clone(), now + Duration::minutes(15));

        assert!(token.redeemable_by(&issued.plaintext, now));
        assert!(token.redeemable_by(&issued.plaintext, now + Duration::minutes(15) - Duration::seconds(1)));
        assert!(!token.redeemable_by(&issued.plaintext, now + Duration::minutes(15)));
    }

    #[test]
    fn test_wrong_plaintext_is_rejected() {
        let issued = SecureTokenFactory::generate();
        let now = Utc::now();
        let token = OutstandingToken::new(issued.hash, now + Duration::minutes(15));
        assert!(!token.redeemable_by(&SecureTokenFactory::generate().plaintext, now));
    }

    #[test]
    fn test_hash_debug_is_truncated() {
        let issued = SecureTokenFactory::generate();
        let debug = format!("{:?}", issued.hash);
        assert!(!debug.contains(issued.hash.as_str()));
    }
}
