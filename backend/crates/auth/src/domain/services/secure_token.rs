//! Secure Token Factory
//!
//! Mints the single-use tokens mailed for password reset and email
//! verification. The plaintext leaves the process exactly once; only its
//! SHA-256 is persisted.

use platform::crypto::{constant_time_eq, random_hex, sha256_hex};
use std::fmt;

use crate::domain::value_object::security_token::SecurityTokenHash;

/// Random bytes per token (64 hex characters)
pub const SECURITY_TOKEN_BYTES: usize = 32;

/// A freshly generated token: the plaintext for the email, the hash for storage
pub struct GeneratedToken {
    pub plaintext: String,
    pub hash: SecurityTokenHash,
}

impl fmt::Debug for GeneratedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeneratedToken")
            .field("plaintext", &"[REDACTED]")
            .field("hash", &self.hash)
            .finish()
    }
}

pub struct SecureTokenFactory;

impl SecureTokenFactory {
    pub fn generate() -> GeneratedToken {
        let plaintext = random_hex(SECURITY_TOKEN_BYTES);
        let hash = Self::hash(&plaintext);
        GeneratedToken { plaintext, hash }
    }

    pub fn hash(plaintext: &str) -> SecurityTokenHash {
        SecurityTokenHash::from_hex(sha256_hex(plaintext.as_bytes()))
    }

    /// Constant-time check of `plaintext` against a stored hash
    pub fn verify(plaintext: &str, stored: &SecurityTokenHash) -> bool {
        let candidate = Self::hash(plaintext);
        constant_time_eq(candidate.as_str().as_bytes(), stored.as_str().as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_shape() {
        let token = SecureTokenFactory::generate();
        assert_eq!(token.plaintext.len(), SECURITY_TOKEN_BYTES * 2);
        assert!(token.plaintext.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(token.hash.as_str().len(), 64);
        assert_ne!(token.hash.as_str(), token.plaintext);
    }

    #[test]
    fn test_tokens_are_unique() {
        let a = SecureTokenFactory::generate();
        let b = SecureTokenFactory::generate();
        assert_ne!(a.plaintext, b.plaintext);
    }

    #[test]
    fn test_verify() {
        let hash = SecureTokenFactory::hash("plaintext");
        assert!(SecureTokenFactory::verify("plaintext", &hash));
        assert!(!SecureTokenFactory::verify("plaintext", &SecureTokenFactory::hash("other")));
    }

    #[test]
    fn test_known_digest() {
        assert_eq!(
            SecureTokenFactory::hash("abc").as_str(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_debug_hides_plaintext() {
        let token = SecureTokenFactory::generate();
        assert!(!format!("{token:?}").contains(&token.plaintext));
    }
}
