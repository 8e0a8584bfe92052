//! Password Hashing and Verification
//!
//! NIST SP 800-63B compliant password handling with:
//! - Argon2id hashing (memory-hard, recommended by OWASP)
//! - Zeroization of sensitive data
//! - Constant-time comparison
//! - Optional application-wide pepper
//! - Dummy verification for unknown accounts, so a login attempt costs the
//!   same whether or not the account exists

use std::fmt;
use std::sync::OnceLock;

use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};
use rand::rngs::OsRng;
use thiserror::Error;
use unicode_normalization::UnicodeNormalization;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Minimum password length (NIST: SHALL be at least 8)
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Maximum password length (NIST: SHOULD permit at least 64)
pub const MAX_PASSWORD_LENGTH: usize = 128;

// ============================================================================
// Error Types
// ============================================================================

/// Password policy violation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PasswordPolicyError {
    #[error("Password must be at least {min} characters")]
    TooShort { min: usize, actual: usize },

    #[error("Password must be at most {max} characters")]
    TooLong { max: usize, actual: usize },

    #[error("Password cannot be empty")]
    EmptyOrWhitespace,

    #[error("Password contains invalid control characters")]
    InvalidCharacter,

    #[error("Password is too common or follows a predictable pattern")]
    CommonPattern,
}

/// Password hashing/verification errors
#[derive(Debug, Error)]
pub enum PasswordHashError {
    #[error("Password hashing failed: {0}")]
    HashingFailed(String),

    #[error("Invalid password hash format")]
    InvalidHashFormat,
}

// ============================================================================
// Clear Text Password (Zeroized on drop)
// ============================================================================

/// Clear text password with automatic memory zeroization
///
/// Does not implement `Clone`; `Debug` output is redacted.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct ClearTextPassword(String);

impl ClearTextPassword {
    /// Create a new clear text password, enforcing the password policy
    ///
    /// Used when a password is being *set* (signup, reset). Unicode is
    /// normalized using NFKC before validation.
    pub fn new(raw: String) -> Result<Self, PasswordPolicyError> {
        let normalized: String = raw.nfkc().collect();

        if normalized.trim().is_empty() {
            return Err(PasswordPolicyError::EmptyOrWhitespace);
        }

        // NIST: count code points, not bytes
        let char_count = normalized.chars().count();
        if char_count < MIN_PASSWORD_LENGTH {
            return Err(PasswordPolicyError::TooShort {
                min: MIN_PASSWORD_LENGTH,
                actual: char_count,
            });
        }
        if char_count > MAX_PASSWORD_LENGTH {
            return Err(PasswordPolicyError::TooLong {
                max: MAX_PASSWORD_LENGTH,
                actual: char_count,
            });
        }

        if normalized
            .chars()
            .any(|ch| ch.is_control() && ch != '\t' && ch != '\n')
        {
            return Err(PasswordPolicyError::InvalidCharacter);
        }

        if is_common_pattern(&normalized) {
            return Err(PasswordPolicyError::CommonPattern);
        }

        Ok(Self(normalized))
    }

    /// Wrap a password supplied for *verification* (login)
    ///
    /// Applies the same normalization as [`ClearTextPassword::new`] but no
    /// policy: a stored hash may predate the current policy, and rejecting
    /// early would make the request cheaper than a real verification.
    pub fn for_verification(raw: String) -> Self {
        Self(raw.nfkc().collect())
    }

    #[cfg(test)]
    pub fn new_unchecked(raw: String) -> Self {
        Self(raw)
    }

    fn peppered(&self, pepper: Option<&[u8]>) -> Vec<u8> {
        let mut bytes = self.0.as_bytes().to_vec();
        if let Some(p) = pepper {
            bytes.extend_from_slice(p);
        }
        bytes
    }

    /// Hash the password using Argon2id (OWASP defaults: m=19456, t=2, p=1)
    pub fn hash(&self, pepper: Option<&[u8]>) -> Result<HashedPassword, PasswordHashError> {
        let mut password_bytes = self.peppered(pepper);
        let salt = SaltString::generate(&mut OsRng);

        let result = Argon2::default()
            .hash_password(&password_bytes, &salt)
            .map(|hash| HashedPassword {
                hash: hash.to_string(),
            })
            .map_err(|e| PasswordHashError::HashingFailed(e.to_string()));

        password_bytes.zeroize();
        result
    }
}

impl fmt::Debug for ClearTextPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ClearTextPassword")
            .field(&"[REDACTED]")
            .finish()
    }
}

// ============================================================================
// Hashed Password (Safe to store)
// ============================================================================

/// Argon2id hash in PHC string format (algorithm, params, salt, hash)
#[derive(Clone, PartialEq, Eq)]
pub struct HashedPassword {
    hash: String,
}

impl HashedPassword {
    /// Create from PHC string (e.g., from database)
    pub fn from_phc_string(s: impl Into<String>) -> Result<Self, PasswordHashError> {
        let hash = s.into();
        PasswordHash::new(&hash).map_err(|_| PasswordHashError::InvalidHashFormat)?;
        Ok(Self { hash })
    }

    pub fn as_phc_string(&self) -> &str {
        &self.hash
    }

    /// Verify a password against this hash
    ///
    /// `pepper` must match the one used during hashing. Argon2 compares the
    /// digests in constant time.
    pub fn verify(&self, password: &ClearTextPassword, pepper: Option<&[u8]>) -> bool {
        let Ok(parsed_hash) = PasswordHash::new(&self.hash) else {
            return false;
        };

        let mut password_bytes = password.peppered(pepper);
        let valid = Argon2::default()
            .verify_password(&password_bytes, &parsed_hash)
            .is_ok();
        password_bytes.zeroize();
        valid
    }

    /// Run a full verification against a throwaway hash. Always `false`.
    ///
    /// Call this when the account being logged into does not exist.
    pub fn verify_against_dummy(password: &ClearTextPassword, pepper: Option<&[u8]>) -> bool {
        static DUMMY: OnceLock<Option<HashedPassword>> = OnceLock::new();

        let dummy = DUMMY.get_or_init(|| {
            let filler = ClearTextPassword(crate::crypto::random_hex(16));
            filler.hash(None).ok()
        });

        if let Some(hash) = dummy {
            let _ = hash.verify(password, pepper);
        }
        false
    }
}

impl fmt::Debug for HashedPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashedPassword")
            .field("hash", &"[HASH]")
            .finish()
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

fn is_common_pattern(password: &str) -> bool {
    let lower = password.to_lowercase();

    // Single repeated character (e.g., "aaaaaaaa")
    let mut chars = lower.chars();
    if let Some(first) = chars.next() {
        if chars.all(|c| c == first) {
            return true;
        }
    }

    if is_sequential_numbers(&lower) {
        return true;
    }

    const KEYBOARD_PATTERNS: &[&str] = &["qwerty", "asdfgh", "zxcvbn", "qazwsx", "1qaz2wsx"];
    if KEYBOARD_PATTERNS.iter().any(|p| lower.contains(p)) {
        return true;
    }

    const COMMON_PASSWORDS: &[&str] = &[
        "password",
        "password1",
        "password123",
        "abcdefgh",
        "letmein1",
        "welcome1",
        "admin123",
        "iloveyou",
        "sunshine",
        "football",
        "baseball",
        "trustno1",
    ];
    COMMON_PASSWORDS.contains(&lower.as_str())
}

/// Digits-only content that counts up or down (e.g. "12345678", "9876-5432")
fn is_sequential_numbers(s: &str) -> bool {
    let digits: Vec<u32> = s.chars().filter_map(|c| c.to_digit(10)).collect();

    if digits.len() < 4 || digits.len() != s.chars().filter(|c| c.is_alphanumeric()).count() {
        return false;
    }

    let ascending = digits.windows(2).all(|w| w[1] == (w[0] + 1) % 10);
    let descending = digits.windows(2).all(|w| w[0] == (w[1] + 1) % 10);
    ascending || descending
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_rejections() {
        assert!(matches!(
            ClearTextPassword::new("short".to_string()),
            Err(PasswordPolicyError::TooShort { min: 8, actual: 5 })
        ));
        assert!(matches!(
            ClearTextPassword::new("a1".repeat(MAX_PASSWORD_LENGTH)),
            Err(PasswordPolicyError::TooLong { .. })
        ));
        assert!(matches!(
            ClearTextPassword::new("        ".to_string()),
            Err(PasswordPolicyError::EmptyOrWhitespace)
        ));
        assert!(matches!(
            ClearTextPassword::new("abc\u{0007}defgh".to_string()),
            Err(PasswordPolicyError::InvalidCharacter)
        ));
    }

    #[test]
    fn test_common_patterns() {
        for weak in ["password123", "qwertyuiop", "12345678", "zzzzzzzzzz", "87654321"] {
            assert_eq!(
                ClearTextPassword::new(weak.to_string()).unwrap_err(),
                PasswordPolicyError::CommonPattern,
                "{weak} should be rejected"
            );
        }
    }

    #[test]
    fn test_valid_passwords() {
        assert!(ClearTextPassword::new("P@ssw0rd1".to_string()).is_ok());
        assert!(ClearTextPassword::new("NewP@ss1".to_string()).is_ok());
        assert!(ClearTextPassword::new("パスワード安全です!".to_string()).is_ok());
    }

    #[test]
    fn test_hash_and_verify() {
        let password = ClearTextPassword::new_unchecked("TestPassword123!".to_string());
        let hashed = password.hash(None).unwrap();

        assert!(hashed.verify(&password, None));

        let wrong = ClearTextPassword::for_verification("WrongPassword123!".to_string());
        assert!(!hashed.verify(&wrong, None));
    }

    #[test]
    fn test_hash_with_pepper() {
        let password = ClearTextPassword::new_unchecked("TestPassword123!".to_string());
        let pepper = b"my_secret_pepper";
        let hashed = password.hash(Some(pepper)).unwrap();

        assert!(hashed.verify(&password, Some(pepper)));
        assert!(!hashed.verify(&password, None));
        assert!(!hashed.verify(&password, Some(b"wrong_pepper")));
    }

    #[test]
    fn test_verification_normalizes_like_policy_constructor() {
        // U+FF21 (fullwidth A) folds to "A" under NFKC
        let set = ClearTextPassword::new("\u{FF21}bcdef#42x".to_string()).unwrap();
        let hashed = set.hash(None).unwrap();
        let attempt = ClearTextPassword::for_verification("Abcdef#42x".to_string());
        assert!(hashed.verify(&attempt, None));
    }

    #[test]
    fn test_dummy_verification_never_succeeds() {
        let attempt = ClearTextPassword::for_verification("anything at all".to_string());
        assert!(!HashedPassword::verify_against_dummy(&attempt, None));
    }

    #[test]
    fn test_phc_string_roundtrip() {
        let password = ClearTextPassword::new_unchecked("TestPassword123!".to_string());
        let hashed = password.hash(None).unwrap();

        let restored = HashedPassword::from_phc_string(hashed.as_phc_string()).unwrap();
        assert!(restored.verify(&password, None));
        assert!(HashedPassword::from_phc_string("not_a_valid_hash").is_err());
    }

    #[test]
    fn test_debug_redaction() {
        let password = ClearTextPassword::new_unchecked("secret".to_string());
        let debug_output = format!("{:?}", password);
        assert!(debug_output.contains("REDACTED"));
        assert!(!debug_output.contains("secret"));
    }
}
