//! User Password Value Object
//!
//! Domain value object for user passwords with NIST SP 800-63B compliance.
//! Delegates to `platform::password` for cryptographic operations.
//!
//! ## Usage
//! ```rust
//! use auth::domain::value_object::user_password::{RawPassword, UserPassword};
//!
//! let raw = RawPassword::new("MySecurePass123!".to_string()).unwrap();
//! let hashed = UserPassword::from_raw(&raw, None).unwrap();
//! assert!(hashed.verify(&raw, None));
//! ```

use platform::password::{ClearTextPassword, HashedPassword, PasswordPolicyError};
use std::fmt;

use super::InvalidValue;
use crate::error::{AuthError, AuthResult};

// ============================================================================
// Raw Password (User Input)
// ============================================================================

/// Raw password from user input
///
/// Memory is zeroized when dropped.
pub struct RawPassword(ClearTextPassword);

impl RawPassword {
    /// Create a password that is about to be *set*, enforcing the policy
    ///
    /// - 8 to 128 characters after NFKC normalization
    /// - No control characters
    /// - No common patterns (sequential, keyboard, dictionary)
    pub fn new(raw: String) -> Result<Self, InvalidValue> {
        let clear_text = ClearTextPassword::new(raw).map_err(|e| match e {
            PasswordPolicyError::TooShort { min, .. } => {
                InvalidValue::new(format!("Password must be at least {min} characters"))
            }
            PasswordPolicyError::TooLong { max, .. } => {
                InvalidValue::new(format!("Password must be at most {max} characters"))
            }
            PasswordPolicyError::EmptyOrWhitespace => InvalidValue::new("Password is required"),
            PasswordPolicyError::InvalidCharacter => {
                InvalidValue::new("Password contains invalid characters")
            }
            PasswordPolicyError::CommonPattern => {
                InvalidValue::new("Password is too common or follows a predictable pattern")
            }
        })?;

        Ok(Self(clear_text))
    }

    /// Wrap a password presented at login; no policy is applied
    pub fn for_login(raw: String) -> Self {
        Self(ClearTextPassword::for_verification(raw))
    }

    pub(crate) fn inner(&self) -> &ClearTextPassword {
        &self.0
    }
}

impl fmt::Debug for RawPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RawPassword").field(&"[REDACTED]").finish()
    }
}

// ============================================================================
// User Password (Hashed, for storage)
// ============================================================================

/// Argon2id hash of a user password, in PHC string format
#[derive(Clone, PartialEq, Eq)]
pub struct UserPassword(HashedPassword);

impl UserPassword {
    /// Hash a raw password
    ///
    /// `pepper` is the application-wide secret appended before hashing.
    pub fn from_raw(raw: &RawPassword, pepper: Option<&[u8]>) -> AuthResult<Self> {
        raw.inner()
            .hash(pepper)
            .map(Self)
            .map_err(|e| AuthError::Internal(e.to_string()))
    }

    /// Create from PHC string (from database)
    pub fn from_phc_string(phc_string: impl Into<String>) -> AuthResult<Self> {
        HashedPassword::from_phc_string(phc_string)
            .map(Self)
            .map_err(|_| AuthError::Internal("Invalid password hash in database".into()))
    }

    pub fn as_phc_string(&self) -> &str {
        self.0.as_phc_string()
    }

    /// Verify a raw password against this hash (constant time)
    pub fn verify(&self, raw: &RawPassword, pepper: Option<&[u8]>) -> bool {
        self.0.verify(raw.inner(), pepper)
    }

    /// Burn one verification's worth of work for an unknown account. Always `false`.
    pub fn verify_unknown(raw: &RawPassword, pepper: Option<&[u8]>) -> bool {
        HashedPassword::verify_against_dummy(raw.inner(), pepper)
    }
}

impl fmt::Debug for UserPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserPassword")
            .field("hash", &"[HASH]")
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
