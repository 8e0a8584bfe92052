//! Account Entity
//!
//! The aggregate every credential hangs off: password hash, role, the
//! server-side mirror of the refresh token and the outstanding security
//! tokens.
//!
//! At most one security token per purpose is live at a time. Issuing a new
//! one overwrites the previous hash, which is what revokes it.

use chrono::{DateTime, Utc};
use kernel::id::AccountId;
use platform::crypto::constant_time_eq;

use crate::domain::value_object::{
    email::Email,
    full_name::FullName,
    role::Role,
    security_token::{OutstandingToken, SecurityTokenHash, TokenPurpose},
    user_name::UserName,
    user_password::UserPassword,
};

#[derive(Debug, Clone)]
pub struct Account {
    pub account_id: AccountId,
    pub email: Email,
    pub user_name: UserName,
    pub full_name: FullName,
    pub password_hash: UserPassword,
    pub role: Role,
    /// Current refresh token; the only one honored for this account
    pub refresh_token: Option<String>,
    pub is_verified: bool,
    /// Address the outstanding verification token will confirm
    pub email_pending_verification: Option<Email>,
    pub email_verification: Option<OutstandingToken>,
    pub password_reset: Option<OutstandingToken>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// New, unverified account with the `User` role
    pub fn new(
        email: Email,
        user_name: UserName,
        full_name: FullName,
        password_hash: UserPassword,
    ) -> Self {
        let now = Utc::now();
        Self {
            account_id: AccountId::new(),
            email,
            user_name,
            full_name,
            password_hash,
            role: Role::User,
            refresh_token: None,
            is_verified: false,
            email_pending_verification: None,
            email_verification: None,
            password_reset: None,
            created_at: now,
            updated_at: now,
        }
    }

    // ------------------------------------------------------------------
    // Refresh token mirror
    // ------------------------------------------------------------------

    pub fn set_refresh_token(&mut self, token: String) {
        self.refresh_token = Some(token);
        self.updated_at = Utc::now();
    }

    /// Returns whether a token was stored
    pub fn clear_refresh_token(&mut self) -> bool {
        let had_token = self.refresh_token.take().is_some();
        if had_token {
            self.updated_at = Utc::now();
        }
        had_token
    }

    /// Constant-time comparison against the stored refresh token
    pub fn holds_refresh_token(&self, presented: &str) -> bool {
        self.refresh_token
            .as_deref()
            .is_some_and(|stored| constant_time_eq(stored.as_bytes(), presented.as_bytes()))
    }

    // ------------------------------------------------------------------
    // Security tokens
    // ------------------------------------------------------------------

    pub fn outstanding(&self, purpose: TokenPurpose) -> Option<&OutstandingToken> {
        match purpose {
            TokenPurpose::PasswordReset => self.password_reset.as_ref(),
            TokenPurpose::EmailVerification => self.email_verification.as_ref(),
        }
    }

    /// Replace any outstanding reset token
    pub fn begin_password_reset(&mut self, hash: SecurityTokenHash, expires_at: DateTime<Utc>) {
        self.password_reset = Some(OutstandingToken::new(hash, expires_at));
        self.updated_at = Utc::now();
    }

    /// Consume the reset token if `plaintext` matches and it has not expired
    ///
    /// The token is left untouched on failure.
    pub fn redeem_password_reset(&mut self, plaintext: &str, now: DateTime<Utc>) -> bool {
        let redeemed = self
            .password_reset
            .as_ref()
            .is_some_and(|token| token.redeemable_by(plaintext, now));
        if redeemed {
            self.password_reset = None;
            self.updated_at = now;
        }
        redeemed
    }

    /// Clear the reset token, but only if it is still the one identified by `hash`
    pub fn revoke_password_reset(&mut self, hash: &SecurityTokenHash) -> bool {
        if self.password_reset.as_ref().is_some_and(|token| &token.hash == hash) {
            self.password_reset = None;
            self.updated_at = Utc::now();
            true
        } else {
            false
        }
    }

    /// Replace any outstanding verification token; `email` is the address it confirms
    pub fn begin_email_verification(
        &mut self,
        email: Email,
        hash: SecurityTokenHash,
        expires_at: DateTime<Utc>,
    ) {
        self.email_pending_verification = Some(email);
        self.email_verification = Some(OutstandingToken::new(hash, expires_at));
        self.updated_at = Utc::now();
    }

    /// Consume the verification token, marking the pending address verified
    pub fn redeem_email_verification(&mut self, plaintext: &str, now: DateTime<Utc>) -> bool {
        let redeemed = self
            .email_verification
            .as_ref()
            .is_some_and(|token| token.redeemable_by(plaintext, now));
        if redeemed {
            if let Some(email) = self.email_pending_verification.take() {
                self.email = email;
            }
            self.email_verification = None;
            self.is_verified = true;
            self.updated_at = now;
        }
        redeemed
    }

    pub fn revoke_email_verification(&mut self, hash: &SecurityTokenHash) -> bool {
        if self.email_verification.as_ref().is_some_and(|token| &token.hash == hash) {
            self.email_verification = None;
            self.email_pending_verification = None;
            self.updated_at = Utc::now();
            true
        } else {
            false
        }
    }

    // ------------------------------------------------------------------
    // Password
    // ------------------------------------------------------------------

    /// Replace the password hash; the stored refresh token is dropped with it
    pub fn change_password(&mut self, new_password: UserPassword) {
        self.password_hash = new_password;
        self.refresh_token = None;
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::services::secure_token::SecureTokenFactory;
    use crate::domain::value_object::user_password::RawPassword;
    use chrono::Duration;

    fn account() -> Account {
        let raw = RawPassword::new("P@ssw0rd1".to_string()).unwrap();
        Account::new(
            Email::new("a@x.com").unwrap(),
            UserName::new("user1").unwrap(),
            FullName::new("A B").unwrap(),
            UserPassword::from_raw(&raw, None).unwrap(),
        )
    }

    #[test]
    fn test_new_account_defaults() {
        let account = account();
        assert_eq!(account.role, Role::User);
        assert!(!account.is_verified);
        assert!(account.refresh_token.is_none());
        assert!(account.outstanding(TokenPurpose::PasswordReset).is_none());
        assert!(account.outstanding(TokenPurpose::EmailVerification).is_none());
    }

    #[test]
    fn test_refresh_token_mirror() {
        let mut account = account();
        assert!(!account.holds_refresh_token("abc"));

        account.set_refresh_token("abc".into());
        assert!(account.holds_refresh_token("abc"));
        assert!(!account.holds_refresh_token("abd"));

        assert!(account.clear_refresh_token());
        assert!(!account.clear_refresh_token());
        assert!(!account.holds_refresh_token("abc"));
    }

    #[test]
    fn test_second_reset_token_overwrites_first() {
        let mut account = account();
        let now = Utc::now();
        let first = SecureTokenFactory::generate();
        let second = SecureTokenFactory::generate();

        account.begin_password_reset(first.hash.clone(), now + Duration::minutes(15));
        account.begin_password_reset(second.hash.clone(), now + Duration::minutes(15));

        assert!(!account.redeem_password_reset(&first.plaintext, now));
        assert!(account.redeem_password_reset(&second.plaintext, now));
        assert!(!account.redeem_password_reset(&second.plaintext, now));
    }

    #[test]
    fn test_expired_reset_token_is_kept_but_not_redeemable() {
        let mut account = account();
        let now = Utc::now();
        let issued = SecureTokenFactory::generate();
        account.begin_password_reset(issued.hash, now);

        assert!(!account.redeem_password_reset(&issued.plaintext, now));
        assert!(account.password_reset.is_some());
    }

    #[test]
    fn test_revoke_only_matching_hash() {
        let mut account = account();
        let expires = Utc::now() + Duration::minutes(15);
        let stale = SecureTokenFactory::generate();
        let fresh = SecureTokenFactory::generate();

        account.begin_password_reset(fresh.hash.clone(), expires);
        assert!(!account.revoke_password_reset(&stale.hash));
        assert!(account.password_reset.is_some());
        assert!(account.revoke_password_reset(&fresh.hash));
        assert!(account.password_reset.is_none());
    }

    #[test]
    fn test_email_verification_swaps_address() {
        let mut account = account();
        let now = Utc::now();
        let issued = SecureTokenFactory::generate();
        let new_email = Email::new("b@x.com").unwrap();

        account.begin_email_verification(new_email.clone(), issued.hash, now + Duration::minutes(15));
        assert!(account.redeem_email_verification(&issued.plaintext, now));

        assert!(account.is_verified);
        assert_eq!(account.email, new_email);
        assert!(account.email_pending_verification.is_none());
        assert!(account.email_verification.is_none());
    }

    #[test]
    fn test_change_password_drops_refresh_token() {
        let mut account = account();
        account.set_refresh_token("rt".into());
        let raw = RawPassword::new("NewP@ss1".to_string()).unwrap();
        account.change_password(UserPassword::from_raw(&raw, None).unwrap());

        assert!(account.refresh_token.is_none());
        assert!(account.password_hash.verify(&raw, None));
    }
}
