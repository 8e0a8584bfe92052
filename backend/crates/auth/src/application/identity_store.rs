//! Identity Store
//!
//! Account-record operations the credential flows depend on. Every
//! mutation builds the complete new account state and persists it with a
//! single repository call, so an abandoned request never leaves a half-applied
//! change behind.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use kernel::id::AccountId;

use crate::domain::entity::account::Account;
use crate::domain::repository::AccountRepository;
use crate::domain::services::secure_token::SecureTokenFactory;
use crate::domain::value_object::{
    email::Email,
    full_name::FullName,
    security_token::{SecurityTokenHash, TokenPurpose},
    user_name::UserName,
    user_password::UserPassword,
};
use crate::error::{AuthError, AuthResult};

/// A security token that has just been stored; `plaintext` is not kept anywhere else
pub struct IssuedToken {
    pub account: Account,
    pub plaintext: String,
    pub hash: SecurityTokenHash,
}

pub struct IdentityStore<R: AccountRepository> {
    repo: Arc<R>,
    security_token_ttl: Duration,
}

impl<R: AccountRepository> IdentityStore<R> {
    pub fn new(repo: Arc<R>, security_token_ttl: Duration) -> Self {
        Self {
            repo,
            security_token_ttl,
        }
    }

    // ------------------------------------------------------------------
    // Lookups
    // ------------------------------------------------------------------

    pub async fn find_by_id(&self, account_id: &AccountId) -> AuthResult<Option<Account>> {
        self.repo.find_by_id(account_id).await
    }

    pub async fn find_by_user_name(&self, user_name: &UserName) -> AuthResult<Option<Account>> {
        self.repo.find_by_user_name(user_name).await
    }

    pub async fn find_by_email(&self, email: &Email) -> AuthResult<Option<Account>> {
        self.repo.find_by_email(email).await
    }

    pub async fn find_by_refresh_token(&self, token: &str) -> AuthResult<Option<Account>> {
        self.repo.find_by_refresh_token(token).await
    }

    // ------------------------------------------------------------------
    // Accounts and refresh tokens
    // ------------------------------------------------------------------

    /// New unverified `User` account
    pub async fn create_account(
        &self,
        email: Email,
        user_name: UserName,
        password_hash: UserPassword,
        full_name: FullName,
    ) -> AuthResult<Account> {
        let account = Account::new(email, user_name, full_name, password_hash);
        self.repo.create(&account).await?;

        tracing::info!(account_id = %account.account_id, "Account created");
        Ok(account)
    }

    /// New unverified `User` account stored together with a verification
    /// token for its own address
    pub async fn create_account_with_verification(
        &self,
        email: Email,
        user_name: UserName,
        password_hash: UserPassword,
        full_name: FullName,
    ) -> AuthResult<IssuedToken> {
        let mut account = Account::new(email, user_name, full_name, password_hash);
        let generated = SecureTokenFactory::generate();
        let pending = account.email.clone();
        let expires_at = self.expires_at(Utc::now())?;
        account.begin_email_verification(pending, generated.hash.clone(), expires_at);
        self.repo.create(&account).await?;

        tracing::info!(account_id = %account.account_id, "Account created");
        Ok(IssuedToken {
            account,
            plaintext: generated.plaintext,
            hash: generated.hash,
        })
    }

    pub async fn set_refresh_token(&self, mut account: Account, token: String) -> AuthResult<Account> {
        account.set_refresh_token(token);
        self.repo.update(&account).await?;
        Ok(account)
    }

    /// Returns whether a token had been stored
    pub async fn clear_refresh_token(&self, mut account: Account) -> AuthResult<bool> {
        if !account.clear_refresh_token() {
            return Ok(false);
        }
        self.repo.update(&account).await?;
        Ok(true)
    }

    // ------------------------------------------------------------------
    // Password reset
    // ------------------------------------------------------------------

    /// Issue a reset token, invalidating any earlier one
    pub async fn issue_password_reset_token(&self, account: Account) -> AuthResult<IssuedToken> {
        self.issue_password_reset_token_at(account, Utc::now()).await
    }

    pub async fn issue_password_reset_token_at(
        &self,
        mut account: Account,
        now: DateTime<Utc>,
    ) -> AuthResult<IssuedToken> {
        let generated = SecureTokenFactory::generate();
        account.begin_password_reset(generated.hash.clone(), self.expires_at(now)?);
        self.repo.update(&account).await?;

        Ok(IssuedToken {
            account,
            plaintext: generated.plaintext,
            hash: generated.hash,
        })
    }

    pub async fn consume_password_reset_token(&self, plaintext: &str) -> AuthResult<Account> {
        let mut account = self.holder_of(TokenPurpose::PasswordReset, plaintext).await?;
        if !account.redeem_password_reset(plaintext, Utc::now()) {
            return Err(AuthError::TokenInvalidOrExpired);
        }
        self.repo.update(&account).await?;
        Ok(account)
    }

    /// Consume the reset token and install `new_password` in one write
    ///
    /// The stored refresh token is cleared with it.
    pub async fn reset_password(&self, plaintext: &str, new_password: UserPassword) -> AuthResult<Account> {
        let mut account = self.holder_of(TokenPurpose::PasswordReset, plaintext).await?;
        if !account.redeem_password_reset(plaintext, Utc::now()) {
            return Err(AuthError::TokenInvalidOrExpired);
        }
        account.change_password(new_password);
        self.repo.update(&account).await?;

        tracing::info!(account_id = %account.account_id, "Password reset");
        Ok(account)
    }

    /// Roll back a reset token whose email never went out
    ///
    /// Does nothing if a newer token has replaced it in the meantime.
    pub async fn revoke_password_reset_token(
        &self,
        account_id: &AccountId,
        hash: &SecurityTokenHash,
    ) -> AuthResult<()> {
        let Some(mut account) = self.repo.find_by_id(account_id).await? else {
            return Ok(());
        };
        if account.revoke_password_reset(hash) {
            self.repo.update(&account).await?;
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Email verification
    // ------------------------------------------------------------------

    /// Issue a verification token confirming `email`, invalidating any earlier one
    pub async fn issue_email_verification_token(
        &self,
        account: Account,
        email: Email,
    ) -> AuthResult<IssuedToken> {
        self.issue_email_verification_token_at(account, email, Utc::now()).await
    }

    pub async fn issue_email_verification_token_at(
        &self,
        mut account: Account,
        email: Email,
        now: DateTime<Utc>,
    ) -> AuthResult<IssuedToken> {
        let generated = SecureTokenFactory::generate();
        account.begin_email_verification(email, generated.hash.clone(), self.expires_at(now)?);
        self.repo.update(&account).await?;

        Ok(IssuedToken {
            account,
            plaintext: generated.plaintext,
            hash: generated.hash,
        })
    }

    /// Mark the account verified and adopt the pending address
    pub async fn consume_email_verification_token(&self, plaintext: &str) -> AuthResult<Account> {
        let mut account = self.holder_of(TokenPurpose::EmailVerification, plaintext).await?;
        if !account.redeem_email_verification(plaintext, Utc::now()) {
            return Err(AuthError::TokenInvalidOrExpired);
        }
        self.repo.update(&account).await?;

        tracing::info!(account_id = %account.account_id, "Email verified");
        Ok(account)
    }

    pub async fn revoke_email_verification_token(
        &self,
        account_id: &AccountId,
        hash: &SecurityTokenHash,
    ) -> AuthResult<()> {
        let Some(mut account) = self.repo.find_by_id(account_id).await? else {
            return Ok(());
        };
        if account.revoke_email_verification(hash) {
            self.repo.update(&account).await?;
        }
        Ok(())
    }

    // ------------------------------------------------------------------

    async fn holder_of(&self, purpose: TokenPurpose, plaintext: &str) -> AuthResult<Account> {
        let hash = SecureTokenFactory::hash(plaintext);
        self.repo
            .find_by_security_token(purpose, &hash)
            .await?
            .ok_or(AuthError::TokenInvalidOrExpired)
    }

    fn expires_at(&self, now: DateTime<Utc>) -> AuthResult<DateTime<Utc>> {
        chrono::Duration::from_std(self.security_token_ttl)
            .ok()
            .and_then(|ttl| now.checked_add_signed(ttl))
            .ok_or_else(|| AuthError::Internal("Security token TTL out of range".into()))
    }
}
