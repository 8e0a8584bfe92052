//! Repository Traits
//!
//! Interfaces for data persistence. Implementation is in infrastructure layer.

use kernel::id::AccountId;

use crate::domain::entity::account::Account;
use crate::domain::value_object::{
    email::Email,
    security_token::{SecurityTokenHash, TokenPurpose},
    user_name::UserName,
};
use crate::error::AuthResult;

/// Account repository trait
///
/// `create` and `update` report uniqueness violations as
/// `AuthError::UserNameTaken` / `AuthError::EmailTaken`.
#[trait_variant::make(AccountRepository: Send)]
pub trait LocalAccountRepository {
    /// Insert a new account
    async fn create(&self, account: &Account) -> AuthResult<()>;

    async fn find_by_id(&self, account_id: &AccountId) -> AuthResult<Option<Account>>;

    /// Find by canonical user name
    async fn find_by_user_name(&self, user_name: &UserName) -> AuthResult<Option<Account>>;

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<Account>>;

    /// Find the account whose stored refresh token equals `token`
    async fn find_by_refresh_token(&self, token: &str) -> AuthResult<Option<Account>>;

    /// Find the account holding an outstanding token with this hash
    async fn find_by_security_token(
        &self,
        purpose: TokenPurpose,
        hash: &SecurityTokenHash,
    ) -> AuthResult<Option<Account>>;

    /// Persist the complete account state
    async fn update(&self, account: &Account) -> AuthResult<()>;
}
