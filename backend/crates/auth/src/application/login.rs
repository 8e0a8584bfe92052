//! Login Use Case
//!
//! Exchanges user name and password for an access token and a refresh
//! token. The refresh token is mirrored on the account.

use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::application::identity_store::IdentityStore;
use crate::application::token_codec::TokenCodec;
use crate::domain::entity::account::Account;
use crate::domain::repository::AccountRepository;
use crate::domain::value_object::{
    user_name::UserName,
    user_password::{RawPassword, UserPassword},
};
use crate::error::{AuthError, AuthResult};

/// Login input
pub struct LoginInput {
    pub user_name: String,
    pub password: String,
}

/// Login output
pub struct LoginOutput {
    pub access_token: String,
    pub refresh_token: String,
    pub account: Account,
}

/// Login use case
pub struct LoginUseCase<R>
where
    R: AccountRepository,
{
    store: Arc<IdentityStore<R>>,
    codec: Arc<TokenCodec>,
    config: Arc<AuthConfig>,
}

impl<R> LoginUseCase<R>
where
    R: AccountRepository,
{
    pub fn new(store: Arc<IdentityStore<R>>, codec: Arc<TokenCodec>, config: Arc<AuthConfig>) -> Self {
        Self {
            store,
            codec,
            config,
        }
    }

    pub async fn execute(&self, input: LoginInput) -> AuthResult<LoginOutput> {
        if input.user_name.trim().is_empty() {
            return Err(AuthError::invalid_field("username", "Username is required"));
        }
        if input.password.is_empty() {
            return Err(AuthError::invalid_field("password", "Password is required"));
        }

        let password = RawPassword::for_login(input.password);

        // A name that can't exist is handled like one that doesn't
        let account = match UserName::new(&input.user_name) {
            Ok(user_name) => self.store.find_by_user_name(&user_name).await?,
            Err(_) => None,
        };

        let Some(account) = account else {
            UserPassword::verify_unknown(&password, self.config.pepper());
            return Err(AuthError::InvalidCredentials);
        };

        if !account.password_hash.verify(&password, self.config.pepper()) {
            return Err(AuthError::InvalidCredentials);
        }

        let access_token = self.codec.issue_access_token(account.account_id, account.role)?;
        let refresh_token = self.codec.issue_refresh_token(account.account_id)?;
        let account = self
            .store
            .set_refresh_token(account, refresh_token.clone())
            .await?;

        tracing::info!(
            account_id = %account.account_id,
            role = %account.role,
            "User logged in"
        );

        Ok(LoginOutput {
            access_token,
            refresh_token,
            account,
        })
    }
}
