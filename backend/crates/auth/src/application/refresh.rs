//! Refresh Use Case
//!
//! Trades a refresh token for a new access token. The refresh token must
//! verify *and* equal the copy stored on its account; every rejection looks
//! the same to the caller.
//!
//! The refresh token itself is not rotated here.

use std::sync::Arc;

use crate::application::identity_store::IdentityStore;
use crate::application::token_codec::{TokenCodec, TokenKind};
use crate::domain::repository::AccountRepository;
use crate::error::{AuthError, AuthResult};

/// Refresh use case
pub struct RefreshUseCase<R>
where
    R: AccountRepository,
{
    store: Arc<IdentityStore<R>>,
    codec: Arc<TokenCodec>,
}

impl<R> RefreshUseCase<R>
where
    R: AccountRepository,
{
    pub fn new(store: Arc<IdentityStore<R>>, codec: Arc<TokenCodec>) -> Self {
        Self { store, codec }
    }

    /// Returns a new access token
    pub async fn execute(&self, refresh_token: Option<&str>) -> AuthResult<String> {
        let token = refresh_token.ok_or(AuthError::Unauthorized)?;

        let verified = self.codec.verify(token, TokenKind::Refresh).map_err(|e| {
            tracing::debug!(error = ?e, "Refresh token failed verification");
            AuthError::Forbidden
        })?;

        let account = self
            .store
            .find_by_id(&verified.subject)
            .await?
            .ok_or(AuthError::Forbidden)?;

        if !account.holds_refresh_token(token) {
            tracing::warn!(
                account_id = %account.account_id,
                "Refresh token does not match the stored token"
            );
            return Err(AuthError::Forbidden);
        }

        self.codec.issue_access_token(account.account_id, account.role)
    }
}
