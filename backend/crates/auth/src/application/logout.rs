//! Logout Use Case
//!
//! Drops the server-side copy of the refresh token, which is what makes
//! the cookie worthless even before it expires.

use std::sync::Arc;

use crate::application::identity_store::IdentityStore;
use crate::domain::repository::AccountRepository;
use crate::error::AuthResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogoutOutcome {
    /// A stored refresh token was found and cleared
    LoggedOut,
    /// No cookie, or the cookie matched no account
    NoSession,
}

/// Logout use case
pub struct LogoutUseCase<R>
where
    R: AccountRepository,
{
    store: Arc<IdentityStore<R>>,
}

impl<R> LogoutUseCase<R>
where
    R: AccountRepository,
{
    pub fn new(store: Arc<IdentityStore<R>>) -> Self {
        Self { store }
    }

    pub async fn execute(&self, refresh_token: Option<&str>) -> AuthResult<LogoutOutcome> {
        let Some(token) = refresh_token else {
            return Ok(LogoutOutcome::NoSession);
        };

        let Some(account) = self.store.find_by_refresh_token(token).await? else {
            return Ok(LogoutOutcome::NoSession);
        };

        let account_id = account.account_id;
        if self.store.clear_refresh_token(account).await? {
            tracing::info!(account_id = %account_id, "User logged out");
            Ok(LogoutOutcome::LoggedOut)
        } else {
            Ok(LogoutOutcome::NoSession)
        }
    }
}
