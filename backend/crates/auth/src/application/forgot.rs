//! Forgot Password / Forgot Username Use Cases
//!
//! Both answer with the same message whether or not the address belongs
//! to an account. Requests are rate limited per address and endpoint.

use std::sync::Arc;

use platform::rate_limit::RateLimitStore;

use crate::application::config::AuthConfig;
use crate::application::emails;
use crate::application::identity_store::IdentityStore;
use crate::domain::mailer::EmailDispatcher;
use crate::domain::repository::AccountRepository;
use crate::domain::value_object::email::Email;
use crate::error::{AuthError, AuthResult};

pub const FORGOT_PASSWORD_MESSAGE: &str =
    "If an account with that email exists, a password reset link has been sent";
pub const FORGOT_USERNAME_MESSAGE: &str =
    "If an account with that email exists, the username has been sent to it";

/// Forgot password use case
pub struct ForgotPasswordUseCase<R, M, L>
where
    R: AccountRepository,
    M: EmailDispatcher,
    L: RateLimitStore,
{
    store: Arc<IdentityStore<R>>,
    mailer: Arc<M>,
    limiter: Arc<L>,
    config: Arc<AuthConfig>,
}

impl<R, M, L> ForgotPasswordUseCase<R, M, L>
where
    R: AccountRepository,
    M: EmailDispatcher,
    L: RateLimitStore,
{
    pub fn new(
        store: Arc<IdentityStore<R>>,
        mailer: Arc<M>,
        limiter: Arc<L>,
        config: Arc<AuthConfig>,
    ) -> Self {
        Self {
            store,
            mailer,
            limiter,
            config,
        }
    }

    pub async fn execute(&self, email: &str) -> AuthResult<&'static str> {
        let email = Email::new(email).map_err(|e| AuthError::invalid_field("email", e.to_string()))?;
        throttle(self.limiter.as_ref(), &self.config, "forgot_password", &email).await?;

        let Some(account) = self.store.find_by_email(&email).await? else {
            tracing::debug!("Password reset requested for unknown address");
            return Ok(FORGOT_PASSWORD_MESSAGE);
        };

        let issued = self.store.issue_password_reset_token(account).await?;
        let message = emails::password_reset(
            issued.account.email.clone(),
            &self.config.public_base_url,
            &issued.plaintext,
        );

        if let Err(e) = emails::deliver(self.mailer.as_ref(), message).await {
            self.store
                .revoke_password_reset_token(&issued.account.account_id, &issued.hash)
                .await?;
            return Err(e);
        }

        tracing::info!(account_id = %issued.account.account_id, "Password reset token issued");
        Ok(FORGOT_PASSWORD_MESSAGE)
    }
}

/// Forgot username use case
pub struct ForgotUsernameUseCase<R, M, L>
where
    R: AccountRepository,
    M: EmailDispatcher,
    L: RateLimitStore,
{
    store: Arc<IdentityStore<R>>,
    mailer: Arc<M>,
    limiter: Arc<L>,
    config: Arc<AuthConfig>,
}

impl<R, M, L> ForgotUsernameUseCase<R, M, L>
where
    R: AccountRepository,
    M: EmailDispatcher,
    L: RateLimitStore,
{
    pub fn new(
        store: Arc<IdentityStore<R>>,
        mailer: Arc<M>,
        limiter: Arc<L>,
        config: Arc<AuthConfig>,
    ) -> Self {
        Self {
            store,
            mailer,
            limiter,
            config,
        }
    }

    pub async fn execute(&self, email: &str) -> AuthResult<&'static str> {
        let email = Email::new(email).map_err(|e| AuthError::invalid_field("email", e.to_string()))?;
        throttle(self.limiter.as_ref(), &self.config, "forgot_username", &email).await?;

        let Some(account) = self.store.find_by_email(&email).await? else {
            tracing::debug!("Username reminder requested for unknown address");
            return Ok(FORGOT_USERNAME_MESSAGE);
        };

        let message = emails::username_reminder(account.email.clone(), &account.user_name);
        emails::deliver(self.mailer.as_ref(), message).await?;

        tracing::info!(account_id = %account.account_id, "Username reminder sent");
        Ok(FORGOT_USERNAME_MESSAGE)
    }
}

async fn throttle<L: RateLimitStore>(
    limiter: &L,
    config: &AuthConfig,
    scope: &str,
    email: &Email,
) -> AuthResult<()> {
    let key = format!("{scope}:{email}");
    let result = limiter
        .check_and_increment(&key, &config.forgot_rate_limit)
        .await?;

    if result.allowed {
        Ok(())
    } else {
        Err(AuthError::RateLimited {
            retry_after: result.retry_after,
        })
    }
}
