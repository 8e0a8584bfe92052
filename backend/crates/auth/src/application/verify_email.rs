//! Email Verification Use Cases

use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::application::emails;
use crate::application::identity_store::IdentityStore;
use crate::domain::mailer::EmailDispatcher;
use crate::domain::repository::AccountRepository;
use crate::domain::value_object::{email::Email, identity::Identity};
use crate::error::{AuthError, AuthResult};

/// Verify email use case
pub struct VerifyEmailUseCase<R>
where
    R: AccountRepository,
{
    store: Arc<IdentityStore<R>>,
}

impl<R> VerifyEmailUseCase<R>
where
    R: AccountRepository,
{
    pub fn new(store: Arc<IdentityStore<R>>) -> Self {
        Self { store }
    }

    pub async fn execute(&self, token: &str) -> AuthResult<()> {
        self.store.consume_email_verification_token(token).await?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationRequest {
    Sent,
    AlreadyVerified,
}

/// (Re)send a verification link to the caller, optionally for a new address
pub struct RequestEmailVerificationUseCase<R, M>
where
    R: AccountRepository,
    M: EmailDispatcher,
{
    store: Arc<IdentityStore<R>>,
    mailer: Arc<M>,
    config: Arc<AuthConfig>,
}

impl<R, M> RequestEmailVerificationUseCase<R, M>
where
    R: AccountRepository,
    M: EmailDispatcher,
{
    pub fn new(store: Arc<IdentityStore<R>>, mailer: Arc<M>, config: Arc<AuthConfig>) -> Self {
        Self {
            store,
            mailer,
            config,
        }
    }

    pub async fn execute(&self, identity: &Identity, email: Option<&str>) -> AuthResult<VerificationRequest> {
        let account = self
            .store
            .find_by_id(&identity.account_id)
            .await?
            .ok_or(AuthError::NotFound("Account"))?;

        let target = match email {
            Some(raw) => Email::new(raw).map_err(|e| AuthError::invalid_field("email", e.to_string()))?,
            None => account.email.clone(),
        };

        if target == account.email && account.is_verified {
            return Ok(VerificationRequest::AlreadyVerified);
        }

        if target != account.email {
            let owner = self.store.find_by_email(&target).await?;
            if owner.is_some_and(|other| other.account_id != account.account_id) {
                return Err(AuthError::EmailTaken);
            }
        }

        let issued = self
            .store
            .issue_email_verification_token(account, target.clone())
            .await?;
        let message = emails::email_verification(target, &self.config.public_base_url, &issued.plaintext);

        if let Err(e) = emails::deliver(self.mailer.as_ref(), message).await {
            self.store
                .revoke_email_verification_token(&issued.account.account_id, &issued.hash)
                .await?;
            return Err(e);
        }

        tracing::info!(account_id = %issued.account.account_id, "Verification email sent");
        Ok(VerificationRequest::Sent)
    }
}
