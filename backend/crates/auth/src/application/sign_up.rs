//! Sign Up Use Case
//!
//! Creates a new, unverified account holding a verification token in one
//! write, then mails the verification link.

use std::sync::Arc;

use kernel::error::details::FieldErrors;

use crate::application::config::AuthConfig;
use crate::application::emails;
use crate::application::identity_store::IdentityStore;
use crate::domain::entity::account::Account;
use crate::domain::mailer::EmailDispatcher;
use crate::domain::repository::AccountRepository;
use crate::domain::value_object::{
    email::Email,
    full_name::FullName,
    user_name::UserName,
    user_password::{RawPassword, UserPassword},
};
use crate::error::{AuthError, AuthResult};

/// Sign up input
pub struct SignUpInput {
    pub email: String,
    pub user_name: String,
    pub password: String,
    pub full_name: String,
}

/// Sign up output
pub struct SignUpOutput {
    pub account: Account,
    /// Whether the verification email was handed to the dispatcher
    pub verification_sent: bool,
}

/// Sign up use case
pub struct SignUpUseCase<R, M>
where
    R: AccountRepository,
    M: EmailDispatcher,
{
    store: Arc<IdentityStore<R>>,
    mailer: Arc<M>,
    config: Arc<AuthConfig>,
}

impl<R, M> SignUpUseCase<R, M>
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

    pub async fn execute(&self, input: SignUpInput) -> AuthResult<SignUpOutput> {
        // Report every invalid field at once
        let mut errors = FieldErrors::new();
        let email = errors.capture("email", Email::new(&input.email));
        let user_name = errors.capture("username", UserName::new(&input.user_name));
        let password = errors.capture("password", RawPassword::new(input.password));
        let full_name = errors.capture("fullName", FullName::new(&input.full_name));

        let (Some(email), Some(user_name), Some(password), Some(full_name)) =
            (email, user_name, password, full_name)
        else {
            return Err(AuthError::Validation(errors));
        };

        let password_hash = UserPassword::from_raw(&password, self.config.pepper())?;
        let issued = self
            .store
            .create_account_with_verification(email, user_name, password_hash, full_name)
            .await?;

        let message = emails::email_verification(
            issued.account.email.clone(),
            &self.config.public_base_url,
            &issued.plaintext,
        );

        // The account stands even if the email cannot be sent; the user can ask again
        let verification_sent = match emails::deliver(self.mailer.as_ref(), message).await {
            Ok(()) => true,
            Err(_) => {
                tracing::warn!(
                    account_id = %issued.account.account_id,
                    "Verification email not sent at signup, token revoked"
                );
                if let Err(e) = self
                    .store
                    .revoke_email_verification_token(&issued.account.account_id, &issued.hash)
                    .await
                {
                    tracing::error!(error = %e, "Failed to revoke unsent verification token");
                }
                false
            }
        };

        let mut account = issued.account;
        if !verification_sent {
            account.email_verification = None;
            account.email_pending_verification = None;
        }

        tracing::info!(
            account_id = %account.account_id,
            user_name = %account.user_name,
            "User signed up"
        );

        Ok(SignUpOutput {
            account,
            verification_sent,
        })
    }
}
