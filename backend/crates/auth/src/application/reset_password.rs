//! Reset Password Use Case
//!
//! Redeems a password reset token for a new password. Any session held
//! through a refresh token ends with it.

use std::sync::Arc;

use kernel::error::details::FieldErrors;

use crate::application::config::AuthConfig;
use crate::application::identity_store::IdentityStore;
use crate::domain::repository::AccountRepository;
use crate::domain::value_object::user_password::{RawPassword, UserPassword};
use crate::error::{AuthError, AuthResult};

pub struct ResetPasswordInput {
    pub token: String,
    pub new_password: String,
    pub confirm_password: String,
}

/// Reset password use case
pub struct ResetPasswordUseCase<R>
where
    R: AccountRepository,
{
    store: Arc<IdentityStore<R>>,
    config: Arc<AuthConfig>,
}

impl<R> ResetPasswordUseCase<R>
where
    R: AccountRepository,
{
    pub fn new(store: Arc<IdentityStore<R>>, config: Arc<AuthConfig>) -> Self {
        Self { store, config }
    }

    pub async fn execute(&self, input: ResetPasswordInput) -> AuthResult<()> {
        let mut errors = FieldErrors::new();
        if input.new_password != input.confirm_password {
            errors.add("confirmPassword", "Passwords do not match");
        }
        let password = errors.capture("newPassword", RawPassword::new(input.new_password));

        let Some(password) = password.filter(|_| errors.is_empty()) else {
            return Err(AuthError::Validation(errors));
        };

        let password_hash = UserPassword::from_raw(&password, self.config.pepper())?;
        self.store.reset_password(&input.token, password_hash).await?;
        Ok(())
    }
}
