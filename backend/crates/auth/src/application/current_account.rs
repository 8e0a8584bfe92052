//! Current Account Use Case

use std::sync::Arc;

use crate::application::identity_store::IdentityStore;
use crate::domain::entity::account::Account;
use crate::domain::repository::AccountRepository;
use crate::domain::value_object::identity::Identity;
use crate::error::{AuthError, AuthResult};

pub struct CurrentAccountUseCase<R>
where
    R: AccountRepository,
{
    store: Arc<IdentityStore<R>>,
}

impl<R> CurrentAccountUseCase<R>
where
    R: AccountRepository,
{
    pub fn new(store: Arc<IdentityStore<R>>) -> Self {
        Self { store }
    }

    pub async fn execute(&self, identity: &Identity) -> AuthResult<Account> {
        self.store
            .find_by_id(&identity.account_id)
            .await?
            .ok_or(AuthError::NotFound("Account"))
    }
}
