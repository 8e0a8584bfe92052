//! In-Memory Repository Implementation
//!
//! Same uniqueness rules as the Postgres schema. Used by tests and for
//! running the API without a database.

use std::collections::HashMap;
use std::sync::Arc;

use kernel::id::AccountId;
use tokio::sync::RwLock;

use crate::domain::entity::account::Account;
use crate::domain::repository::AccountRepository;
use crate::domain::value_object::{
    email::Email,
    security_token::{SecurityTokenHash, TokenPurpose},
    user_name::UserName,
};
use crate::error::{AuthError, AuthResult};

#[derive(Clone, Default)]
pub struct InMemoryAccountRepository {
    accounts: Arc<RwLock<HashMap<AccountId, Account>>>,
}

impl InMemoryAccountRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.accounts.read().await.len()
    }

    async fn find_first(&self, predicate: impl Fn(&Account) -> bool) -> Option<Account> {
        self.accounts
            .read()
            .await
            .values()
            .find(|account| predicate(account))
            .cloned()
    }
}

fn check_unique(accounts: &HashMap<AccountId, Account>, candidate: &Account) -> AuthResult<()> {
    for other in accounts.values() {
        if other.account_id == candidate.account_id {
            continue;
        }
        if other.user_name == candidate.user_name {
            return Err(AuthError::UserNameTaken);
        }
        if other.email == candidate.email {
            return Err(AuthError::EmailTaken);
        }
    }
    Ok(())
}

impl AccountRepository for InMemoryAccountRepository {
    async fn create(&self, account: &Account) -> AuthResult<()> {
        let mut accounts = self.accounts.write().await;
        check_unique(&accounts, account)?;
        if accounts.contains_key(&account.account_id) {
            return Err(AuthError::Internal("Duplicate account id".into()));
        }
        accounts.insert(account.account_id, account.clone());
        Ok(())
    }

    async fn find_by_id(&self, account_id: &AccountId) -> AuthResult<Option<Account>> {
        Ok(self.accounts.read().await.get(account_id).cloned())
    }

    async fn find_by_user_name(&self, user_name: &UserName) -> AuthResult<Option<Account>> {
        Ok(self.find_first(|a| &a.user_name == user_name).await)
    }

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<Account>> {
        Ok(self.find_first(|a| &a.email == email).await)
    }

    async fn find_by_refresh_token(&self, token: &str) -> AuthResult<Option<Account>> {
        Ok(self
            .find_first(|a| a.refresh_token.as_deref() == Some(token))
            .await)
    }

    async fn find_by_security_token(
        &self,
        purpose: TokenPurpose,
        hash: &SecurityTokenHash,
    ) -> AuthResult<Option<Account>> {
        Ok(self
            .find_first(|a| a.outstanding(purpose).is_some_and(|t| &t.hash == hash))
            .await)
    }

    async fn update(&self, account: &Account) -> AuthResult<()> {
        let mut accounts = self.accounts.write().await;
        check_unique(&accounts, account)?;
        match accounts.get_mut(&account.account_id) {
            Some(stored) => {
                *stored = account.clone();
                Ok(())
            }
            None => Err(AuthError::NotFound("Account")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_object::{
        full_name::FullName,
        user_password::{RawPassword, UserPassword},
    };

    fn account(email: &str, user_name: &str) -> Account {
        let raw = RawPassword::for_login("irrelevant".to_string());
        Account::new(
            Email::new(email).unwrap(),
            UserName::new(user_name).unwrap(),
            FullName::new("A B").unwrap(),
            UserPassword::from_raw(&raw, None).unwrap(),
        )
    }

    #[tokio::test]
    async fn test_create_enforces_uniqueness() {
        let repo = InMemoryAccountRepository::new();
        repo.create(&account("a@x.com", "user1")).await.unwrap();

        assert!(matches!(
            repo.create(&account("b@x.com", "USER1")).await,
            Err(AuthError::UserNameTaken)
        ));
        assert!(matches!(
            repo.create(&account("A@x.com", "user2")).await,
            Err(AuthError::EmailTaken)
        ));
        assert_eq!(repo.len().await, 1);
    }

    #[tokio::test]
    async fn test_update_rejects_taken_email() {
        let repo = InMemoryAccountRepository::new();
        repo.create(&account("a@x.com", "user1")).await.unwrap();
        let mut second = account("b@x.com", "user2");
        repo.create(&second).await.unwrap();

        second.email = Email::new("a@x.com").unwrap();
        assert!(matches!(repo.update(&second).await, Err(AuthError::EmailTaken)));
    }

    #[tokio::test]
    async fn test_update_unknown_account() {
        let repo = InMemoryAccountRepository::new();
        assert!(matches!(
            repo.update(&account("a@x.com", "user1")).await,
            Err(AuthError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_lookup_by_refresh_token() {
        let repo = InMemoryAccountRepository::new();
        let mut stored = account("a@x.com", "user1");
        stored.set_refresh_token("rt-1".into());
        repo.create(&stored).await.unwrap();

        let found = repo.find_by_refresh_token("rt-1").await.unwrap().unwrap();
        assert_eq!(found.account_id, stored.account_id);
        assert!(repo.find_by_refresh_token("rt-2").await.unwrap().is_none());
    }
}
