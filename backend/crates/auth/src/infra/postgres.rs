//! PostgreSQL Repository Implementation

use chrono::{DateTime, Utc};
use kernel::id::AccountId;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entity::account::Account;
use crate::domain::repository::AccountRepository;
use crate::domain::value_object::{
    email::Email,
    full_name::FullName,
    role::Role,
    security_token::{OutstandingToken, SecurityTokenHash, TokenPurpose},
    user_name::UserName,
    user_password::UserPassword,
};
use crate::error::{AuthError, AuthResult};

const USER_NAME_CONSTRAINT: &str = "accounts_user_name_key";
const EMAIL_CONSTRAINT: &str = "accounts_email_key";

const ACCOUNT_COLUMNS: &str = r#"
    account_id,
    email,
    user_name,
    full_name,
    password_hash,
    role,
    refresh_token,
    is_verified,
    email_pending_verification,
    email_verification_token_hash,
    email_verification_expires_at,
    password_reset_token_hash,
    password_reset_expires_at,
    created_at,
    updated_at
"#;

/// PostgreSQL-backed account repository
#[derive(Clone)]
pub struct PgAccountRepository {
    pool: PgPool,
}

impl PgAccountRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_where(&self, condition: &str, value: &str) -> AuthResult<Option<Account>> {
        let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE {condition}");
        let row = sqlx::query_as::<_, AccountRow>(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await?;

        row.map(AccountRow::into_account).transpose()
    }
}

impl AccountRepository for PgAccountRepository {
    async fn create(&self, account: &Account) -> AuthResult<()> {
        let (verification_hash, verification_expires) = split(account.email_verification.as_ref());
        let (reset_hash, reset_expires) = split(account.password_reset.as_ref());

        sqlx::query(
            r#"
            INSERT INTO accounts (
                account_id,
                email,
                user_name,
                full_name,
                password_hash,
                role,
                refresh_token,
                is_verified,
                email_pending_verification,
                email_verification_token_hash,
                email_verification_expires_at,
                password_reset_token_hash,
                password_reset_expires_at,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            "#,
        )
        .bind(account.account_id.as_uuid())
        .bind(account.email.as_str())
        .bind(account.user_name.as_str())
        .bind(account.full_name.as_str())
        .bind(account.password_hash.as_phc_string())
        .bind(account.role.id())
        .bind(account.refresh_token.as_deref())
        .bind(account.is_verified)
        .bind(account.email_pending_verification.as_ref().map(Email::as_str))
        .bind(verification_hash)
        .bind(verification_expires)
        .bind(reset_hash)
        .bind(reset_expires)
        .bind(account.created_at)
        .bind(account.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_unique_violation)?;

        Ok(())
    }

    async fn find_by_id(&self, account_id: &AccountId) -> AuthResult<Option<Account>> {
        let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE account_id = $1");
        let row = sqlx::query_as::<_, AccountRow>(&sql)
            .bind(account_id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        row.map(AccountRow::into_account).transpose()
    }

    async fn find_by_user_name(&self, user_name: &UserName) -> AuthResult<Option<Account>> {
        self.find_where("user_name = $1", user_name.as_str()).await
    }

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<Account>> {
        self.find_where("email = $1", email.as_str()).await
    }

    async fn find_by_refresh_token(&self, token: &str) -> AuthResult<Option<Account>> {
        self.find_where("refresh_token = $1", token).await
    }

    async fn find_by_security_token(
        &self,
        purpose: TokenPurpose,
        hash: &SecurityTokenHash,
    ) -> AuthResult<Option<Account>> {
        let condition = match purpose {
            TokenPurpose::PasswordReset => "password_reset_token_hash = $1",
            TokenPurpose::EmailVerification => "email_verification_token_hash = $1",
        };
        self.find_where(condition, hash.as_str()).await
    }

    async fn update(&self, account: &Account) -> AuthResult<()> {
        let (verification_hash, verification_expires) = split(account.email_verification.as_ref());
        let (reset_hash, reset_expires) = split(account.password_reset.as_ref());

        let result = sqlx::query(
            r#"
            UPDATE accounts SET
                email = $2,
                user_name = $3,
                full_name = $4,
                password_hash = $5,
                role = $6,
                refresh_token = $7,
                is_verified = $8,
                email_pending_verification = $9,
                email_verification_token_hash = $10,
                email_verification_expires_at = $11,
                password_reset_token_hash = $12,
                password_reset_expires_at = $13,
                updated_at = $14
            WHERE account_id = $1
            "#,
        )
        .bind(account.account_id.as_uuid())
        .bind(account.email.as_str())
        .bind(account.user_name.as_str())
        .bind(account.full_name.as_str())
        .bind(account.password_hash.as_phc_string())
        .bind(account.role.id())
        .bind(account.refresh_token.as_deref())
        .bind(account.is_verified)
        .bind(account.email_pending_verification.as_ref().map(Email::as_str))
        .bind(verification_hash)
        .bind(verification_expires)
        .bind(reset_hash)
        .bind(reset_expires)
        .bind(account.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_unique_violation)?;

        if result.rows_affected() == 0 {
            return Err(AuthError::NotFound("Account"));
        }
        Ok(())
    }
}

fn split(token: Option<&OutstandingToken>) -> (Option<&str>, Option<DateTime<Utc>>) {
    match token {
        Some(token) => (Some(token.hash.as_str()), Some(token.expires_at)),
        None => (None, None),
    }
}

fn map_unique_violation(err: sqlx::Error) -> AuthError {
    if let sqlx::Error::Database(db) = &err {
        if db.is_unique_violation() {
            match db.constraint() {
                Some(USER_NAME_CONSTRAINT) => return AuthError::UserNameTaken,
                Some(EMAIL_CONSTRAINT) => return AuthError::EmailTaken,
                _ => {}
            }
        }
    }
    AuthError::Database(err)
}

// ============================================================================
// Row Types
// ============================================================================

#[derive(sqlx::FromRow)]
struct AccountRow {
    account_id: Uuid,
    email: String,
    user_name: String,
    full_name: String,
    password_hash: String,
    role: i16,
    refresh_token: Option<String>,
    is_verified: bool,
    email_pending_verification: Option<String>,
    email_verification_token_hash: Option<String>,
    email_verification_expires_at: Option<DateTime<Utc>>,
    password_reset_token_hash: Option<String>,
    password_reset_expires_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl AccountRow {
    fn into_account(self) -> AuthResult<Account> {
        let role = Role::from_id(self.role)
            .ok_or_else(|| AuthError::Internal(format!("Invalid role id: {}", self.role)))?;

        Ok(Account {
            account_id: AccountId::from_uuid(self.account_id),
            email: Email::from_db(self.email),
            user_name: UserName::from_db(self.user_name),
            full_name: FullName::from_db(self.full_name),
            password_hash: UserPassword::from_phc_string(self.password_hash)?,
            role,
            refresh_token: self.refresh_token,
            is_verified: self.is_verified,
            email_pending_verification: self.email_pending_verification.map(Email::from_db),
            email_verification: join(
                self.email_verification_token_hash,
                self.email_verification_expires_at,
            ),
            password_reset: join(self.password_reset_token_hash, self.password_reset_expires_at),
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

fn join(hash: Option<String>, expires_at: Option<DateTime<Utc>>) -> Option<OutstandingToken> {
    match (hash, expires_at) {
        (Some(hash), Some(expires_at)) => {
            Some(OutstandingToken::new(SecurityTokenHash::from_db(hash), expires_at))
        }
        _ => None,
    }
}
