//! API DTOs (Data Transfer Objects)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entity::account::Account;
use crate::domain::value_object::role::Role;

// ============================================================================
// Shared
// ============================================================================

/// Public view of an account
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub username: String,
    pub full_name: String,
    pub role: Role,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&Account> for UserResponse {
    fn from(account: &Account) -> Self {
        Self {
            id: account.account_id.to_string(),
            email: account.email.to_string(),
            username: account.user_name.to_string(),
            full_name: account.full_name.to_string(),
            role: account.role,
            is_verified: account.is_verified,
            created_at: account.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

// ============================================================================
// Sign Up
// ============================================================================

/// Missing fields deserialize as empty and are reported per field
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SignUpRequest {
    pub email: String,
    pub username: String,
    pub password: String,
    pub full_name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SignUpResponse {
    pub message: String,
    pub user: UserResponse,
}

// ============================================================================
// Login / Refresh
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub access_token: String,
    pub user: UserResponse,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessTokenResponse {
    pub access_token: String,
}

// ============================================================================
// Recovery / Verification
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EmailRequest {
    pub email: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResetPasswordRequest {
    pub new_password: String,
    pub confirm_password: String,
}

/// Body of `POST /sendVerificationEmail`; may be omitted entirely
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SendVerificationRequest {
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MeResponse {
    pub user: UserResponse,
}
