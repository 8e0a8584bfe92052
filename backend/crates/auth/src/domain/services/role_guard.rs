//! Role Guard
//!
//! Admission check for role-restricted operations. An empty allow-list
//! admits nobody.

use crate::domain::value_object::{identity::Identity, role::Role};
use crate::error::{AuthError, AuthResult};

pub struct RoleGuard;

impl RoleGuard {
    /// Admit `identity` if its role is one of `allowed`
    pub fn authorize(identity: Option<&Identity>, allowed: &[Role]) -> AuthResult<()> {
        match identity {
            Some(identity) if allowed.contains(&identity.role) => Ok(()),
            Some(identity) => {
                tracing::debug!(
                    account_id = %identity.account_id,
                    role = %identity.role,
                    "Role not admitted"
                );
                Err(AuthError::Unauthorized)
            }
            None => Err(AuthError::Unauthorized),
        }
    }

    /// Admit `identity` if its role ranks at or above `minimum`
    pub fn authorize_at_least(identity: Option<&Identity>, minimum: Role) -> AuthResult<()> {
        match identity {
            Some(identity) if identity.role.at_least(minimum) => Ok(()),
            _ => Err(AuthError::Unauthorized),
        }
    }
}
