//! Identity Value Object
//!
//! The verified principal behind a request, as established from an access
//! token. This is all downstream collaborators get to see.

use kernel::id::AccountId;
use serde::Serialize;

use super::role::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    #[serde(serialize_with = "serialize_id")]
    pub account_id: AccountId,
    pub role: Role,
}

impl Identity {
    pub fn new(account_id: AccountId, role: Role) -> Self {
        Self { account_id, role }
    }
}

fn serialize_id<S: serde::Serializer>(id: &AccountId, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(id)
}
