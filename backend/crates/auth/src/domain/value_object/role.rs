//! Role Value Object
//!
//! The three capability tiers of the CMS. Persisted as a `smallint`; every
//! comparison goes through [`Role::rank`], never through the stored number.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(i16)]
pub enum Role {
    Admin = 1,
    Editor = 2,
    #[default]
    User = 3,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Admin, Role::Editor, Role::User];

    /// Storage id
    #[inline]
    pub const fn id(&self) -> i16 {
        *self as i16
    }

    #[inline]
    pub fn from_id(id: i16) -> Option<Self> {
        Self::ALL.into_iter().find(|role| role.id() == id)
    }

    #[inline]
    pub const fn code(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Editor => "editor",
            Role::User => "user",
        }
    }

    #[inline]
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|role| role.code() == code)
    }

    /// Capability rank: higher means more privileges
    #[inline]
    pub const fn rank(&self) -> u8 {
        match self {
            Role::Admin => 3,
            Role::Editor => 2,
            Role::User => 1,
        }
    }

    /// Whether this role carries at least the capabilities of `minimum`
    #[inline]
    pub const fn at_least(&self, minimum: Role) -> bool {
        self.rank() >= minimum.rank()
    }
}

impl Ord for Role {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank().cmp(&other.rank())
    }
}

impl PartialOrd for Role {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_ids_roundtrip() {
        for role in Role::ALL {
            assert_eq!(Role::from_id(role.id()), Some(role));
        }
        assert_eq!(Role::from_id(0), None);
        assert_eq!(Role::from_id(4), None);
    }

    #[test]
    fn test_codes() {
        assert_eq!(Role::from_code("editor"), Some(Role::Editor));
        assert_eq!(Role::from_code("Editor"), None);
        assert_eq!(Role::Admin.to_string(), "admin");
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), "\"user\"");
    }

    #[test]
    fn test_capability_ordering() {
        assert!(Role::Admin > Role::Editor);
        assert!(Role::Editor > Role::User);
        assert!(Role::Admin.at_least(Role::Editor));
        assert!(Role::Editor.at_least(Role::Editor));
        assert!(!Role::User.at_least(Role::Editor));
        assert_eq!(Role::default(), Role::User);
    }
}
