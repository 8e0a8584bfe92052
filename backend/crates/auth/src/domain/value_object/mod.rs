//! Value Object Module

pub mod email;
pub mod full_name;
pub mod identity;
pub mod role;
pub mod security_token;
pub mod user_name;
pub mod user_password;

use std::borrow::Cow;

/// Rejected input for a value object; the message is shown to the client
/// under the offending field.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct InvalidValue(pub Cow<'static, str>);

impl InvalidValue {
    pub fn new(message: impl Into<Cow<'static, str>>) -> Self {
        Self(message.into())
    }
}
