//! Outbound Email Port
//!
//! Transport is an external collaborator. The core only needs to know
//! whether the message was accepted.

use crate::domain::value_object::email::Email;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundEmail {
    pub to: Email,
    pub subject: String,
    pub html_body: String,
}

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("Email transport unavailable: {0}")]
    Transport(String),

    #[error("Recipient rejected: {0}")]
    Rejected(String),
}

/// Email dispatcher trait
#[trait_variant::make(EmailDispatcher: Send)]
pub trait LocalEmailDispatcher {
    async fn send(&self, email: OutboundEmail) -> Result<(), DispatchError>;
}
