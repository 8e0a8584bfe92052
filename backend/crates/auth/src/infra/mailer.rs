//! Email Dispatchers
//!
//! Real transport lives outside this crate. `LogEmailDispatcher` records
//! that a message would have been sent.

use crate::domain::mailer::{DispatchError, EmailDispatcher, OutboundEmail};

/// Logs recipient and subject; the body carries tokens and is never logged
#[derive(Debug, Clone, Copy, Default)]
pub struct LogEmailDispatcher;

impl EmailDispatcher for LogEmailDispatcher {
    async fn send(&self, email: OutboundEmail) -> Result<(), DispatchError> {
        tracing::info!(
            to = %email.to,
            subject = %email.subject,
            body_len = email.html_body.len(),
            "Outbound email accepted"
        );
        Ok(())
    }
}
