//! Outbound Email Templates

use crate::domain::mailer::{EmailDispatcher, OutboundEmail};
use crate::domain::value_object::{email::Email, user_name::UserName};
use crate::error::{AuthError, AuthResult};

pub fn password_reset(to: Email, base_url: &str, token: &str) -> OutboundEmail {
    let link = format!("{base_url}/reset-password/{token}");
    OutboundEmail {
        to,
        subject: "Reset your password".to_string(),
        html_body: format!(
            "<p>We received a request to reset your password.</p>\
             <p><a href=\"{link}\">Reset password</a></p>\
             <p>This link expires in 15 minutes. If you did not ask for it, you can ignore this email.</p>"
        ),
    }
}

pub fn email_verification(to: Email, base_url: &str, token: &str) -> OutboundEmail {
    let link = format!("{base_url}/verify-email/{token}");
    OutboundEmail {
        to,
        subject: "Verify your email address".to_string(),
        html_body: format!(
            "<p>Please confirm this email address for your account.</p>\
             <p><a href=\"{link}\">Verify email</a></p>"
        ),
    }
}

pub fn username_reminder(to: Email, user_name: &UserName) -> OutboundEmail {
    OutboundEmail {
        to,
        subject: "Your username".to_string(),
        html_body: format!("<p>The username for this email address is <strong>{user_name}</strong>.</p>"),
    }
}

/// Hand `email` to the dispatcher
pub async fn deliver<M: EmailDispatcher>(mailer: &M, email: OutboundEmail) -> AuthResult<()> {
    let subject = email.subject.clone();
    mailer.send(email).await.map_err(|e| {
        tracing::error!(error = %e, subject = %subject, "Email dispatch failed");
        AuthError::EmailDelivery(e.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_links_carry_plaintext_token() {
        let to = Email::new("a@x.com").unwrap();
        let email = password_reset(to.clone(), "https://cms.example.com", "abc123");
        assert!(email.html_body.contains("https://cms.example.com/reset-password/abc123"));

        let email = email_verification(to, "https://cms.example.com", "def456");
        assert!(email.html_body.contains("https://cms.example.com/verify-email/def456"));
    }
}
