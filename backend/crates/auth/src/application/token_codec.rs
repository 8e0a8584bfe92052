//! Token Codec
//!
//! Issues and verifies the signed JWTs (HS256) the API hands out:
//!
//! - access token `{sub, role, iat, exp}`, short-lived, never stored
//! - refresh token `{sub, jti, iat, exp}`, signed with its own key and
//!   mirrored on the account
//!
//! Verification applies no leeway to `exp`.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use jsonwebtoken::errors::ErrorKind as JwtErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use kernel::id::AccountId;
use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::application::config::AuthConfig;
use crate::domain::value_object::role::Role;
use crate::error::{AuthError, AuthResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Access,
    Refresh,
}

/// Claims carried by a successfully verified token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerifiedToken {
    pub subject: AccountId,
    /// Present on access tokens only
    pub role: Option<Role>,
}

#[derive(Debug, Serialize, Deserialize)]
struct AccessClaims {
    sub: String,
    role: Role,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Serialize, Deserialize)]
struct RefreshClaims {
    sub: String,
    jti: String,
    iat: i64,
    exp: i64,
}

struct SigningKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl SigningKeys {
    fn new(secret: &[u8], ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl,
        }
    }

    fn expiry(&self, now: DateTime<Utc>) -> (i64, i64) {
        let iat = now.timestamp();
        (iat, iat.saturating_add(self.ttl.as_secs() as i64))
    }
}

pub struct TokenCodec {
    access: SigningKeys,
    refresh: SigningKeys,
    validation: Validation,
}

impl TokenCodec {
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "iat", "sub"]);

        Self {
            access: SigningKeys::new(&config.access_token_secret, config.access_token_ttl),
            refresh: SigningKeys::new(&config.refresh_token_secret, config.refresh_token_ttl),
            validation,
        }
    }

    pub fn issue_access_token(&self, subject: AccountId, role: Role) -> AuthResult<String> {
        self.issue_access_token_at(subject, role, Utc::now())
    }

    pub fn issue_access_token_at(
        &self,
        subject: AccountId,
        role: Role,
        now: DateTime<Utc>,
    ) -> AuthResult<String> {
        let (iat, exp) = self.access.expiry(now);
        let claims = AccessClaims {
            sub: subject.to_string(),
            role,
            iat,
            exp,
        };
        encode(&claims, &self.access.encoding)
    }

    pub fn issue_refresh_token(&self, subject: AccountId) -> AuthResult<String> {
        self.issue_refresh_token_at(subject, Utc::now())
    }

    pub fn issue_refresh_token_at(&self, subject: AccountId, now: DateTime<Utc>) -> AuthResult<String> {
        let (iat, exp) = self.refresh.expiry(now);
        let claims = RefreshClaims {
            sub: subject.to_string(),
            jti: Uuid::new_v4().to_string(),
            iat,
            exp,
        };
        encode(&claims, &self.refresh.encoding)
    }

    /// Check signature, expiry and kind, returning the subject (and role)
    pub fn verify(&self, token: &str, kind: TokenKind) -> AuthResult<VerifiedToken> {
        match kind {
            TokenKind::Access => {
                let claims: AccessClaims = self.decode(token, &self.access.decoding)?;
                Ok(VerifiedToken {
                    subject: parse_subject(&claims.sub)?,
                    role: Some(claims.role),
                })
            }
            TokenKind::Refresh => {
                let claims: RefreshClaims = self.decode(token, &self.refresh.decoding)?;
                Ok(VerifiedToken {
                    subject: parse_subject(&claims.sub)?,
                    role: None,
                })
            }
        }
    }

    fn decode<T: DeserializeOwned>(&self, token: &str, key: &DecodingKey) -> AuthResult<T> {
        jsonwebtoken::decode::<T>(token, key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                JwtErrorKind::ExpiredSignature => AuthError::ExpiredToken,
                _ => AuthError::InvalidToken,
            })
    }
}

impl fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCodec")
            .field("access_ttl", &self.access.ttl)
            .field("refresh_ttl", &self.refresh.ttl)
            .finish_non_exhaustive()
    }
}

fn encode<T: Serialize>(claims: &T, key: &EncodingKey) -> AuthResult<String> {
    jsonwebtoken::encode(&Header::new(Algorithm::HS256), claims, key)
        .map_err(|e| AuthError::Internal(format!("Token signing failed: {e}")))
}

fn parse_subject(sub: &str) -> AuthResult<AccountId> {
    sub.parse().map_err(|_| AuthError::InvalidToken)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;

    fn codec() -> TokenCodec {
        TokenCodec::new(&AuthConfig::with_random_secrets())
    }

    #[test]
    fn test_access_token_roundtrip_for_every_role() {
        let codec = codec();
        for role in Role::ALL {
            let subject = AccountId::new();
            let token = codec.issue_access_token(subject, role).unwrap();
            let verified = codec.verify(&token, TokenKind::Access).unwrap();
            assert_eq!(verified, VerifiedToken { subject, role: Some(role) });
        }
    }

    #[test]
    fn test_access_token_expires_after_ttl() {
        let codec = codec();
        let issued_at = Utc::now() - ChronoDuration::minutes(15) - ChronoDuration::seconds(1);
        let token = codec
            .issue_access_token_at(AccountId::new(), Role::User, issued_at)
            .unwrap();
        assert!(matches!(codec.verify(&token, TokenKind::Access), Err(AuthError::ExpiredToken)));
    }

    #[test]
    fn test_refresh_token_roundtrip_and_expiry() {
        let codec = codec();
        let subject = AccountId::new();
        let token = codec.issue_refresh_token(subject).unwrap();
        assert_eq!(codec.verify(&token, TokenKind::Refresh).unwrap().subject, subject);

        let stale = codec
            .issue_refresh_token_at(subject, Utc::now() - ChronoDuration::days(2))
            .unwrap();
        assert!(matches!(codec.verify(&stale, TokenKind::Refresh), Err(AuthError::ExpiredToken)));
    }

    #[test]
    fn test_refresh_tokens_are_distinct_within_one_second() {
        let codec = codec();
        let subject = AccountId::new();
        let now = Utc::now();
        let a = codec.issue_refresh_token_at(subject, now).unwrap();
        let b = codec.issue_refresh_token_at(subject, now).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_kinds_are_not_interchangeable() {
        let codec = codec();
        let subject = AccountId::new();
        let access = codec.issue_access_token(subject, Role::Admin).unwrap();
        let refresh = codec.issue_refresh_token(subject).unwrap();

        assert!(matches!(codec.verify(&access, TokenKind::Refresh), Err(AuthError::InvalidToken)));
        assert!(matches!(codec.verify(&refresh, TokenKind::Access), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn test_foreign_key_and_garbage_are_invalid() {
        let token = codec().issue_access_token(AccountId::new(), Role::User).unwrap();
        assert!(matches!(codec().verify(&token, TokenKind::Access), Err(AuthError::InvalidToken)));
        assert!(matches!(codec().verify("not.a.jwt", TokenKind::Access), Err(AuthError::InvalidToken)));
        assert!(matches!(codec().verify("", TokenKind::Access), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn test_tampered_role_is_rejected() {
        let codec = codec();
        let token = codec.issue_access_token(AccountId::new(), Role::User).unwrap();
        let mut parts: Vec<String> = token.split('.').map(str::to_string).collect();
        // swap in the payload of an admin token, keeping the user token's signature
        let admin = codec.issue_access_token(AccountId::new(), Role::Admin).unwrap();
        parts[1] = admin.split('.').nth(1).unwrap().to_string();
        assert!(matches!(codec.verify(&parts.join("."), TokenKind::Access), Err(AuthError::InvalidToken)));
    }
}
