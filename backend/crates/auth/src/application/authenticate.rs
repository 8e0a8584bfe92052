//! Request Authentication
//!
//! Turns an `Authorization: Bearer <access token>` header into a verified
//! [`Identity`]. No storage is consulted.

use axum::http::HeaderMap;
use platform::client::extract_bearer_token;

use crate::application::token_codec::{TokenCodec, TokenKind};
use crate::domain::value_object::identity::Identity;
use crate::error::{AuthError, AuthResult};

pub fn authenticate(headers: &HeaderMap, codec: &TokenCodec) -> AuthResult<Identity> {
    let token = extract_bearer_token(headers).map_err(|_| AuthError::Unauthorized)?;
    let verified = codec.verify(token, TokenKind::Access)?;
    let role = verified.role.ok_or(AuthError::InvalidToken)?;
    Ok(Identity::new(verified.subject, role))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::config::AuthConfig;
    use crate::domain::value_object::role::Role;
    use axum::http::{HeaderValue, header};
    use kernel::id::AccountId;

    fn bearer(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
        );
        headers
    }

    #[test]
    fn test_valid_access_token() {
        let codec = TokenCodec::new(&AuthConfig::with_random_secrets());
        let subject = AccountId::new();
        let token = codec.issue_access_token(subject, Role::Editor).unwrap();

        let identity = authenticate(&bearer(&token), &codec).unwrap();
        assert_eq!(identity, Identity::new(subject, Role::Editor));
    }

    #[test]
    fn test_missing_header() {
        let codec = TokenCodec::new(&AuthConfig::with_random_secrets());
        assert!(matches!(authenticate(&HeaderMap::new(), &codec), Err(AuthError::Unauthorized)));
    }

    #[test]
    fn test_refresh_token_is_not_a_bearer_credential() {
        let codec = TokenCodec::new(&AuthConfig::with_random_secrets());
        let refresh = codec.issue_refresh_token(AccountId::new()).unwrap();
        assert!(matches!(authenticate(&bearer(&refresh), &codec), Err(AuthError::InvalidToken)));
    }
}
