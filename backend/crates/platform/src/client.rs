//! Client request utilities
//!
//! Credential extraction from HTTP headers.

use axum::http::{HeaderMap, header};

/// Error when reading the `Authorization` header
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BearerError {
    #[error("Missing Authorization header")]
    Missing,
    #[error("Authorization header is not a bearer credential")]
    Malformed,
}

/// Extract the token from `Authorization: Bearer <token>`
///
/// The scheme is matched case-insensitively (RFC 6750 §2.1).
pub fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, BearerError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(BearerError::Missing)?
        .to_str()
        .map_err(|_| BearerError::Malformed)?;

    let (scheme, token) = value.trim().split_once(' ').ok_or(BearerError::Malformed)?;
    let token = token.trim();

    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return Err(BearerError::Malformed);
    }

    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn with_auth(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(extract_bearer_token(&with_auth("Bearer abc.def")), Ok("abc.def"));
        assert_eq!(extract_bearer_token(&with_auth("bearer  abc")), Ok("abc"));
    }

    #[test]
    fn test_extract_bearer_token_rejects_other_forms() {
        assert_eq!(extract_bearer_token(&HeaderMap::new()), Err(BearerError::Missing));
        assert_eq!(
            extract_bearer_token(&with_auth("Basic dXNlcjpwYXNz")),
            Err(BearerError::Malformed)
        );
        assert_eq!(extract_bearer_token(&with_auth("Bearer")), Err(BearerError::Malformed));
        assert_eq!(extract_bearer_token(&with_auth("Bearer  ")), Err(BearerError::Malformed));
    }
}
