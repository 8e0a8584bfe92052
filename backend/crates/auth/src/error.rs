//! Auth Error Types
//!
//! This module provides auth-specific error variants that integrate
//! with the unified `kernel::error::AppError` system.

use std::time::Duration;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, details::FieldErrors, kind::ErrorKind};
use thiserror::Error;

/// Auth-specific result type alias
pub type AuthResult<T> = Result<T, AuthError>;

/// Auth-specific error variants
#[derive(Debug, Error)]
pub enum AuthError {
    /// One or more request fields failed validation
    #[error("Validation failed")]
    Validation(FieldErrors),

    /// Unknown user name or wrong password; the two are indistinguishable
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// No usable identity on the request, or the role is not admitted
    #[error("Unauthorized")]
    Unauthorized,

    /// Access or refresh token is malformed, mis-signed or of the wrong kind
    #[error("Unauthorized")]
    InvalidToken,

    #[error("Unauthorized")]
    ExpiredToken,

    /// Refresh token rejected or replayed
    #[error("Forbidden")]
    Forbidden,

    /// Security token unknown, mismatched, consumed or expired
    #[error("Token is invalid or has expired")]
    TokenInvalidOrExpired,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Username is already taken")]
    UserNameTaken,

    #[error("Email is already registered")]
    EmailTaken,

    #[error("Too many requests, please try again later")]
    RateLimited { retry_after: Duration },

    /// Outbound email could not be handed to the dispatcher
    #[error("Email delivery failed: {0}")]
    EmailDelivery(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::Validation(_)
            | AuthError::InvalidCredentials
            | AuthError::TokenInvalidOrExpired => StatusCode::BAD_REQUEST,
            AuthError::Unauthorized | AuthError::InvalidToken | AuthError::ExpiredToken => {
                StatusCode::UNAUTHORIZED
            }
            AuthError::Forbidden => StatusCode::FORBIDDEN,
            AuthError::NotFound(_) => StatusCode::NOT_FOUND,
            AuthError::UserNameTaken | AuthError::EmailTaken => StatusCode::CONFLICT,
            AuthError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            AuthError::EmailDelivery(_) | AuthError::Database(_) | AuthError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::Validation(_)
            | AuthError::InvalidCredentials
            | AuthError::TokenInvalidOrExpired => ErrorKind::BadRequest,
            AuthError::Unauthorized | AuthError::InvalidToken | AuthError::ExpiredToken => {
                ErrorKind::Unauthorized
            }
            AuthError::Forbidden => ErrorKind::Forbidden,
            AuthError::NotFound(_) => ErrorKind::NotFound,
            AuthError::UserNameTaken | AuthError::EmailTaken => ErrorKind::Conflict,
            AuthError::RateLimited { .. } => ErrorKind::TooManyRequests,
            AuthError::EmailDelivery(_) | AuthError::Database(_) | AuthError::Internal(_) => {
                ErrorKind::InternalServerError
            }
        }
    }

    /// Shorthand for a single-field validation failure
    pub fn invalid_field(field: &str, message: impl Into<String>) -> Self {
        AuthError::Validation(FieldErrors::single(field, message))
    }

    /// Convert to AppError
    pub fn to_app_error(&self) -> AppError {
        match self {
            AuthError::Validation(details) => AppError::validation(details.clone()),
            _ => AppError::new(self.kind(), self.to_string()),
        }
    }

    /// Log the error with appropriate level
    ///
    /// Server errors are logged by `AppError` when rendered.
    fn log(&self) {
        match self {
            AuthError::InvalidCredentials => {
                tracing::warn!("Invalid login attempt");
            }
            AuthError::Forbidden => {
                tracing::warn!("Refresh token rejected");
            }
            AuthError::RateLimited { retry_after } => {
                tracing::warn!(retry_after_secs = retry_after.as_secs(), "Rate limit exceeded");
            }
            _ => {
                tracing::debug!(error = %self, "Auth error");
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        self.log();
        let retry_after = match &self {
            AuthError::RateLimited { retry_after } => Some(retry_after.as_secs().max(1)),
            _ => None,
        };

        let mut response = self.to_app_error().into_response();
        if let Some(secs) = retry_after {
            response
                .headers_mut()
                .insert(axum::http::header::RETRY_AFTER, secs.into());
        }
        response
    }
}

impl From<AppError> for AuthError {
    fn from(err: AppError) -> Self {
        AuthError::Internal(err.to_string())
    }
}

impl From<platform::rate_limit::RateLimitError> for AuthError {
    fn from(err: platform::rate_limit::RateLimitError) -> Self {
        AuthError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_table() {
        assert_eq!(AuthError::InvalidCredentials.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AuthError::TokenInvalidOrExpired.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AuthError::ExpiredToken.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AuthError::Forbidden.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(AuthError::EmailTaken.status_code(), StatusCode::CONFLICT);
        assert_eq!(
            AuthError::RateLimited { retry_after: Duration::from_secs(5) }.status_code(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            AuthError::EmailDelivery("smtp down".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_status_code_and_kind_agree() {
        let all = [
            AuthError::invalid_field("email", "Email is required"),
            AuthError::InvalidCredentials,
            AuthError::Unauthorized,
            AuthError::InvalidToken,
            AuthError::ExpiredToken,
            AuthError::Forbidden,
            AuthError::TokenInvalidOrExpired,
            AuthError::NotFound("Account"),
            AuthError::UserNameTaken,
            AuthError::EmailTaken,
            AuthError::RateLimited { retry_after: Duration::ZERO },
            AuthError::EmailDelivery(String::new()),
            AuthError::Internal(String::new()),
        ];
        for err in all {
            assert_eq!(err.status_code().as_u16(), err.kind().status_code(), "{err:?}");
        }
    }

    #[test]
    fn test_token_failures_share_public_message() {
        assert_eq!(AuthError::InvalidToken.to_string(), AuthError::ExpiredToken.to_string());
        assert_eq!(AuthError::InvalidToken.to_string(), AuthError::Unauthorized.to_string());
    }

    #[test]
    fn test_server_errors_are_sanitized() {
        let app = AuthError::EmailDelivery("relay refused: 550".into()).to_app_error();
        assert_eq!(app.public_message(), "Internal server error");
        assert_eq!(app.to_body()["statusCode"], 500);
    }

    #[test]
    fn test_validation_keeps_details() {
        let body = AuthError::invalid_field("email", "Invalid email format")
            .to_app_error()
            .to_body();
        assert_eq!(body["statusCode"], 400);
        assert_eq!(body["details"]["email"][0], "Invalid email format");
    }

    #[test]
    fn test_rate_limited_response_sets_retry_after() {
        let response = AuthError::RateLimited { retry_after: Duration::from_secs(42) }.into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()[axum::http::header::RETRY_AFTER], "42");
    }
}
