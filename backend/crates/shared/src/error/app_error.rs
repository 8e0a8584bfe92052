//! Application Error - Unified error type for the application
//!
//! Defines [`AppError`] struct and [`AppResult<T>`] type alias.

use std::borrow::Cow;
use std::error::Error;
use std::fmt;

use super::details::FieldErrors;
use super::kind::ErrorKind;

/// Message sent to clients in place of any 5xx message
pub const SANITIZED_SERVER_MESSAGE: &str = "Internal server error";

/// Unified application error
///
/// Every recoverable failure that reaches the HTTP boundary is expressed as
/// an `AppError`. It renders as
/// `{"message": .., "statusCode": .., "details"?: {..}}`.
///
/// ## Fields
/// * `kind` - classification, decides the status code
/// * `message` - client-facing text (replaced for 5xx)
/// * `details` - per-field validation messages
/// * `source` - original error, logged but never serialized
///
/// ## Examples
/// ```rust
/// use kernel::error::{app_error::AppError, details::FieldErrors};
///
/// let err = AppError::not_found("Account not found");
/// assert_eq!(err.status_code(), 404);
///
/// let err = AppError::validation(FieldErrors::single("email", "Invalid email format"));
/// assert_eq!(err.status_code(), 400);
/// ```
pub struct AppError {
    kind: ErrorKind,
    message: Cow<'static, str>,
    details: Option<FieldErrors>,
    source: Option<Box<dyn Error + Send + Sync + 'static>>,
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    #[inline]
    pub fn new(kind: ErrorKind, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            kind,
            message: message.into(),
            details: None,
            source: None,
        }
    }

    // ========================================================================
    // Convenience constructors
    // ========================================================================

    #[inline]
    pub fn bad_request(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::BadRequest, message)
    }

    /// 400 with per-field details
    pub fn validation(details: FieldErrors) -> Self {
        Self::new(ErrorKind::BadRequest, "Validation failed").with_details(details)
    }

    #[inline]
    pub fn unauthorized(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::Unauthorized, message)
    }

    #[inline]
    pub fn forbidden(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::Forbidden, message)
    }

    #[inline]
    pub fn not_found(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    #[inline]
    pub fn conflict(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::Conflict, message)
    }

    #[inline]
    pub fn too_many_requests(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::TooManyRequests, message)
    }

    #[inline]
    pub fn internal(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::InternalServerError, message)
    }

    #[inline]
    pub fn service_unavailable(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::ServiceUnavailable, message)
    }

    // ========================================================================
    // Builder methods
    // ========================================================================

    #[inline]
    pub fn with_details(mut self, details: FieldErrors) -> Self {
        self.details = Some(details);
        self
    }

    /// Attach the original error (debugging only)
    ///
    /// ```rust
    /// use kernel::error::app_error::{AppError, AppResult};
    ///
    /// fn read_config() -> AppResult<String> {
    ///     std::fs::read_to_string("config.json")
    ///         .map_err(|e| AppError::internal("Failed to read config").with_source(e))
    /// }
    /// ```
    #[inline]
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    #[inline]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    #[inline]
    pub fn status_code(&self) -> u16 {
        self.kind.status_code()
    }

    /// Internal message, may contain diagnostic text for 5xx errors
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Message safe to send to the client
    pub fn public_message(&self) -> &str {
        if self.kind.is_server_error() {
            SANITIZED_SERVER_MESSAGE
        } else {
            &self.message
        }
    }

    #[inline]
    pub fn details(&self) -> Option<&FieldErrors> {
        self.details.as_ref()
    }

    #[inline]
    pub fn is_server_error(&self) -> bool {
        self.kind.is_server_error()
    }

    /// JSON envelope sent to the client
    pub fn to_body(&self) -> serde_json::Value {
        let mut body = serde_json::json!({
            "message": self.public_message(),
            "statusCode": self.status_code(),
        });
        if let Some(details) = self.details.as_ref().filter(|d| !d.is_empty()) {
            body["details"] = serde_json::to_value(details).unwrap_or_default();
        }
        body
    }
}

impl fmt::Debug for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut builder = f.debug_struct("AppError");
        builder.field("kind", &self.kind);
        builder.field("message", &self.message);
        if let Some(details) = &self.details {
            builder.field("details", details);
        }
        if let Some(source) = &self.source {
            builder.field("source", source);
        }
        builder.finish()
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)
    }
}

impl Error for AppError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn Error + 'static))
    }
}
