//! Request Extractors

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};

use crate::error::AuthError;

/// `Json<T>` whose rejections render as the usual validation envelope
///
/// The parser's own message is logged, never returned.
pub struct AppJson<T>(pub T);

impl<S, T> FromRequest<S> for AppJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(AppJson(value)),
            Err(rejection) => {
                tracing::debug!(reason = %rejection.body_text(), "Request body rejected");
                Err(AuthError::invalid_field("body", rejection_message(&rejection)))
            }
        }
    }
}

fn rejection_message(rejection: &JsonRejection) -> &'static str {
    match rejection {
        JsonRejection::MissingJsonContentType(_) => "Expected Content-Type: application/json",
        JsonRejection::JsonDataError(_) => "Request body has missing or mistyped fields",
        _ => "Request body must be a JSON object",
    }
}
