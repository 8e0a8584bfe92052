//! Auth Middleware
//!
//! Bearer-token authentication and role gates for protected routes. Both
//! leave the verified [`Identity`] in the request extensions, where the
//! `Identity` extractor picks it up.

use axum::body::Body;
use axum::extract::{FromRequestParts, State};
use axum::http::Request;
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use std::sync::Arc;

use crate::application::authenticate::authenticate;
use crate::application::token_codec::TokenCodec;
use crate::domain::services::role_guard::RoleGuard;
use crate::domain::value_object::{identity::Identity, role::Role};
use crate::error::AuthError;

/// Middleware that requires a valid access token
///
/// Use with `axum::middleware::from_fn_with_state(codec, require_auth)`.
pub async fn require_auth(
    State(codec): State<Arc<TokenCodec>>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    match authenticate(req.headers(), &codec) {
        Ok(identity) => {
            req.extensions_mut().insert(identity);
            next.run(req).await
        }
        Err(e) => e.into_response(),
    }
}

/// Middleware state for [`require_roles`]
#[derive(Clone)]
pub struct RoleRequirement {
    pub codec: Arc<TokenCodec>,
    pub allowed: Arc<[Role]>,
}

impl RoleRequirement {
    pub fn new(codec: Arc<TokenCodec>, allowed: &[Role]) -> Self {
        Self {
            codec,
            allowed: allowed.into(),
        }
    }
}

/// Middleware that admits only the listed roles
///
/// Reuses an identity established by an outer `require_auth`, otherwise
/// authenticates the request itself.
pub async fn require_roles(
    State(requirement): State<RoleRequirement>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let identity = match req.extensions().get::<Identity>() {
        Some(identity) => Some(*identity),
        None => authenticate(req.headers(), &requirement.codec).ok(),
    };

    if let Err(e) = RoleGuard::authorize(identity.as_ref(), &requirement.allowed) {
        return e.into_response();
    }

    if let Some(identity) = identity {
        req.extensions_mut().insert(identity);
    }
    next.run(req).await
}

impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Identity>()
            .copied()
            .ok_or(AuthError::Unauthorized)
    }
}
