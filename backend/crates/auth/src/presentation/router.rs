//! Auth Router

use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post},
};

use crate::application::config::AuthConfig;
use crate::domain::mailer::EmailDispatcher;
use crate::domain::repository::AccountRepository;
use crate::infra::{mailer::LogEmailDispatcher, postgres::PgAccountRepository};
use crate::presentation::handlers::{self, AuthAppState};
use crate::presentation::middleware::require_auth;

/// Create the Auth router with PostgreSQL repository
pub fn auth_router(repo: PgAccountRepository, config: AuthConfig) -> Router {
    auth_router_generic(repo, LogEmailDispatcher, config)
}

/// Create a generic Auth router for any repository and dispatcher
pub fn auth_router_generic<R, M>(repo: R, mailer: M, config: AuthConfig) -> Router
where
    R: AccountRepository + Send + Sync + 'static,
    M: EmailDispatcher + Send + Sync + 'static,
{
    auth_routes(AuthAppState::new(repo, mailer, config))
}

/// Routes over an existing state, for callers that keep a handle on it
pub fn auth_routes<R, M>(state: AuthAppState<R, M>) -> Router
where
    R: AccountRepository + Send + Sync + 'static,
    M: EmailDispatcher + Send + Sync + 'static,
{
    let protected = Router::new()
        .route(
            "/sendVerificationEmail",
            post(handlers::send_verification_email::<R, M>),
        )
        .route("/me", get(handlers::me::<R, M>))
        .route_layer(from_fn_with_state(state.codec.clone(), require_auth));

    Router::new()
        .route("/signup", post(handlers::sign_up::<R, M>))
        .route("/login", post(handlers::login::<R, M>))
        .route("/logout", get(handlers::logout::<R, M>))
        .route("/refresh", get(handlers::refresh::<R, M>))
        .route("/forgotPassword", post(handlers::forgot_password::<R, M>))
        .route("/forgotUsername", post(handlers::forgot_username::<R, M>))
        .route("/resetPassword/{token}", post(handlers::reset_password::<R, M>))
        .route("/verifyEmail/{token}", post(handlers::verify_email::<R, M>))
        .merge(protected)
        .with_state(state)
}
