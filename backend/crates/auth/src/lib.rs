//! Auth (Authentication) Backend Module
//!
//! Credential core of the CMS: who is calling, with which role, and the
//! tokens that prove it.
//!
//! Clean Architecture structure:
//! - `domain/` - Account aggregate, value objects, repository and mailer
//!   ports, `SecureTokenFactory`, `RoleGuard`
//! - `application/` - `TokenCodec`, `IdentityStore`, use cases
//! - `infra/` - Postgres and in-memory repositories, logging dispatcher
//! - `presentation/` - HTTP handlers, DTOs, router, middleware
//!
//! ## Security Model
//! - Stateless access tokens (HS256, 15 minutes) carrying subject and role
//! - Refresh tokens signed with a separate key, honored only while equal to
//!   the copy stored on the account; logout and password reset clear it
//! - Password reset and email verification tokens are random, stored as
//!   SHA-256, single use, and one per purpose per account
//! - Passwords hashed with Argon2id (NIST SP 800-63B compliant)
//!
//! ## Collaborator API
//! Other route groups protect themselves with [`presentation::require_auth`]
//! or [`presentation::require_roles`] and read the caller through the
//! [`Identity`] extractor.

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;


// Re-exports for convenience
pub use application::authenticate::authenticate;
pub use application::config::AuthConfig;
pub use application::token_codec::{TokenCodec, TokenKind, VerifiedToken};
pub use domain::services::{role_guard::RoleGuard, secure_token::SecureTokenFactory};
pub use domain::value_object::{identity::Identity, role::Role};
pub use error::{AuthError, AuthResult};
pub use infra::{InMemoryAccountRepository, LogEmailDispatcher, PgAccountRepository};
pub use presentation::router::{auth_router, auth_router_generic};

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};
