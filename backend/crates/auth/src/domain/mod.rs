//! Domain Layer
//!
//! Contains entities, value objects, services, and the repository and
//! mailer ports.

pub mod entity;
pub mod mailer;
pub mod repository;
pub mod services;
pub mod value_object;

// Re-exports
pub use entity::account::Account;
pub use mailer::{DispatchError, EmailDispatcher, OutboundEmail};
pub use repository::AccountRepository;
pub use services::{role_guard::RoleGuard, secure_token::SecureTokenFactory};
pub use value_object::{identity::Identity, role::Role};
