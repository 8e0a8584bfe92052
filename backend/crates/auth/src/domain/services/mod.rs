//! Domain Services

pub mod role_guard;
pub mod secure_token;
