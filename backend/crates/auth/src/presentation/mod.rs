//! Presentation Layer
//!
//! HTTP handlers, DTOs, router, and middleware.

pub mod dto;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod router;

pub use extract::AppJson;
pub use handlers::AuthAppState;
pub use middleware::{RoleRequirement, require_auth, require_roles};
pub use router::{auth_router, auth_router_generic, auth_routes};
