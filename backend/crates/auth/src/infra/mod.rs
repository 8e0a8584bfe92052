//! Infrastructure Layer
//!
//! Database implementations and external service integrations.

pub mod mailer;
pub mod memory;
pub mod postgres;

pub use mailer::LogEmailDispatcher;
pub use memory::InMemoryAccountRepository;
pub use postgres::PgAccountRepository;
