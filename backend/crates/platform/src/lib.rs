//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Cryptographic utilities (CSPRNG, SHA-256, hex, constant-time compare)
//! - Password hashing (Argon2id, NIST SP 800-63B compliant)
//! - Cookie management and request header extraction
//! - Rate limiting infrastructure
//! - Environment-driven configuration helpers

pub mod client;
pub mod config;
pub mod cookie;
pub mod crypto;
pub mod password;
pub mod rate_limit;
