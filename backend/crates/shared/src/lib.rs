//! Shared Kernel - Domain-crossing minimal core
//!
//! This crate contains the vocabulary every backend crate agrees on:
//! - The unified error type, its classification and the JSON error envelope
//! - Per-field validation details
//! - Typed ID wrappers
//!
//! **Design Principle**: Only include things that are "hard to change"
//! and have consistent meaning across all domains.

pub mod error {
    pub mod app_error;
    pub mod conversions;
    pub mod details;
    pub mod kind;
}
pub mod id;
