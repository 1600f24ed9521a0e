//! Shared Kernel - Domain-crossing minimal core
//!
//! This crate contains the "smallest core" of domain vocabulary:
//! - Common error types and result aliases
//! - Common primitive value objects (ID types, etc.)
//! - Pagination and ordering rules shared by every list endpoint
//! - The JSON response envelope and enveloped extractors (with the `axum` feature)
//!
//! **Design Principle**: Only include things that are "hard to change"
//! and have consistent meaning across all domains.

#[cfg(feature = "axum")]
pub mod extract;
pub mod error {
    pub mod app_error;
    pub mod conversions;
    pub mod kind;
}
pub mod id;
pub mod order;
pub mod pagination;
#[cfg(feature = "axum")]
pub mod response;
