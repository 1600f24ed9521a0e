//! Auth (Authentication) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - User and Role entities, repository extensions
//! - `application/` - Login, Register and Member use cases
//! - `infra/` - Seed data
//! - `presentation/` - HTTP handlers, DTOs, router, middleware
//!
//! ## Features
//! - Account registration and login with signed session tokens
//! - Bearer-token middleware and a case-insensitive role gate
//! - Member administration (role assignment) for admins
//!
//! ## Security Model
//! - Passwords hashed with Argon2id (NIST SP 800-63B compliant)
//! - Tokens are HS256 JWTs with a fixed 24 hour lifetime
//! - The password hash is never serialized

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::config::AuthConfig;
pub use error::{AuthError, AuthResult};
pub use presentation::router::{auth_router, member_router};

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

pub mod models {
    pub use crate::domain::entity::*;
    pub use crate::presentation::dto::*;
}

pub mod middleware {
    pub use crate::presentation::middleware::*;
}
