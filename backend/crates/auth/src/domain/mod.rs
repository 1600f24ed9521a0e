//! Domain Layer
//!
//! Contains entities and repository extensions.

pub mod entity;
pub mod repository;

// Re-exports
pub use entity::{Role, User};
pub use repository::{ROLES, RoleLookup, USERS, UserLookup};
