//! Presentation Layer
//!
//! HTTP handlers, DTOs, router, and middleware.

pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod router;

pub use handlers::AuthAppState;
pub use middleware::{ActorSlot, CurrentUser, RoleGate, require_jwt, require_roles};
pub use router::{auth_router, member_router};
