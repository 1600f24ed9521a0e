//! Todo Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - TodoType, TodoList and TodoListDetails entities, name lookups
//! - `application/` - One transactional service per entity
//! - `presentation/` - HTTP handlers, DTOs, router
//!
//! Every route sits behind the bearer-token middleware from the `auth` crate.
//! Mutations record the acting user in `created_by` / `updated_by` / `deleted_by`.

pub mod application;
pub mod domain;
pub mod error;
pub mod presentation;

pub use error::{TodoError, TodoResult};
pub use presentation::router::todo_router;

pub mod models {
    pub use crate::domain::entity::*;
    pub use crate::presentation::dto::*;
}
