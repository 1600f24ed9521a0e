//! Domain Layer
//!
//! Contains entities and repository extensions.

pub mod entity;
pub mod repository;

pub use entity::{TodoList, TodoListDetails, TodoType};
pub use repository::{NameLookup, TODO_LIST_DETAILS, TODO_LISTS, TODO_TYPES};
