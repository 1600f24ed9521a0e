//! Application Layer
//!
//! One service per entity. Every mutating method runs in a single session:
//! an early return drops the session and rolls back everything it wrote.

pub mod todo_list;
pub mod todo_list_details;
pub mod todo_type;

pub use todo_list::TodoListService;
pub use todo_list_details::{NewDetails, TodoListDetailsService};
pub use todo_type::TodoTypeService;

use crate::error::{TodoError, TodoResult};

/// Trimmed, non-blank text field
fn required_text(value: &str, field: &str) -> TodoResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(TodoError::validation(format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}

fn required_id(id: i64, field: &str) -> TodoResult<i64> {
    if id <= 0 {
        return Err(TodoError::validation(format!("{field} is required")));
    }
    Ok(id)
}
