pub mod todo_list;
pub mod todo_list_details;
pub mod todo_type;

pub use todo_list::TodoList;
pub use todo_list_details::TodoListDetails;
pub use todo_type::TodoType;
