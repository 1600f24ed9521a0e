//! Repository Extensions
//!
//! Name uniqueness checks for the entities that carry a unique name.

use platform::repository::{BaseRepository, Filter, Record, Session, StoreResult};

use crate::domain::entity::{TodoList, TodoListDetails, TodoType};

pub const TODO_TYPES: BaseRepository<TodoType> = BaseRepository::new();
pub const TODO_LISTS: BaseRepository<TodoList> = BaseRepository::new();
pub const TODO_LIST_DETAILS: BaseRepository<TodoListDetails> = BaseRepository::new();

/// Records whose `name` column is unique among live rows
pub trait UniquelyNamed: Record {}

impl UniquelyNamed for TodoType {}
impl UniquelyNamed for TodoList {}

#[trait_variant::make(NameLookup: Send)]
pub trait LocalNameLookup {
    /// True if another live row already uses `name`.
    ///
    /// `exclude_id` is the row being edited; pass 0 when creating.
    async fn is_name_taken<S: Session>(
        &self,
        session: &mut S,
        name: &str,
        exclude_id: i64,
    ) -> StoreResult<bool>;
}

impl<T: UniquelyNamed> NameLookup for BaseRepository<T> {
    async fn is_name_taken<S: Session>(
        &self,
        session: &mut S,
        name: &str,
        exclude_id: i64,
    ) -> StoreResult<bool> {
        let mut filter = Filter::new().eq("name", name);
        if exclude_id != 0 {
            filter = filter.not_eq("id", exclude_id);
        }
        Ok(session.count::<T>(&filter).await? > 0)
    }
}
