use kernel::id::UserId;
use kernel::order::OrderClause;
use kernel::pagination::{PageRequest, Paginated};
use platform::repository::{Database, Filter, FindOptions, ListQuery, Session};

use super::{required_id, required_text};
use crate::domain::{NameLookup, TODO_LISTS, TODO_TYPES, TodoList};
use crate::error::{TYPE_MISSING, TodoError, TodoResult};

/// Columns of assigned users shown on a list's details
const DETAIL_USER_COLUMNS: &[&str] = &["account"];

pub struct TodoListService<D: Database> {
    db: D,
}

impl<D: Database> TodoListService<D> {
    pub fn new(db: D) -> Self {
        Self { db }
    }

    pub async fn create(&self, type_id: i64, name: &str, actor: UserId) -> TodoResult<TodoList> {
        let type_id = required_id(type_id, "type_id")?;
        let name = required_text(name, "name")?;
        let mut session = self.db.begin().await?;

        if !TODO_TYPES.exists(&mut session, type_id).await? {
            return Err(TodoError::validation(TYPE_MISSING));
        }
        if TODO_LISTS.is_name_taken(&mut session, &name, 0).await? {
            return Err(TodoError::NameTaken);
        }

        let mut list = TodoList::new(type_id, name);
        list.meta.stamp_created(actor);
        TODO_LISTS.create(&mut session, &mut list).await?;
        session.commit().await?;

        tracing::info!(id = list.id, type_id, actor = %actor, "Todo list created");
        Ok(list)
    }

    pub async fn index(
        &self,
        keyword: Option<&str>,
        page: PageRequest,
        orders: &[OrderClause],
    ) -> TodoResult<Paginated<TodoList>> {
        let mut session = self.db.begin().await?;
        let query = ListQuery::new(Filter::new().keyword("name", keyword))
            .with_options(FindOptions::new().preload("Type"));
        let (rows, total) = TODO_LISTS
            .find_all_with_query(&mut session, &query, page, orders)
            .await?;
        Ok(Paginated::new(rows, total, page))
    }

    /// The list with its type, details and the accounts assigned to each detail.
    pub async fn show(&self, id: i64) -> TodoResult<TodoList> {
        let mut session = self.db.begin().await?;
        let options = FindOptions::new()
            .preload("Type")
            .preload("Details")
            .preload_columns("Details.Users", DETAIL_USER_COLUMNS)
            .debug(true);
        Ok(TODO_LISTS.find_by_id(&mut session, id, Some(&options)).await?)
    }

    pub async fn edit(
        &self,
        id: i64,
        type_id: i64,
        name: &str,
        actor: UserId,
    ) -> TodoResult<TodoList> {
        let type_id = required_id(type_id, "type_id")?;
        let name = required_text(name, "name")?;
        let mut session = self.db.begin().await?;

        if !TODO_TYPES.exists(&mut session, type_id).await? {
            return Err(TodoError::validation(TYPE_MISSING));
        }
        if TODO_LISTS.is_name_taken(&mut session, &name, id).await? {
            return Err(TodoError::NameTaken);
        }

        let mut list = TODO_LISTS.find_by_id(&mut session, id, None).await?;
        list.type_id = type_id;
        list.name = name;
        list.meta.stamp_updated(actor);
        TODO_LISTS.update(&mut session, &mut list).await?;
        session.commit().await?;

        Ok(list)
    }

    pub async fn delete(&self, id: i64, actor: UserId) -> TodoResult<TodoList> {
        let mut session = self.db.begin().await?;
        let mut list = TODO_LISTS.find_by_id(&mut session, id, None).await?;
        TODO_LISTS
            .soft_delete(&mut session, &mut list, Some(actor))
            .await?;
        session.commit().await?;

        tracing::info!(id, actor = %actor, "Todo list deleted");
        Ok(list)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::TodoTypeService;
    use crate::domain::TodoListDetails;
    use crate::error::NAME_TAKEN;
    use auth::domain::User;
    use kernel::order::DEFAULT_ORDER;
    use platform::repository::Link;
    use platform::repository::memory::MemoryDatabase;

    const ACTOR: UserId = UserId::new(1);

    async fn setup() -> (MemoryDatabase, TodoListService<MemoryDatabase>, i64) {
        let db = MemoryDatabase::new();
        let work = TodoTypeService::new(db.clone())
            .create("Work", ACTOR)
            .await
            .unwrap();
        (db.clone(), TodoListService::new(db), work.id)
    }

    #[tokio::test]
    async fn test_unknown_type_inserts_nothing() {
        let (db, service, _) = setup().await;

        let err = service.create(999, "Groceries", ACTOR).await.unwrap_err();
        assert_eq!(err.to_string(), TYPE_MISSING);
        assert!(db.rows::<TodoList>().is_empty());

        let err = service.create(0, "Groceries", ACTOR).await.unwrap_err();
        assert!(matches!(err, TodoError::Validation(_)));
    }

    #[tokio::test]
    async fn test_list_lifecycle() {
        let (db, service, work_id) = setup().await;

        let groceries = service.create(work_id, "Groceries", ACTOR).await.unwrap();
        assert_eq!(groceries.type_id, work_id);

        let err = service.create(work_id, "Groceries", ACTOR).await.unwrap_err();
        assert_eq!(err.to_string(), NAME_TAKEN);
        assert_eq!(db.rows::<TodoList>().len(), 1);

        service
            .edit(groceries.id, work_id, "Errands", ACTOR)
            .await
            .unwrap();
        let shown = service.show(groceries.id).await.unwrap();
        assert_eq!(shown.name, "Errands");
        assert_eq!(shown.todo_type.as_ref().map(|t| t.name.as_str()), Some("Work"));

        let deleted = service.delete(groceries.id, ACTOR).await.unwrap();
        assert!(deleted.meta.is_deleted());
        assert!(matches!(
            service.show(groceries.id).await.unwrap_err(),
            TodoError::NotFound
        ));
    }

    #[tokio::test]
    async fn test_edit_checks_type_before_loading() {
        let (_db, service, work_id) = setup().await;
        let list = service.create(work_id, "Groceries", ACTOR).await.unwrap();

        let err = service.edit(list.id, 42, "Groceries", ACTOR).await.unwrap_err();
        assert_eq!(err.to_string(), TYPE_MISSING);

        // Type is checked first, so a missing list still reports the type.
        let err = service.edit(77, 42, "Other", ACTOR).await.unwrap_err();
        assert_eq!(err.to_string(), TYPE_MISSING);

        let err = service.edit(77, work_id, "Other", ACTOR).await.unwrap_err();
        assert!(matches!(err, TodoError::NotFound));
    }

    #[tokio::test]
    async fn test_show_projects_assigned_users() {
        let (db, service, work_id) = setup().await;
        let list = service.create(work_id, "Groceries", ACTOR).await.unwrap();

        let alice = db
            .seed(User {
                account: "alice".into(),
                password_hash: "$argon2id$secret".into(),
                ..User::default()
            })
            .await
            .unwrap();
        let detail = db
            .seed(TodoListDetails::new(list.id, "Milk", "2 litres"))
            .await
            .unwrap();
        let mut session = db.begin().await.unwrap();
        session
            .replace_links(&Link::TASK_ASSIGNMENTS, detail.id, &[alice.id])
            .await
            .unwrap();
        session.commit().await.unwrap();

        let shown = service.show(list.id).await.unwrap();
        assert_eq!(shown.details.len(), 1);
        let users = &shown.details[0].users;
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].id, alice.id);
        assert_eq!(users[0].account, "alice");
        assert!(users[0].password_hash.is_empty());
    }

    #[tokio::test]
    async fn test_index_preloads_type() {
        let (_db, service, work_id) = setup().await;
        service.create(work_id, "Groceries", ACTOR).await.unwrap();
        service.create(work_id, "Chores", ACTOR).await.unwrap();

        let page = service
            .index(Some("roc"), PageRequest::default(), &[DEFAULT_ORDER])
            .await
            .unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.data[0].todo_type.as_ref().map(|t| t.id), Some(work_id));
    }
}
