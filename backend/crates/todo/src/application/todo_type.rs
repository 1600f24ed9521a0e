use kernel::id::UserId;
use kernel::order::OrderClause;
use kernel::pagination::{PageRequest, Paginated};
use platform::repository::{Database, Filter, ListQuery, Session};

use super::required_text;
use crate::domain::{NameLookup, TODO_TYPES, TodoType};
use crate::error::{TodoError, TodoResult};

pub struct TodoTypeService<D: Database> {
    db: D,
}

impl<D: Database> TodoTypeService<D> {
    pub fn new(db: D) -> Self {
        Self { db }
    }

    pub async fn create(&self, name: &str, actor: UserId) -> TodoResult<TodoType> {
        let name = required_text(name, "name")?;
        let mut session = self.db.begin().await?;

        if TODO_TYPES.is_name_taken(&mut session, &name, 0).await? {
            return Err(TodoError::NameTaken);
        }

        let mut todo_type = TodoType::new(name);
        todo_type.meta.stamp_created(actor);
        TODO_TYPES.create(&mut session, &mut todo_type).await?;
        session.commit().await?;

        tracing::info!(id = todo_type.id, actor = %actor, "Todo type created");
        Ok(todo_type)
    }

    pub async fn index(
        &self,
        keyword: Option<&str>,
        page: PageRequest,
        orders: &[OrderClause],
    ) -> TodoResult<Paginated<TodoType>> {
        let mut session = self.db.begin().await?;
        let query = ListQuery::new(Filter::new().keyword("name", keyword));
        let (rows, total) = TODO_TYPES
            .find_all_with_query(&mut session, &query, page, orders)
            .await?;
        Ok(Paginated::new(rows, total, page))
    }

    pub async fn show(&self, id: i64) -> TodoResult<TodoType> {
        let mut session = self.db.begin().await?;
        Ok(TODO_TYPES.find_by_id(&mut session, id, None).await?)
    }

    pub async fn edit(&self, id: i64, name: &str, actor: UserId) -> TodoResult<TodoType> {
        let name = required_text(name, "name")?;
        let mut session = self.db.begin().await?;

        if TODO_TYPES.is_name_taken(&mut session, &name, id).await? {
            return Err(TodoError::NameTaken);
        }

        let mut todo_type = TODO_TYPES.find_by_id(&mut session, id, None).await?;
        todo_type.name = name;
        todo_type.meta.stamp_updated(actor);
        TODO_TYPES.update(&mut session, &mut todo_type).await?;
        session.commit().await?;

        Ok(todo_type)
    }

    /// Soft-delete and return the deleted row.
    pub async fn delete(&self, id: i64, actor: UserId) -> TodoResult<TodoType> {
        let mut session = self.db.begin().await?;
        let mut todo_type = TODO_TYPES.find_by_id(&mut session, id, None).await?;
        TODO_TYPES
            .soft_delete(&mut session, &mut todo_type, Some(actor))
            .await?;
        session.commit().await?;

        tracing::info!(id, actor = %actor, "Todo type deleted");
        Ok(todo_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NAME_TAKEN;
    use kernel::order::DEFAULT_ORDER;
    use platform::repository::memory::MemoryDatabase;

    const ACTOR: UserId = UserId::new(7);

    fn service() -> (MemoryDatabase, TodoTypeService<MemoryDatabase>) {
        let db = MemoryDatabase::new();
        (db.clone(), TodoTypeService::new(db))
    }

    #[tokio::test]
    async fn test_duplicate_name_conflicts() {
        let (db, service) = service();
        let work = service.create("Work", ACTOR).await.unwrap();
        assert_eq!(work.meta.created_by, Some(7));

        let err = service.create("Work", ACTOR).await.unwrap_err();
        assert_eq!(err.to_string(), NAME_TAKEN);
        assert_eq!(db.rows::<TodoType>().len(), 1);
    }

    #[tokio::test]
    async fn test_edit_to_own_name_succeeds() {
        let (_db, service) = service();
        let work = service.create("Work", ACTOR).await.unwrap();
        service.create("Home", ACTOR).await.unwrap();

        let same = service.edit(work.id, "Work", UserId::new(8)).await.unwrap();
        assert_eq!(same.name, "Work");
        assert_eq!(same.meta.updated_by, Some(8));

        let err = service.edit(work.id, "Home", ACTOR).await.unwrap_err();
        assert!(matches!(err, TodoError::NameTaken));
    }

    #[tokio::test]
    async fn test_blank_name_rejected() {
        let (db, service) = service();
        let err = service.create("   ", ACTOR).await.unwrap_err();
        assert!(matches!(err, TodoError::Validation(_)));
        assert!(db.rows::<TodoType>().is_empty());
    }

    #[tokio::test]
    async fn test_delete_then_show_not_found() {
        let (db, service) = service();
        let work = service.create("Work", ACTOR).await.unwrap();

        let deleted = service.delete(work.id, ACTOR).await.unwrap();
        assert_eq!(deleted.meta.deleted_by, Some(7));
        assert!(matches!(
            service.show(work.id).await.unwrap_err(),
            TodoError::NotFound
        ));
        assert!(matches!(
            service.delete(work.id, ACTOR).await.unwrap_err(),
            TodoError::NotFound
        ));
        assert!(db.rows::<TodoType>().is_empty());

        // A deleted name is free again.
        service.create("Work", ACTOR).await.unwrap();
    }

    #[tokio::test]
    async fn test_index_pages_and_filters() {
        let (_db, service) = service();
        for name in ["alpha", "beta", "gamma", "delta", "epsilon"] {
            service.create(name, ACTOR).await.unwrap();
        }

        let first = service
            .index(None, PageRequest::new(1, 2).unwrap(), &[DEFAULT_ORDER])
            .await
            .unwrap();
        assert_eq!(first.data.len(), 2);
        assert_eq!(first.total, 5);

        let last = service
            .index(None, PageRequest::new(3, 2).unwrap(), &[DEFAULT_ORDER])
            .await
            .unwrap();
        assert_eq!(last.data.len(), 1);

        let filtered = service
            .index(Some("lta"), PageRequest::default(), &[OrderClause::asc("name")])
            .await
            .unwrap();
        assert_eq!(filtered.total, 1);
        assert_eq!(filtered.data[0].name, "delta");
    }
}
