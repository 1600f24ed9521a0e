use auth::domain::{USERS, UserLookup};
use kernel::id::UserId;
use kernel::order::OrderClause;
use kernel::pagination::{PageRequest, Paginated};
use platform::repository::{Database, Filter, FindOptions, Link, ListQuery, Session};

use super::{required_id, required_text};
use crate::domain::{TODO_LIST_DETAILS, TODO_LISTS, TodoListDetails};
use crate::error::{LIST_MISSING, TodoError, TodoResult, USERS_MISSING};

/// Fields accepted when creating a detail
#[derive(Debug, Clone, Default)]
pub struct NewDetails {
    pub to_do_list_id: i64,
    pub name: String,
    pub detail: String,
    pub user_ids: Vec<i64>,
}

pub struct TodoListDetailsService<D: Database> {
    db: D,
}

impl<D: Database> TodoListDetailsService<D> {
    pub fn new(db: D) -> Self {
        Self { db }
    }

    /// Insert the detail and assign exactly the given users.
    ///
    /// Every user id must resolve to a live user; duplicates are ignored.
    pub async fn create(&self, input: NewDetails, actor: UserId) -> TodoResult<TodoListDetails> {
        let list_id = required_id(input.to_do_list_id, "to_do_list_id")?;
        let name = required_text(&input.name, "name")?;
        let detail = required_text(&input.detail, "detail")?;

        let mut user_ids = input.user_ids;
        user_ids.sort_unstable();
        user_ids.dedup();

        let mut session = self.db.begin().await?;

        if !TODO_LISTS.exists(&mut session, list_id).await? {
            return Err(TodoError::validation(LIST_MISSING));
        }
        let found = USERS.count_existing(&mut session, &user_ids).await?;
        if found != user_ids.len() as i64 {
            return Err(TodoError::validation(USERS_MISSING));
        }

        let mut details = TodoListDetails::new(list_id, name, detail);
        details.meta.stamp_created(actor);
        TODO_LIST_DETAILS.create(&mut session, &mut details).await?;
        session
            .replace_links(&Link::TASK_ASSIGNMENTS, details.id, &user_ids)
            .await?;

        let details = TODO_LIST_DETAILS
            .find_by_id(&mut session, details.id, Some(&FindOptions::new().preload("Users")))
            .await?;
        session.commit().await?;

        tracing::info!(
            id = details.id,
            list_id,
            assigned = user_ids.len(),
            actor = %actor,
            "Todo list details created"
        );
        Ok(details)
    }

    pub async fn index(
        &self,
        to_do_list_id: Option<i64>,
        keyword: Option<&str>,
        page: PageRequest,
        orders: &[OrderClause],
    ) -> TodoResult<Paginated<TodoListDetails>> {
        let mut filter = Filter::new().keyword("name", keyword);
        if let Some(list_id) = to_do_list_id.filter(|id| *id > 0) {
            filter = filter.eq("to_do_list_id", list_id);
        }

        let mut session = self.db.begin().await?;
        let (rows, total) = TODO_LIST_DETAILS
            .find_all_with_query(&mut session, &ListQuery::new(filter), page, orders)
            .await?;
        Ok(Paginated::new(rows, total, page))
    }

    pub async fn show(&self, id: i64) -> TodoResult<TodoListDetails> {
        let mut session = self.db.begin().await?;
        let options = FindOptions::new().preload("Users");
        Ok(TODO_LIST_DETAILS
            .find_by_id(&mut session, id, Some(&options))
            .await?)
    }

    pub async fn edit(
        &self,
        id: i64,
        name: &str,
        detail: &str,
        actor: UserId,
    ) -> TodoResult<TodoListDetails> {
        let name = required_text(name, "name")?;
        let detail = required_text(detail, "detail")?;
        let mut session = self.db.begin().await?;

        let mut details = TODO_LIST_DETAILS.find_by_id(&mut session, id, None).await?;
        details.name = name;
        details.detail = detail;
        details.meta.stamp_updated(actor);
        TODO_LIST_DETAILS.update(&mut session, &mut details).await?;
        session.commit().await?;

        Ok(details)
    }

    pub async fn delete(&self, id: i64, actor: UserId) -> TodoResult<TodoListDetails> {
        let mut session = self.db.begin().await?;
        let mut details = TODO_LIST_DETAILS.find_by_id(&mut session, id, None).await?;
        TODO_LIST_DETAILS
            .soft_delete(&mut session, &mut details, Some(actor))
            .await?;
        session.commit().await?;

        tracing::info!(id, actor = %actor, "Todo list details deleted");
        Ok(details)
    }
}
