use auth::domain::entity::User;
use platform::repository::{
    FindOptions, Link, Record, RecordMeta, Session, StoreResult, Value,
};
use serde::Serialize;
use sqlx::FromRow;

/// One item of a todo list, assignable to several users
#[derive(Debug, Clone, Default, PartialEq, Serialize, FromRow)]
#[sqlx(default)]
pub struct TodoListDetails {
    pub id: i64,
    pub to_do_list_id: i64,
    pub name: String,
    pub detail: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    #[sqlx(skip)]
    pub users: Vec<User>,
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub meta: RecordMeta,
}

impl TodoListDetails {
    pub fn new(to_do_list_id: i64, name: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            to_do_list_id,
            name: name.into(),
            detail: detail.into(),
            ..Self::default()
        }
    }

    /// Load assigned users for many details with one query.
    pub async fn preload_users<S: Session>(
        details: &mut [TodoListDetails],
        session: &mut S,
        columns: Option<&'static [&'static str]>,
    ) -> StoreResult<()> {
        let owners: Vec<i64> = details.iter().map(|d| d.id).collect();
        let linked = session
            .fetch_linked::<User>(&Link::TASK_ASSIGNMENTS, &owners, columns)
            .await?;

        for detail in details.iter_mut() {
            detail.users = linked
                .iter()
                .filter(|(owner, _)| *owner == detail.id)
                .map(|(_, user)| user.clone())
                .collect();
        }
        Ok(())
    }
}

impl Record for TodoListDetails {
    const TABLE: &'static str = "to_do_list_details";

    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }

    fn meta(&self) -> &RecordMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut RecordMeta {
        &mut self.meta
    }

    fn fields(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("to_do_list_id", self.to_do_list_id.into()),
            ("name", self.name.clone().into()),
            ("detail", self.detail.clone().into()),
        ]
    }

    async fn preload<S: Session>(&mut self, session: &mut S, options: &FindOptions) -> StoreResult<()> {
        if options.wants("Users") {
            Self::preload_users(std::slice::from_mut(self), session, options.columns("Users")).await?;
        }
        Ok(())
    }
}
