use platform::repository::{
    Filter, FindOptions, Record, RecordMeta, Session, StoreResult, Value,
};
use serde::Serialize;
use sqlx::FromRow;

use super::{TodoListDetails, TodoType};

/// A named list under one [`TodoType`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, FromRow)]
#[sqlx(default)]
pub struct TodoList {
    pub id: i64,
    pub type_id: i64,
    pub name: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    #[sqlx(skip)]
    pub todo_type: Option<TodoType>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    #[sqlx(skip)]
    pub details: Vec<TodoListDetails>,
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub meta: RecordMeta,
}

impl TodoList {
    pub fn new(type_id: i64, name: impl Into<String>) -> Self {
        Self {
            type_id,
            name: name.into(),
            ..Self::default()
        }
    }
}

impl Record for TodoList {
    const TABLE: &'static str = "to_do_list";
    const UNIQUE: &'static [&'static str] = &["name"];

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
            ("type_id", self.type_id.into()),
            ("name", self.name.clone().into()),
        ]
    }

    async fn preload<S: Session>(&mut self, session: &mut S, options: &FindOptions) -> StoreResult<()> {
        if options.wants("Type") {
            self.todo_type = session.fetch::<TodoType>(self.type_id).await?;
        }

        if options.wants("Details") {
            let filter = Filter::new().eq("to_do_list_id", self.id);
            let mut details = session.fetch_all::<TodoListDetails>(&filter).await?;

            let nested = options.nested("Details");
            if nested.wants("Users") && !details.is_empty() {
                TodoListDetails::preload_users(&mut details, session, nested.columns("Users"))
                    .await?;
            }
            self.details = details;
        }
        Ok(())
    }
}
