use platform::repository::{Record, RecordMeta, Value};
use serde::Serialize;
use sqlx::FromRow;

/// Category a todo list belongs to
#[derive(Debug, Clone, Default, PartialEq, Serialize, FromRow)]
#[sqlx(default)]
pub struct TodoType {
    pub id: i64,
    pub name: String,
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub meta: RecordMeta,
}

impl TodoType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

impl Record for TodoType {
    const TABLE: &'static str = "to_do_types";
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
        vec![("name", self.name.clone().into())]
    }
}
