use chrono::{DateTime, Utc};
use kernel::id::UserId;
use serde::Serialize;
use sqlx::FromRow;
use sqlx::postgres::PgRow;

use super::query::FindOptions;
use super::{Session, StoreResult};

/// A column value as seen by filters, ordering and uniqueness checks
#[derive(Debug, Clone, PartialEq, PartialOrd)]
pub enum Value {
    Null,
    Int(i64),
    Text(String),
    Time(DateTime<Utc>),
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(value: DateTime<Utc>) -> Self {
        Value::Time(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

/// Timestamps, soft-delete marker and audit columns shared by every table
#[derive(Debug, Clone, Default, PartialEq, Serialize, FromRow)]
#[sqlx(default)]
pub struct RecordMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(skip)]
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_by: Option<i64>,
    pub updated_by: Option<i64>,
    pub deleted_by: Option<i64>,
}

impl RecordMeta {
    pub fn stamp_created(&mut self, actor: UserId) {
        self.created_by = Some(actor.get());
    }

    pub fn stamp_updated(&mut self, actor: UserId) {
        self.updated_by = Some(actor.get());
    }

    pub fn stamp_deleted(&mut self, actor: Option<UserId>, at: DateTime<Utc>) {
        self.deleted_at = Some(at);
        self.deleted_by = actor.map(|a| a.get());
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// A persisted entity
///
/// Implementors describe their table and writable columns; the repository
/// handles id, timestamps and audit columns through [`RecordMeta`].
pub trait Record: for<'r> FromRow<'r, PgRow> + Clone + Send + Sync + Unpin + 'static {
    const TABLE: &'static str;

    /// Columns that must be unique among live rows.
    const UNIQUE: &'static [&'static str] = &[];

    fn id(&self) -> i64;

    fn set_id(&mut self, id: i64);

    fn meta(&self) -> &RecordMeta;

    fn meta_mut(&mut self) -> &mut RecordMeta;

    /// Writable columns, in insert order.
    fn fields(&self) -> Vec<(&'static str, Value)>;

    fn value(&self, column: &str) -> Value {
        let meta = self.meta();
        match column {
            "id" => Value::Int(self.id()),
            "created_at" => meta.created_at.into(),
            "updated_at" => meta.updated_at.into(),
            "deleted_at" => meta.deleted_at.into(),
            "created_by" => meta.created_by.into(),
            "updated_by" => meta.updated_by.into(),
            "deleted_by" => meta.deleted_by.into(),
            other => self
                .fields()
                .into_iter()
                .find(|(name, _)| *name == other)
                .map_or(Value::Null, |(_, value)| value),
        }
    }

    /// Reset every column outside `columns` (and `id`) to its default.
    fn project(&mut self, _columns: &[&str]) {}

    /// Load the relations named in `options`.
    fn preload<S: Session>(
        &mut self,
        _session: &mut S,
        _options: &FindOptions,
    ) -> impl Future<Output = StoreResult<()>> + Send {
        async { Ok(()) }
    }
}

/// A many-to-many join table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Link {
    pub table: &'static str,
    pub owner_column: &'static str,
    pub target_column: &'static str,
}

impl Link {
    pub const USER_ROLES: Link = Link {
        table: "user_roles",
        owner_column: "user_id",
        target_column: "role_id",
    };

    pub const TASK_ASSIGNMENTS: Link = Link {
        table: "to_do_task_assignments",
        owner_column: "to_do_list_detail_id",
        target_column: "user_id",
    };
}
