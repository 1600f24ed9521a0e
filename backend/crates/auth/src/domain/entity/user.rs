//! User Entity

use platform::password::{HashedPassword, PasswordHashError};
use platform::repository::{
    FindOptions, Link, Record, RecordMeta, Session, StoreResult, Value,
};
use serde::Serialize;
use sqlx::FromRow;

use super::role::Role;

/// Account holder
///
/// The password hash is stored in the `password` column and is never
/// serialized.
#[derive(Debug, Clone, Default, PartialEq, Serialize, FromRow)]
#[sqlx(default)]
pub struct User {
    pub id: i64,
    pub account: String,
    #[serde(skip_serializing)]
    #[sqlx(rename = "password")]
    pub password_hash: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    #[sqlx(skip)]
    pub roles: Vec<Role>,
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub meta: RecordMeta,
}

impl User {
    pub fn new(account: impl Into<String>, password: HashedPassword) -> Self {
        Self {
            account: account.into(),
            password_hash: password.into_phc_string(),
            ..Self::default()
        }
    }

    pub fn password(&self) -> Result<HashedPassword, PasswordHashError> {
        HashedPassword::from_phc_string(self.password_hash.as_str())
    }

    /// True if any loaded role matches one of `allowed`.
    pub fn has_any_role<S: AsRef<str>>(&self, allowed: &[S]) -> bool {
        self.roles
            .iter()
            .any(|role| allowed.iter().any(|name| role.matches(name.as_ref())))
    }
}

impl Record for User {
    const TABLE: &'static str = "users";
    const UNIQUE: &'static [&'static str] = &["account"];

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
            ("account", self.account.clone().into()),
            ("password", self.password_hash.clone().into()),
        ]
    }

    fn project(&mut self, columns: &[&str]) {
        if !columns.contains(&"account") {
            self.account.clear();
        }
        if !columns.contains(&"password") {
            self.password_hash.clear();
        }
        self.roles.clear();
        self.meta = RecordMeta::default();
    }

    async fn preload<S: Session>(&mut self, session: &mut S, options: &FindOptions) -> StoreResult<()> {
        if options.wants("Roles") {
            self.roles = session
                .fetch_linked::<Role>(&Link::USER_ROLES, &[self.id], options.columns("Roles"))
                .await?
                .into_iter()
                .map(|(_, role)| role)
                .collect();
        }
        Ok(())
    }
}
