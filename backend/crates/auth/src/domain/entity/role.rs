//! Role Entity

use platform::repository::{Record, RecordMeta, Value};
use serde::Serialize;
use sqlx::FromRow;

pub const ADMIN: &str = "Admin";
pub const GUEST: &str = "Guest";
pub const MEMBER: &str = "Member";

/// Named permission group
#[derive(Debug, Clone, Default, PartialEq, Serialize, FromRow)]
#[sqlx(default)]
pub struct Role {
    pub id: i64,
    pub name: String,
    pub description: String,
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub meta: RecordMeta,
}

impl Role {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            ..Self::default()
        }
    }

    /// Case-insensitive name comparison
    pub fn matches(&self, name: &str) -> bool {
        self.name.to_lowercase() == name.to_lowercase()
    }
}

impl Record for Role {
    const TABLE: &'static str = "roles";
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
            ("name", self.name.clone().into()),
            ("description", self.description.clone().into()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_ignores_case() {
        let role = Role::new("Admin", "管理員");
        assert!(role.matches("admin"));
        assert!(role.matches("ADMIN"));
        assert!(!role.matches("Administrator"));
    }
}
