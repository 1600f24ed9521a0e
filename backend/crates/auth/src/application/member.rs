//! Member Service
//!
//! Administrative listing of accounts and role assignment.

use kernel::id::UserId;
use kernel::order::OrderClause;
use kernel::pagination::{PageRequest, Paginated};
use platform::repository::{Database, Filter, FindOptions, Link, ListQuery, Session, StoreError};

use crate::domain::entity::User;
use crate::domain::repository::{ROLES, USERS};
use crate::error::{AuthError, AuthResult};

fn with_roles() -> FindOptions {
    FindOptions::new().preload("Roles")
}

pub struct MemberService<D: Database> {
    db: D,
}

impl<D: Database> MemberService<D> {
    pub fn new(db: D) -> Self {
        Self { db }
    }

    pub async fn index(
        &self,
        keyword: Option<&str>,
        page: PageRequest,
        orders: &[OrderClause],
    ) -> AuthResult<Paginated<User>> {
        let mut session = self.db.begin().await?;
        let query = ListQuery::new(Filter::new().keyword("account", keyword)).with_options(with_roles());
        let (users, total) = USERS
            .find_all_with_query(&mut session, &query, page, orders)
            .await?;
        Ok(Paginated::new(users, total, page))
    }

    pub async fn show(&self, id: i64) -> AuthResult<User> {
        let mut session = self.db.begin().await?;
        let user = USERS
            .find_by_id(&mut session, id, Some(&with_roles()))
            .await?;
        Ok(user)
    }

    /// Replace the user's roles with exactly `role_id`.
    pub async fn edit(&self, user_id: i64, role_id: i64, actor: UserId) -> AuthResult<User> {
        if role_id <= 0 {
            return Err(AuthError::Validation("role_id is required".into()));
        }

        let mut session = self.db.begin().await?;

        let role = ROLES
            .find_by_id(&mut session, role_id, None)
            .await
            .map_err(|e| not_found_as(e, AuthError::RoleNotFound))?;
        let mut user = USERS
            .find_by_id(&mut session, user_id, None)
            .await
            .map_err(|e| not_found_as(e, AuthError::UserNotFound))?;

        session
            .replace_links(&Link::USER_ROLES, user.id, &[role.id])
            .await?;
        user.meta.stamp_updated(actor);
        USERS.update(&mut session, &mut user).await?;

        let user = USERS
            .find_by_id(&mut session, user.id, Some(&with_roles()))
            .await?;
        session.commit().await?;

        tracing::info!(
            user_id = user.id,
            role = %role.name,
            actor = %actor,
            "Member role replaced"
        );

        Ok(user)
    }
}

fn not_found_as(err: StoreError, replacement: AuthError) -> AuthError {
    match err {
        StoreError::NotFound { .. } => replacement,
        other => AuthError::Store(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::Role;
    use kernel::order::{DEFAULT_ORDER, OrderClause};
    use platform::password::{ClearTextPassword, HashedPassword};
    use platform::repository::memory::MemoryDatabase;

    fn placeholder_hash() -> HashedPassword {
        ClearTextPassword::new("correct horse battery".to_string())
            .unwrap()
            .hash()
            .unwrap()
    }

    async fn setup() -> (MemoryDatabase, User, Role, Role) {
        let db = MemoryDatabase::new();
        let guest = db.seed(Role::new("Guest", "訪客")).await.unwrap();
        let member = db.seed(Role::new("Member", "一般會員")).await.unwrap();
        let user = db.seed(User::new("alice", placeholder_hash())).await.unwrap();

        let mut session = db.begin().await.unwrap();
        session
            .replace_links(&Link::USER_ROLES, user.id, &[guest.id])
            .await
            .unwrap();
        session.commit().await.unwrap();

        (db, user, guest, member)
    }

    #[tokio::test]
    async fn test_edit_replaces_role_set() {
        let (db, user, _guest, member) = setup().await;
        let service = MemberService::new(db.clone());

        let edited = service.edit(user.id, member.id, UserId::new(99)).await.unwrap();
        assert_eq!(edited.roles.len(), 1);
        assert_eq!(edited.roles[0].name, "Member");
        assert_eq!(edited.meta.updated_by, Some(99));

        let again = service.edit(user.id, member.id, UserId::new(99)).await.unwrap();
        assert_eq!(again.roles.len(), 1);
        assert_eq!(db.linked(&Link::USER_ROLES, user.id), vec![member.id]);
    }

    #[tokio::test]
    async fn test_edit_unknown_role_changes_nothing() {
        let (db, user, guest, _member) = setup().await;
        let service = MemberService::new(db.clone());

        let err = service.edit(user.id, 404, UserId::new(1)).await.unwrap_err();
        assert!(matches!(err, AuthError::RoleNotFound));
        assert_eq!(err.to_string(), "找不到 role");
        assert_eq!(db.linked(&Link::USER_ROLES, user.id), vec![guest.id]);
    }

    #[tokio::test]
    async fn test_edit_unknown_user() {
        let (db, _user, _guest, member) = setup().await;
        let err = MemberService::new(db)
            .edit(404, member.id, UserId::new(1))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "找不到 user");
    }

    #[tokio::test]
    async fn test_edit_checks_role_before_user() {
        let (db, _user, _guest, _member) = setup().await;
        let err = MemberService::new(db)
            .edit(404, 405, UserId::new(1))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::RoleNotFound));
    }

    #[tokio::test]
    async fn test_index_filters_by_account_and_preloads_roles() {
        let (db, _user, _guest, _member) = setup().await;
        db.seed(User::new("bob", placeholder_hash())).await.unwrap();
        db.seed(User::new("alicia", placeholder_hash())).await.unwrap();
        let service = MemberService::new(db);

        let page = service
            .index(Some("ali"), PageRequest::default(), &[OrderClause::asc("account")])
            .await
            .unwrap();
        assert_eq!(page.total, 2);
        assert_eq!(page.data[0].account, "alice");
        assert_eq!(page.data[0].roles[0].name, "Guest");
        assert_eq!(page.data[1].account, "alicia");
        assert!(page.data[1].roles.is_empty());

        let all = service
            .index(None, PageRequest::new(1, 2).unwrap(), &[DEFAULT_ORDER])
            .await
            .unwrap();
        assert_eq!(all.total, 3);
        assert_eq!(all.data.len(), 2);
    }

    #[tokio::test]
    async fn test_show_missing_member() {
        let (db, _user, _guest, _member) = setup().await;
        let err = MemberService::new(db).show(0).await.unwrap_err();
        assert_eq!(err.to_app_error().status_code(), 404);
    }
}
