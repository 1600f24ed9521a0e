//! Seed Data
//!
//! Inserts the built-in roles and the initial administrator. Running it
//! again only fills in what is missing.

use platform::password::ClearTextPassword;
use platform::repository::{Database, Link, Session};

use crate::domain::entity::role::{ADMIN, GUEST, MEMBER};
use crate::domain::entity::{Role, User};
use crate::domain::repository::{ROLES, RoleLookup, USERS, UserLookup};
use crate::error::AuthResult;

/// Built-in roles and their descriptions
pub const SEED_ROLES: &[(&str, &str)] = &[(ADMIN, "管理員"), (GUEST, "訪客"), (MEMBER, "一般會員")];

pub const ADMIN_ACCOUNT: &str = "admin";

#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub roles_created: usize,
    pub admin_created: bool,
}

/// Seed roles, and the admin account when a password is supplied.
pub async fn seed<D: Database>(db: &D, admin_password: Option<&str>) -> AuthResult<SeedReport> {
    let mut report = SeedReport::default();
    let mut session = db.begin().await?;

    let mut admin_role_id = None;
    for (name, description) in SEED_ROLES {
        let role = match ROLES.find_by_name(&mut session, name).await? {
            Some(role) => role,
            None => {
                let mut role = Role::new(*name, *description);
                ROLES.create(&mut session, &mut role).await?;
                report.roles_created += 1;
                role
            }
        };
        if *name == ADMIN {
            admin_role_id = Some(role.id);
        }
    }

    match (admin_password, admin_role_id) {
        (Some(password), Some(role_id)) => {
            if USERS
                .find_by_account(&mut session, ADMIN_ACCOUNT)
                .await?
                .is_none()
            {
                let hashed = ClearTextPassword::new(password.to_string())?.hash()?;
                let mut admin = User::new(ADMIN_ACCOUNT, hashed);
                USERS.create(&mut session, &mut admin).await?;
                session
                    .replace_links(&Link::USER_ROLES, admin.id, &[role_id])
                    .await?;
                report.admin_created = true;
            }
        }
        _ => {
            tracing::warn!("SEED_ADMIN_PASSWORD not set, skipping admin account");
        }
    }

    session.commit().await?;

    tracing::info!(
        roles_created = report.roles_created,
        admin_created = report.admin_created,
        "Seed complete"
    );

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use platform::repository::memory::MemoryDatabase;

    #[tokio::test]
    async fn test_seed_is_idempotent() {
        let db = MemoryDatabase::new();

        let first = seed(&db, Some("correct horse battery")).await.unwrap();
        assert_eq!(
            first,
            SeedReport {
                roles_created: 3,
                admin_created: true
            }
        );

        let second = seed(&db, Some("correct horse battery")).await.unwrap();
        assert_eq!(second, SeedReport::default());

        assert_eq!(db.rows::<Role>().len(), 3);
        let admin = db.rows::<User>().pop().unwrap();
        assert_eq!(admin.account, "admin");

        let admin_role = db
            .rows::<Role>()
            .into_iter()
            .find(|r| r.name == ADMIN)
            .unwrap();
        assert_eq!(db.linked(&Link::USER_ROLES, admin.id), vec![admin_role.id]);
    }

    #[tokio::test]
    async fn test_seed_without_password_only_adds_roles() {
        let db = MemoryDatabase::new();
        let report = seed(&db, None).await.unwrap();
        assert_eq!(report.roles_created, 3);
        assert!(!report.admin_created);
        assert!(db.rows::<User>().is_empty());
    }
}
