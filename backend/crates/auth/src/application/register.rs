//! Register Use Case
//!
//! Creates an account holding the default role.

use std::sync::Arc;

use platform::password::ClearTextPassword;
use platform::repository::{Database, FindOptions, Link, Session, StoreError};

use crate::application::config::AuthConfig;
use crate::domain::entity::User;
use crate::domain::repository::{ROLES, RoleLookup, USERS, UserLookup};
use crate::error::{AuthError, AuthResult};

/// Register input
pub struct RegisterInput {
    pub account: String,
    pub password: String,
}

/// Register use case
pub struct RegisterUseCase<D: Database> {
    db: D,
    config: Arc<AuthConfig>,
}

impl<D: Database> RegisterUseCase<D> {
    pub fn new(db: D, config: Arc<AuthConfig>) -> Self {
        Self { db, config }
    }

    /// Returns the new user with its roles loaded.
    pub async fn execute(&self, input: RegisterInput) -> AuthResult<User> {
        let account = input.account.trim().to_string();
        if account.is_empty() {
            return Err(AuthError::Validation("account is required".into()));
        }

        let password = ClearTextPassword::new(input.password)?;

        let mut session = self.db.begin().await?;

        if USERS.find_by_account(&mut session, &account).await?.is_some() {
            return Err(AuthError::AccountTaken);
        }

        let role = ROLES
            .find_by_name(&mut session, &self.config.default_role)
            .await?
            .ok_or_else(|| AuthError::DefaultRoleMissing(self.config.default_role.clone()))?;

        let mut user = User::new(account, password.hash()?);
        USERS.create(&mut session, &mut user).await.map_err(account_conflict)?;
        session
            .replace_links(&Link::USER_ROLES, user.id, &[role.id])
            .await?;

        let user = USERS
            .find_by_id(&mut session, user.id, Some(&FindOptions::new().preload("Roles")))
            .await?;
        session.commit().await.map_err(account_conflict)?;

        tracing::info!(user_id = user.id, account = %user.account, "User registered");

        Ok(user)
    }
}

fn account_conflict(err: StoreError) -> AuthError {
    if err.is_unique_violation() {
        AuthError::AccountTaken
    } else {
        AuthError::Store(err)
    }
}
