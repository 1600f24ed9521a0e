//! Login Use Case
//!
//! Verifies an account's password and issues a session token.

use std::sync::Arc;

use platform::password::ClearTextPassword;
use platform::repository::Database;
use platform::token::IssuedToken;

use crate::application::config::AuthConfig;
use crate::domain::repository::{USERS, UserLookup};
use crate::error::{AuthError, AuthResult};

/// Login input
pub struct LoginInput {
    pub account: String,
    pub password: String,
}

/// Login use case
pub struct LoginUseCase<D: Database> {
    db: D,
    config: Arc<AuthConfig>,
}

impl<D: Database> LoginUseCase<D> {
    pub fn new(db: D, config: Arc<AuthConfig>) -> Self {
        Self { db, config }
    }

    pub async fn execute(&self, input: LoginInput) -> AuthResult<IssuedToken> {
        // Register stores the trimmed account.
        let account = input.account.trim();
        let mut session = self.db.begin().await?;
        let user = USERS
            .find_by_account(&mut session, account)
            .await?
            .ok_or(AuthError::AccountNotFound)?;

        // Existing accounts may predate the current policy; only verify here.
        let candidate = ClearTextPassword::for_verification(&input.password);
        if !user.password()?.verify(&candidate) {
            return Err(AuthError::IncorrectPassword);
        }

        let issued = self.config.token_signer.issue(user.id)?;

        tracing::info!(user_id = user.id, account = %user.account, "User logged in");

        Ok(issued)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::register::{RegisterInput, RegisterUseCase};
    use crate::domain::entity::Role;
    use platform::repository::memory::MemoryDatabase;

    async fn registered(password: &str) -> (LoginUseCase<MemoryDatabase>, i64, Arc<AuthConfig>) {
        let db = MemoryDatabase::new();
        db.seed(Role::new("Guest", "訪客")).await.unwrap();
        let config = Arc::new(AuthConfig::with_random_secret());
        let user = RegisterUseCase::new(db.clone(), config.clone())
            .execute(RegisterInput {
                account: "alice".into(),
                password: password.into(),
            })
            .await
            .unwrap();
        (LoginUseCase::new(db, config.clone()), user.id, config)
    }

    fn input(account: &str, password: &str) -> LoginInput {
        LoginInput {
            account: account.into(),
            password: password.into(),
        }
    }

    #[tokio::test]
    async fn test_login_issues_token_for_registered_user() {
        let (use_case, user_id, config) = registered("correct horse battery").await;

        let issued = use_case
            .execute(input("alice", "correct horse battery"))
            .await
            .unwrap();

        let claims = config.token_signer.verify(&issued.token).unwrap();
        assert_eq!(claims.user_id().unwrap(), user_id);
        assert_eq!(claims.exp - claims.iat, 24 * 3600);
    }

    #[tokio::test]
    async fn test_login_unknown_account() {
        let (use_case, _, _) = registered("correct horse battery").await;
        let err = use_case
            .execute(input("mallory", "correct horse battery"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "account not found");
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let (use_case, _, _) = registered("correct horse battery").await;
        let err = use_case
            .execute(input("alice", "wrong horse battery"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "incorrect password");
        assert_eq!(err.to_app_error().status_code(), 401);
    }

    #[tokio::test]
    async fn test_login_trims_account_like_register() {
        let db = MemoryDatabase::new();
        db.seed(Role::new("Guest", "訪客")).await.unwrap();
        let config = Arc::new(AuthConfig::with_random_secret());
        let user = RegisterUseCase::new(db.clone(), config.clone())
            .execute(RegisterInput {
                account: " alice ".into(),
                password: "correct horse battery".into(),
            })
            .await
            .unwrap();
        assert_eq!(user.account, "alice");

        let use_case = LoginUseCase::new(db, config.clone());
        for account in [" alice ", "alice"] {
            let issued = use_case
                .execute(input(account, "correct horse battery"))
                .await
                .unwrap();
            let claims = config.token_signer.verify(&issued.token).unwrap();
            assert_eq!(claims.user_id().unwrap(), user.id);
        }
    }

    #[tokio::test]
    async fn test_login_skips_policy() {
        let (use_case, _, _) = registered("correct horse battery").await;
        // Too short for registration, but still only a mismatch at login.
        let err = use_case.execute(input("alice", "x")).await.unwrap_err();
        assert!(matches!(err, AuthError::IncorrectPassword));
    }
}
