//! Auth Error Types
//!
//! This module provides auth-specific error variants that integrate
//! with the unified `kernel::error::AppError` system.

use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use platform::password::{PasswordHashError, PasswordPolicyError};
use platform::repository::StoreError;
use platform::token::TokenError;
use thiserror::Error;

/// Auth-specific result type alias
pub type AuthResult<T> = Result<T, AuthError>;

/// Auth-specific error variants
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("account not found")]
    AccountNotFound,

    #[error("incorrect password")]
    IncorrectPassword,

    #[error("account already exists")]
    AccountTaken,

    /// Password rejected by the registration policy
    #[error("{0}")]
    PasswordPolicy(#[from] PasswordPolicyError),

    #[error("{0}")]
    Validation(String),

    /// The role assigned at registration is not seeded
    #[error("default role {0} is not configured")]
    DefaultRoleMissing(String),

    #[error("找不到 user")]
    UserNotFound,

    #[error("找不到 role")]
    RoleNotFound,

    #[error("token error: {0}")]
    Token(#[from] TokenError),

    #[error("password hash error: {0}")]
    PasswordHash(#[from] PasswordHashError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl AuthError {
    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::AccountNotFound | AuthError::IncorrectPassword | AuthError::AccountTaken => {
                ErrorKind::Auth
            }
            AuthError::PasswordPolicy(_) | AuthError::Validation(_) => ErrorKind::Validation,
            AuthError::UserNotFound | AuthError::RoleNotFound => ErrorKind::NotFound,
            AuthError::DefaultRoleMissing(_) | AuthError::Token(_) | AuthError::PasswordHash(_) => {
                ErrorKind::Persistence
            }
            AuthError::Store(e) => e.to_app_error().kind(),
        }
    }

    /// Convert to AppError
    pub fn to_app_error(&self) -> AppError {
        match self {
            AuthError::Store(e) => e.to_app_error(),
            other => AppError::new(other.kind(), other.to_string()),
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            AuthError::Store(StoreError::Database(e)) => {
                tracing::error!(error = %e, "Auth database error");
            }
            AuthError::DefaultRoleMissing(role) => {
                tracing::error!(role = %role, "Default role missing, run the seed command");
            }
            AuthError::Token(e) => {
                tracing::error!(error = %e, "Token signing failed");
            }
            AuthError::PasswordHash(e) => {
                tracing::error!(error = %e, "Password hash failure");
            }
            AuthError::AccountNotFound | AuthError::IncorrectPassword => {
                tracing::warn!(error = %self, "Invalid login attempt");
            }
            _ => {
                tracing::debug!(error = %self, "Auth error");
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}

impl From<AppError> for AuthError {
    fn from(err: AppError) -> Self {
        AuthError::Validation(err.message().to_string())
    }
}
