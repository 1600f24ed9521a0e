//! Todo Error Types

use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use platform::repository::StoreError;
use thiserror::Error;

pub type TodoResult<T> = Result<T, TodoError>;

pub const NAME_TAKEN: &str = "名稱已存在";
pub const TYPE_MISSING: &str = "type_id 不存在";
pub const LIST_MISSING: &str = "to_do_list_id 不存在";
pub const USERS_MISSING: &str = "部分 User ID 不存在";

#[derive(Debug, Error)]
pub enum TodoError {
    #[error("{0}")]
    Validation(String),

    #[error("名稱已存在")]
    NameTaken,

    #[error("record not found")]
    NotFound,

    #[error(transparent)]
    Persistence(StoreError),
}

impl TodoError {
    pub fn validation(message: impl Into<String>) -> Self {
        TodoError::Validation(message.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            TodoError::Validation(_) => ErrorKind::Validation,
            TodoError::NameTaken => ErrorKind::Conflict,
            TodoError::NotFound => ErrorKind::NotFound,
            TodoError::Persistence(e) => e.to_app_error().kind(),
        }
    }

    pub fn to_app_error(&self) -> AppError {
        match self {
            TodoError::Persistence(e) => e.to_app_error(),
            other => AppError::new(other.kind(), other.to_string()),
        }
    }

    fn log(&self) {
        match self {
            TodoError::Persistence(e) if self.kind() == ErrorKind::Persistence => {
                tracing::error!(error = %e, "Todo persistence error");
            }
            _ => {
                tracing::debug!(error = %self, "Todo request rejected");
            }
        }
    }
}

impl From<StoreError> for TodoError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { .. } => TodoError::NotFound,
            StoreError::UniqueViolation { .. } => TodoError::NameTaken,
            StoreError::Validation(message) => TodoError::Validation(message),
            other => TodoError::Persistence(other),
        }
    }
}

impl From<AppError> for TodoError {
    fn from(err: AppError) -> Self {
        TodoError::Validation(err.message().to_string())
    }
}

impl IntoResponse for TodoError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}
