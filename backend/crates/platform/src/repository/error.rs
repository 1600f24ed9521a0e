//! Repository errors

use kernel::error::app_error::AppError;
use thiserror::Error;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound { table: &'static str, id: i64 },

    #[error("{0}")]
    Validation(String),

    #[error("duplicate value violates unique constraint {constraint}")]
    UniqueViolation { constraint: String },

    #[error("referenced record does not exist ({constraint})")]
    ForeignKeyViolation { constraint: String },

    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),
}

impl StoreError {
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, StoreError::UniqueViolation { .. })
    }

    pub fn to_app_error(&self) -> AppError {
        match self {
            StoreError::NotFound { .. } => AppError::not_found(self.to_string()),
            StoreError::Validation(msg) => AppError::validation(msg.clone()),
            StoreError::UniqueViolation { .. } => AppError::conflict(self.to_string()),
            StoreError::ForeignKeyViolation { .. } => AppError::validation(self.to_string()),
            StoreError::Database(_) => AppError::persistence(self.to_string()),
        }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            let constraint = db_err.constraint().unwrap_or_default().to_string();
            if db_err.is_unique_violation() {
                return StoreError::UniqueViolation { constraint };
            }
            if db_err.is_foreign_key_violation() {
                return StoreError::ForeignKeyViolation { constraint };
            }
        }
        StoreError::Database(err)
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Database(source) => AppError::from(source),
            other => other.to_app_error(),
        }
    }
}
