//! Conversions into [`AppError`], and its HTTP rendering behind the `axum`
//! feature.

use super::app_error::AppError;

/// Classify a raw driver error by SQLSTATE.
///
/// <https://www.postgresql.org/docs/current/errcodes-appendix.html>
#[cfg(feature = "sqlx")]
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        let app_err = match &err {
            sqlx::Error::RowNotFound => AppError::not_found("record not found"),
            sqlx::Error::Database(db_err) => match db_err.code().as_deref() {
                Some("23505") => AppError::conflict("Duplicate key value"),
                Some("23503") => AppError::validation("Referenced record does not exist"),
                Some("23502") => AppError::validation("Required field is null"),
                _ => AppError::persistence("Database error"),
            },
            sqlx::Error::PoolTimedOut | sqlx::Error::Io(_) => {
                AppError::persistence("Database connection error")
            }
            _ => AppError::persistence("Database error"),
        };
        app_err.with_source(err)
    }
}

#[cfg(feature = "axum")]
impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        use axum::http::StatusCode;

        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if self.is_server_error() {
            tracing::error!(
                kind = %self.kind(),
                message = %self.message(),
                source = ?std::error::Error::source(&self),
                "Request failed"
            );
        }

        crate::response::failure(status, self.public_message())
    }
}
