//! Error Kind - Classification of errors
//!
//! Defines the [`ErrorKind`] enum that maps to HTTP status codes.

use serde::Serialize;

/// エラー種別の列挙体
///
/// The service distinguishes six failure classes; each one maps to exactly
/// one HTTP status code.
///
/// | Kind          | Status |
/// |---------------|--------|
/// | `Validation`  | 400    |
/// | `Auth`        | 401    |
/// | `Authz`       | 403    |
/// | `NotFound`    | 404    |
/// | `Conflict`    | 409    |
/// | `Persistence` | 500    |
///
/// ## Examples
/// ```rust
/// use kernel::error::kind::ErrorKind;
///
/// let kind = ErrorKind::Conflict;
/// assert_eq!(kind.status_code(), 409);
/// assert_eq!(kind.reason(), "Conflict");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// Malformed input, zero ids, missing referenced rows
    Validation,
    /// Missing or invalid credentials
    Auth,
    /// Authenticated but not permitted
    Authz,
    /// Direct lookup of a missing row
    NotFound,
    /// Uniqueness violation
    Conflict,
    /// Database or programming failure
    Persistence,
}

impl ErrorKind {
    /// HTTP ステータスコードを取得
    #[inline]
    pub const fn status_code(&self) -> u16 {
        match self {
            ErrorKind::Validation => 400,
            ErrorKind::Auth => 401,
            ErrorKind::Authz => 403,
            ErrorKind::NotFound => 404,
            ErrorKind::Conflict => 409,
            ErrorKind::Persistence => 500,
        }
    }

    /// Reason phrase of the mapped status code.
    #[inline]
    pub const fn reason(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "Bad Request",
            ErrorKind::Auth => "Unauthorized",
            ErrorKind::Authz => "Forbidden",
            ErrorKind::NotFound => "Not Found",
            ErrorKind::Conflict => "Conflict",
            ErrorKind::Persistence => "Internal Server Error",
        }
    }

    /// 5xx errors carry details that must be logged, not returned.
    #[inline]
    pub const fn is_server_error(&self) -> bool {
        matches!(self, ErrorKind::Persistence)
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.reason())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_taxonomy_status_codes() {
        let table = [
            (ErrorKind::Validation, 400),
            (ErrorKind::Auth, 401),
            (ErrorKind::Authz, 403),
            (ErrorKind::NotFound, 404),
            (ErrorKind::Conflict, 409),
            (ErrorKind::Persistence, 500),
        ];
        for (kind, status) in table {
            assert_eq!(kind.status_code(), status, "{kind:?}");
            assert_eq!(kind.is_server_error(), status >= 500);
        }
    }

    #[test]
    fn test_display_uses_reason_phrase() {
        assert_eq!(ErrorKind::NotFound.to_string(), "Not Found");
        assert_eq!(ErrorKind::Authz.to_string(), "Forbidden");
    }
}
