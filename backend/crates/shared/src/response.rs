//! JSON response envelope
//!
//! Success: `{"success": true, "data": ...}`.
//! Failure: `{"success": false, "error": "..."}`.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// Wraps a payload in the success envelope with status 200.
#[derive(Debug, Clone)]
pub struct ApiResponse<T>(pub T);

#[derive(Serialize)]
struct SuccessBody<T> {
    success: bool,
    data: T,
}

#[derive(Serialize)]
struct FailureBody<'a> {
    success: bool,
    error: &'a str,
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (
            StatusCode::OK,
            Json(SuccessBody {
                success: true,
                data: self.0,
            }),
        )
            .into_response()
    }
}

/// Failure envelope with an explicit status.
pub fn failure(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(FailureBody {
            success: false,
            error: message,
        }),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::app_error::AppError;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_success_envelope() {
        let response = ApiResponse(serde_json::json!({"id": 1})).into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            serde_json::json!({"success": true, "data": {"id": 1}})
        );
    }

    #[tokio::test]
    async fn test_app_error_envelope() {
        let response = AppError::conflict("名稱已存在").into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert_eq!(
            body_json(response).await,
            serde_json::json!({"success": false, "error": "名稱已存在"})
        );
    }

    #[tokio::test]
    async fn test_server_error_is_generic() {
        let response = AppError::persistence("connection reset by peer").into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(response).await,
            serde_json::json!({"success": false, "error": "Internal Server Error"})
        );
    }
}
