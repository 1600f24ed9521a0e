//! Panic recovery
//!
//! A panic inside a handler is logged with the request context and answered
//! with a generic 500 instead of tearing down the connection task.

use std::panic::AssertUnwindSafe;

use auth::middleware::ActorSlot;
use axum::Json;
use axum::extract::Request;
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use futures::FutureExt;
use kernel::error::app_error::GENERIC_SERVER_MESSAGE;
use platform::client::request_client_ip;
use serde_json::json;

pub async fn recover_panic(mut req: Request, next: Next) -> Response {
    let slot = ActorSlot::new();
    req.extensions_mut().insert(slot.clone());

    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let client_ip = request_client_ip(&req);

    match AssertUnwindSafe(next.run(req)).catch_unwind().await {
        Ok(response) => response,
        Err(panic) => {
            let message = panic
                .downcast_ref::<&str>()
                .map(|s| (*s).to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_default();

            tracing::error!(
                user_id = ?slot.get().map(|id| id.get()),
                method = %method,
                path = %path,
                client_ip = ?client_ip,
                panic = %message,
                "Recovered from panic"
            );

            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": GENERIC_SERVER_MESSAGE })),
            )
                .into_response()
        }
    }
}
