//! Auth Middleware
//!
//! `require_jwt` authenticates bearer tokens and attaches [`CurrentUser`];
//! `require_roles` then admits only users holding one of the allowed roles.
//! Both answer rejections with `{"error": message}`.

use std::net::IpAddr;
use std::sync::{Arc, OnceLock};

use axum::Json;
use axum::extract::{FromRequestParts, Request, State};
use axum::http::request::Parts;
use axum::http::{HeaderMap, StatusCode, header::AUTHORIZATION};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use kernel::error::app_error::GENERIC_SERVER_MESSAGE;
use kernel::id::UserId;
use platform::client::request_client_ip;
use platform::repository::{Database, FindOptions, StoreError};
use serde_json::json;

use crate::application::config::AuthConfig;
use crate::domain::entity::User;
use crate::domain::repository::USERS;

const MISSING_HEADER: &str = "Authorization header is required";
const BAD_FORMAT: &str = "Authorization header format must be Bearer {token}";

/// Authenticated caller, set by [`require_jwt`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentUser {
    pub user_id: UserId,
}

impl<S: Send + Sync> FromRequestParts<S> for CurrentUser {
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .copied()
            .ok_or_else(|| error_body(StatusCode::UNAUTHORIZED, "unauthorized"))
    }
}

/// Request-scoped slot the outer layers read the acting user from.
///
/// Whoever installs it keeps a clone; [`require_jwt`] fills it once the
/// token checks out.
#[derive(Debug, Clone, Default)]
pub struct ActorSlot(Arc<OnceLock<UserId>>);

impl ActorSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, user_id: UserId) {
        let _ = self.0.set(user_id);
    }

    pub fn get(&self) -> Option<UserId> {
        self.0.get().copied()
    }
}

/// Middleware that requires a valid bearer token
pub async fn require_jwt(
    State(config): State<Arc<AuthConfig>>,
    mut req: Request,
    next: Next,
) -> Response {
    let client_ip = request_client_ip(&req);

    let verified = bearer_token(req.headers()).and_then(|token| {
        config
            .token_signer
            .verify(token)
            .and_then(|claims| claims.user_id())
            .map_err(|e| format!("Invalid token: {e}"))
    });

    let user_id = match verified {
        Ok(id) => UserId::new(id),
        Err(message) => {
            tracing::warn!(
                method = %req.method(),
                path = %req.uri().path(),
                client_ip = ?client_ip,
                reason = %message,
                "Rejected unauthenticated request"
            );
            return error_body(StatusCode::UNAUTHORIZED, &message);
        }
    };

    if let Some(slot) = req.extensions().get::<ActorSlot>() {
        slot.record(user_id);
    }
    req.extensions_mut().insert(CurrentUser { user_id });

    tracing::info!(
        user_id = %user_id,
        method = %req.method(),
        path = %req.uri().path(),
        client_ip = ?client_ip,
        "Authenticated request"
    );

    next.run(req).await
}

fn bearer_token(headers: &HeaderMap) -> Result<&str, String> {
    let value = headers
        .get(AUTHORIZATION)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| MISSING_HEADER.to_string())?;
    let value = value.to_str().map_err(|_| BAD_FORMAT.to_string())?;

    match value.split_once(' ') {
        Some(("Bearer", token)) => Ok(token),
        _ => Err(BAD_FORMAT.to_string()),
    }
}

/// Role gate state: the allowed role names, matched case-insensitively
#[derive(Clone)]
pub struct RoleGate<D> {
    db: D,
    allowed: Arc<[String]>,
}

impl<D: Database> RoleGate<D> {
    pub fn new(db: D, allowed: &[&str]) -> Self {
        Self {
            db,
            allowed: allowed.iter().map(|name| name.to_string()).collect(),
        }
    }

    async fn load_user(&self, user_id: UserId) -> Result<Option<User>, StoreError> {
        let mut session = self.db.begin().await?;
        let options = FindOptions::new().preload("Roles");
        match USERS
            .find_by_id(&mut session, user_id.get(), Some(&options))
            .await
        {
            Ok(user) => Ok(Some(user)),
            Err(StoreError::NotFound { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

/// Middleware that requires one of the gate's roles. Runs after [`require_jwt`].
pub async fn require_roles<D: Database>(
    State(gate): State<RoleGate<D>>,
    req: Request,
    next: Next,
) -> Response {
    let Some(current) = req.extensions().get::<CurrentUser>().copied() else {
        return forbidden(&req, None, "unauthorized");
    };

    match gate.load_user(current.user_id).await {
        Ok(Some(user)) if user.has_any_role(&gate.allowed[..]) => next.run(req).await,
        Ok(Some(_)) => forbidden(&req, Some(current.user_id), "insufficient permissions"),
        Ok(None) => forbidden(&req, Some(current.user_id), "user not found"),
        Err(e) => {
            tracing::error!(error = %e, user_id = %current.user_id, "Role lookup failed");
            error_body(StatusCode::INTERNAL_SERVER_ERROR, GENERIC_SERVER_MESSAGE)
        }
    }
}

fn forbidden(req: &Request, user_id: Option<UserId>, message: &str) -> Response {
    let client_ip: Option<IpAddr> = request_client_ip(req);
    tracing::warn!(
        user_id = ?user_id.map(|id| id.get()),
        method = %req.method(),
        path = %req.uri().path(),
        client_ip = ?client_ip,
        reason = message,
        "Rejected by role gate"
    );
    error_body(StatusCode::FORBIDDEN, message)
}

fn error_body(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::Role;
    use axum::Router;
    use axum::body::Body;
    use axum::middleware::from_fn_with_state;
    use axum::routing::get;
    use chrono::Duration;
    use platform::password::ClearTextPassword;
    use platform::repository::memory::MemoryDatabase;
    use platform::repository::{Link, Session};
    use platform::token::TokenSigner;
    use tower::ServiceExt;

    const SECRET: &[u8] = b"middleware-test-secret";

    async fn whoami(current: CurrentUser) -> String {
        current.user_id.to_string()
    }

    fn jwt_app(config: Arc<AuthConfig>) -> Router {
        Router::new()
            .route("/me", get(whoami))
            .route_layer(from_fn_with_state(config, require_jwt))
    }

    fn gated_app(db: MemoryDatabase, allowed: &[&str]) -> Router {
        let config = Arc::new(AuthConfig::new(SECRET));
        Router::new()
            .route("/me", get(whoami))
            .route_layer(from_fn_with_state(
                RoleGate::new(db, allowed),
                require_roles::<MemoryDatabase>,
            ))
            .route_layer(from_fn_with_state(config, require_jwt))
    }

    fn get_me(authorization: Option<&str>) -> Request {
        let mut builder = Request::builder().uri("/me");
        if let Some(value) = authorization {
            builder = builder.header(AUTHORIZATION, value);
        }
        builder.body(Body::empty()).unwrap()
    }

    fn bearer(user_id: i64) -> String {
        let token = AuthConfig::new(SECRET).token_signer.issue(user_id).unwrap();
        format!("Bearer {}", token.token)
    }

    async fn error_message(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        json["error"].as_str().unwrap().to_string()
    }

    async fn user_with_role(db: &MemoryDatabase, role: &str) -> User {
        let role = db.seed(Role::new(role, "")).await.unwrap();
        let hashed = ClearTextPassword::new("correct horse battery".into())
            .unwrap()
            .hash()
            .unwrap();
        let user = db.seed(User::new("someone", hashed)).await.unwrap();
        let mut session = db.begin().await.unwrap();
        session
            .replace_links(&Link::USER_ROLES, user.id, &[role.id])
            .await
            .unwrap();
        session.commit().await.unwrap();
        user
    }

    #[tokio::test]
    async fn test_missing_header() {
        let app = jwt_app(Arc::new(AuthConfig::new(SECRET)));
        let response = app.oneshot(get_me(None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(error_message(response).await, MISSING_HEADER);
    }

    #[tokio::test]
    async fn test_wrong_scheme() {
        let app = jwt_app(Arc::new(AuthConfig::new(SECRET)));
        for value in ["Token abc", "Bearer", "bearer abc"] {
            let response = app.clone().oneshot(get_me(Some(value))).await.unwrap();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
            assert_eq!(error_message(response).await, BAD_FORMAT);
        }
    }

    #[tokio::test]
    async fn test_invalid_and_expired_tokens() {
        let app = jwt_app(Arc::new(AuthConfig::new(SECRET)));

        let response = app
            .clone()
            .oneshot(get_me(Some("Bearer not.a.jwt")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(error_message(response).await.starts_with("Invalid token: "));

        let expired = TokenSigner::new(SECRET, Duration::seconds(-60))
            .issue(5)
            .unwrap();
        let response = app
            .clone()
            .oneshot(get_me(Some(format!("Bearer {}", expired.token).as_str())))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(error_message(response).await.starts_with("Invalid token: "));

        let foreign = AuthConfig::with_random_secret()
            .token_signer
            .issue(5)
            .unwrap();
        let response = app
            .oneshot(get_me(Some(format!("Bearer {}", foreign.token).as_str())))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_valid_token_sets_identity_and_slot() {
        let app = jwt_app(Arc::new(AuthConfig::new(SECRET)));
        let slot = ActorSlot::new();
        let mut req = get_me(Some(bearer(42).as_str()));
        req.extensions_mut().insert(slot.clone());

        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"42");
        assert_eq!(slot.get(), Some(UserId::new(42)));
    }

    #[tokio::test]
    async fn test_role_gate_admits_matching_role_case_insensitively() {
        let db = MemoryDatabase::new();
        let user = user_with_role(&db, "Admin").await;

        let response = gated_app(db, &["admin"])
            .oneshot(get_me(Some(bearer(user.id).as_str())))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_role_gate_rejects_other_roles() {
        let db = MemoryDatabase::new();
        let user = user_with_role(&db, "Guest").await;

        let response = gated_app(db, &["Admin"])
            .oneshot(get_me(Some(bearer(user.id).as_str())))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(error_message(response).await, "insufficient permissions");
    }

    #[tokio::test]
    async fn test_role_gate_unknown_user() {
        let response = gated_app(MemoryDatabase::new(), &["Admin"])
            .oneshot(get_me(Some(bearer(777).as_str())))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(error_message(response).await, "user not found");
    }

    #[tokio::test]
    async fn test_role_gate_without_identity() {
        let app = Router::new().route("/me", get(|| async { "ok" })).route_layer(
            from_fn_with_state(
                RoleGate::new(MemoryDatabase::new(), &["Admin"]),
                require_roles::<MemoryDatabase>,
            ),
        );
        let response = app.oneshot(get_me(None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(error_message(response).await, "unauthorized");
    }
}
