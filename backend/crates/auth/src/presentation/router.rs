//! Auth Router

use std::sync::Arc;

use axum::middleware::from_fn_with_state;
use axum::{
    Router,
    routing::{get, post},
};
use platform::repository::Database;

use crate::application::config::AuthConfig;
use crate::domain::entity::role::ADMIN;
use crate::presentation::handlers::{self, AuthAppState};
use crate::presentation::middleware::{RoleGate, require_jwt, require_roles};

/// Public login and registration routes
pub fn auth_router<D: Database>(db: D, config: Arc<AuthConfig>) -> Router {
    let state = AuthAppState { db, config };

    Router::new()
        .route("/login", post(handlers::login::<D>))
        .route("/register", post(handlers::register::<D>))
        .with_state(state)
}

/// Member administration, restricted to admins
pub fn member_router<D: Database>(db: D, config: Arc<AuthConfig>) -> Router {
    let gate = RoleGate::new(db.clone(), &[ADMIN]);
    let state = AuthAppState {
        db,
        config: config.clone(),
    };

    Router::new()
        .route("/member", get(handlers::member_index::<D>))
        .route(
            "/member/{id}",
            get(handlers::member_show::<D>).put(handlers::member_update::<D>),
        )
        .route_layer(from_fn_with_state(gate, require_roles::<D>))
        .route_layer(from_fn_with_state(config, require_jwt))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::{Role, User};
    use crate::infra::seed::seed;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use axum::response::Response;
    use platform::repository::Link;
    use platform::repository::memory::MemoryDatabase;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    const ADMIN_PASSWORD: &str = "correct horse battery";

    async fn app() -> (Router, MemoryDatabase) {
        let db = MemoryDatabase::new();
        seed(&db, Some(ADMIN_PASSWORD)).await.unwrap();
        let config = Arc::new(AuthConfig::with_random_secret());
        let router = auth_router(db.clone(), config.clone()).merge(member_router(db.clone(), config));
        (router, db)
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn login(app: &Router, account: &str, password: &str) -> String {
        let response = app
            .clone()
            .oneshot(post_json(
                "/login",
                json!({"account": account, "password": password}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        body["data"]["token"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let (app, _db) = app().await;

        let response = app
            .clone()
            .oneshot(post_json(
                "/register",
                json!({"account": "alice", "password": "another fine passphrase"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["account"], "alice");
        assert_eq!(body["data"]["roles"][0]["name"], "Guest");
        assert!(body["data"].get("password").is_none());

        let token = login(&app, "alice", "another fine passphrase").await;
        assert!(!token.is_empty());
    }

    #[tokio::test]
    async fn test_login_failure_envelope() {
        let (app, _db) = app().await;
        let response = app
            .oneshot(post_json(
                "/login",
                json!({"account": "admin", "password": "wrong password here"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            json_body(response).await,
            json!({"success": false, "error": "incorrect password"})
        );
    }

    #[tokio::test]
    async fn test_malformed_login_body_uses_failure_envelope() {
        let (app, _db) = app().await;
        let response = app
            .oneshot(post_json("/login", json!({"account": "admin"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["success"], false);
        assert!(body["error"].as_str().unwrap().contains("missing field `password`"));
    }

    #[tokio::test]
    async fn test_member_routes_require_admin() {
        let (app, db) = app().await;
        let guest_token = {
            app.clone()
                .oneshot(post_json(
                    "/register",
                    json!({"account": "guest", "password": "another fine passphrase"}),
                ))
                .await
                .unwrap();
            login(&app, "guest", "another fine passphrase").await
        };

        let unauthenticated = app
            .clone()
            .oneshot(Request::builder().uri("/member").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(unauthenticated.status(), StatusCode::UNAUTHORIZED);

        let as_guest = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/member")
                    .header(header::AUTHORIZATION, format!("Bearer {guest_token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(as_guest.status(), StatusCode::FORBIDDEN);

        let admin_token = login(&app, "admin", ADMIN_PASSWORD).await;
        let listing = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/member?page_size=1&order=account%20asc")
                    .header(header::AUTHORIZATION, format!("Bearer {admin_token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(listing.status(), StatusCode::OK);
        let body = json_body(listing).await;
        assert_eq!(body["data"]["total"], 2);
        assert_eq!(body["data"]["page_size"], 1);
        assert_eq!(body["data"]["data"][0]["account"], "admin");

        let guest = db
            .rows::<User>()
            .into_iter()
            .find(|u| u.account == "guest")
            .unwrap();
        let member_role = db
            .rows::<Role>()
            .into_iter()
            .find(|r| r.name == "Member")
            .unwrap();
        let update = app
            .oneshot(
                Request::builder()
                    .method("PUT")
                    .uri(format!("/member/{}", guest.id))
                    .header(header::AUTHORIZATION, format!("Bearer {admin_token}"))
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(json!({"role_id": member_role.id}).to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(update.status(), StatusCode::OK);
        let body = json_body(update).await;
        assert_eq!(body["data"]["roles"][0]["name"], "Member");
        assert_eq!(db.linked(&Link::USER_ROLES, guest.id), vec![member_role.id]);
    }
}
