//! Todo Router

use std::sync::Arc;

use auth::AuthConfig;
use auth::middleware::require_jwt;
use axum::middleware::from_fn_with_state;
use axum::{Router, routing::get};
use platform::repository::Database;

use crate::presentation::handlers::{self, TodoState};

/// Todo routes, all behind the bearer-token check. Mounted under `/todo`.
pub fn todo_router<D: Database>(db: D, config: Arc<AuthConfig>) -> Router {
    Router::new()
        .route(
            "/type",
            get(handlers::type_index::<D>).post(handlers::type_create::<D>),
        )
        .route(
            "/type/{id}",
            get(handlers::type_show::<D>)
                .put(handlers::type_update::<D>)
                .delete(handlers::type_delete::<D>),
        )
        .route(
            "/list",
            get(handlers::list_index::<D>).post(handlers::list_create::<D>),
        )
        .route(
            "/list/details",
            get(handlers::details_index::<D>).post(handlers::details_create::<D>),
        )
        .route(
            "/list/details/{id}",
            get(handlers::details_show::<D>)
                .put(handlers::details_update::<D>)
                .delete(handlers::details_delete::<D>),
        )
        .route(
            "/list/{id}",
            get(handlers::list_show::<D>)
                .put(handlers::list_update::<D>)
                .delete(handlers::list_delete::<D>),
        )
        .route_layer(from_fn_with_state(config, require_jwt))
        .with_state(TodoState { db })
}
