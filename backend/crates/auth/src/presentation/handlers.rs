//! HTTP Handlers

use std::sync::Arc;

use axum::extract::State;
use kernel::extract::{Json, Path, Query};
use kernel::order::MEMBER_ORDER_COLUMNS;
use kernel::pagination::{ListParams, Paginated};
use kernel::response::ApiResponse;
use platform::repository::Database;

use crate::application::config::AuthConfig;
use crate::application::{LoginInput, LoginUseCase, MemberService, RegisterInput, RegisterUseCase};
use crate::domain::entity::User;
use crate::error::AuthResult;
use crate::presentation::dto::{CredentialsRequest, LoginResponse, MemberUpdateRequest};
use crate::presentation::middleware::CurrentUser;

/// Shared state for auth handlers
#[derive(Clone)]
pub struct AuthAppState<D: Database> {
    pub db: D,
    pub config: Arc<AuthConfig>,
}

// ============================================================================
// Login / Register
// ============================================================================

/// POST /api/login
pub async fn login<D: Database>(
    State(state): State<AuthAppState<D>>,
    Json(req): Json<CredentialsRequest>,
) -> AuthResult<ApiResponse<LoginResponse>> {
    let issued = LoginUseCase::new(state.db.clone(), state.config.clone())
        .execute(LoginInput {
            account: req.account,
            password: req.password,
        })
        .await?;

    Ok(ApiResponse(issued.into()))
}

/// POST /api/register
pub async fn register<D: Database>(
    State(state): State<AuthAppState<D>>,
    Json(req): Json<CredentialsRequest>,
) -> AuthResult<ApiResponse<User>> {
    let user = RegisterUseCase::new(state.db.clone(), state.config.clone())
        .execute(RegisterInput {
            account: req.account,
            password: req.password,
        })
        .await?;

    Ok(ApiResponse(user))
}

// ============================================================================
// Members
// ============================================================================

/// GET /api/member
pub async fn member_index<D: Database>(
    State(state): State<AuthAppState<D>>,
    Query(params): Query<ListParams>,
) -> AuthResult<ApiResponse<Paginated<User>>> {
    let page = params.page_request()?;
    let orders = params.orders(MEMBER_ORDER_COLUMNS);

    let users = MemberService::new(state.db.clone())
        .index(params.keyword(), page, &orders)
        .await?;

    Ok(ApiResponse(users))
}

/// GET /api/member/{id}
pub async fn member_show<D: Database>(
    State(state): State<AuthAppState<D>>,
    Path(id): Path<i64>,
) -> AuthResult<ApiResponse<User>> {
    let user = MemberService::new(state.db.clone()).show(id).await?;
    Ok(ApiResponse(user))
}

/// PUT /api/member/{id}
pub async fn member_update<D: Database>(
    State(state): State<AuthAppState<D>>,
    current: CurrentUser,
    Path(id): Path<i64>,
    Json(req): Json<MemberUpdateRequest>,
) -> AuthResult<ApiResponse<User>> {
    let user = MemberService::new(state.db.clone())
        .edit(id, req.role_id, current.user_id)
        .await?;
    Ok(ApiResponse(user))
}
