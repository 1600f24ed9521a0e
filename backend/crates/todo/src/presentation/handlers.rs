//! HTTP Handlers
//!
//! Thin adapters: extract, call the service with the caller's id, wrap the
//! result in the success envelope.

use axum::extract::State;
use auth::middleware::CurrentUser;
use kernel::extract::{Json, Path, Query};
use kernel::order::TODO_ORDER_COLUMNS;
use kernel::pagination::{ListParams, Paginated};
use kernel::response::ApiResponse;
use platform::repository::Database;

use crate::application::{TodoListDetailsService, TodoListService, TodoTypeService};
use crate::domain::{TodoList, TodoListDetails, TodoType};
use crate::error::TodoResult;
use crate::presentation::dto::{
    DetailsCreateRequest, DetailsFilter, DetailsUpdateRequest, TodoListRequest, TodoTypeRequest,
};

#[derive(Clone)]
pub struct TodoState<D: Database> {
    pub db: D,
}

// ============================================================================
// Todo types
// ============================================================================

/// GET /api/todo/type
pub async fn type_index<D: Database>(
    State(state): State<TodoState<D>>,
    Query(params): Query<ListParams>,
) -> TodoResult<ApiResponse<Paginated<TodoType>>> {
    let page = params.page_request()?;
    let orders = params.orders(TODO_ORDER_COLUMNS);
    let types = TodoTypeService::new(state.db)
        .index(params.keyword(), page, &orders)
        .await?;
    Ok(ApiResponse(types))
}

/// POST /api/todo/type
pub async fn type_create<D: Database>(
    State(state): State<TodoState<D>>,
    current: CurrentUser,
    Json(req): Json<TodoTypeRequest>,
) -> TodoResult<ApiResponse<TodoType>> {
    let todo_type = TodoTypeService::new(state.db)
        .create(&req.name, current.user_id)
        .await?;
    Ok(ApiResponse(todo_type))
}

/// GET /api/todo/type/{id}
pub async fn type_show<D: Database>(
    State(state): State<TodoState<D>>,
    Path(id): Path<i64>,
) -> TodoResult<ApiResponse<TodoType>> {
    Ok(ApiResponse(TodoTypeService::new(state.db).show(id).await?))
}

/// PUT /api/todo/type/{id}
pub async fn type_update<D: Database>(
    State(state): State<TodoState<D>>,
    current: CurrentUser,
    Path(id): Path<i64>,
    Json(req): Json<TodoTypeRequest>,
) -> TodoResult<ApiResponse<TodoType>> {
    let todo_type = TodoTypeService::new(state.db)
        .edit(id, &req.name, current.user_id)
        .await?;
    Ok(ApiResponse(todo_type))
}

/// DELETE /api/todo/type/{id}
pub async fn type_delete<D: Database>(
    State(state): State<TodoState<D>>,
    current: CurrentUser,
    Path(id): Path<i64>,
) -> TodoResult<ApiResponse<TodoType>> {
    let todo_type = TodoTypeService::new(state.db)
        .delete(id, current.user_id)
        .await?;
    Ok(ApiResponse(todo_type))
}

// ============================================================================
// Todo lists
// ============================================================================

/// GET /api/todo/list
pub async fn list_index<D: Database>(
    State(state): State<TodoState<D>>,
    Query(params): Query<ListParams>,
) -> TodoResult<ApiResponse<Paginated<TodoList>>> {
    let page = params.page_request()?;
    let orders = params.orders(TODO_ORDER_COLUMNS);
    let lists = TodoListService::new(state.db)
        .index(params.keyword(), page, &orders)
        .await?;
    Ok(ApiResponse(lists))
}

/// POST /api/todo/list
pub async fn list_create<D: Database>(
    State(state): State<TodoState<D>>,
    current: CurrentUser,
    Json(req): Json<TodoListRequest>,
) -> TodoResult<ApiResponse<TodoList>> {
    let list = TodoListService::new(state.db)
        .create(req.type_id, &req.name, current.user_id)
        .await?;
    Ok(ApiResponse(list))
}

/// GET /api/todo/list/{id}
pub async fn list_show<D: Database>(
    State(state): State<TodoState<D>>,
    Path(id): Path<i64>,
) -> TodoResult<ApiResponse<TodoList>> {
    Ok(ApiResponse(TodoListService::new(state.db).show(id).await?))
}

/// PUT /api/todo/list/{id}
pub async fn list_update<D: Database>(
    State(state): State<TodoState<D>>,
    current: CurrentUser,
    Path(id): Path<i64>,
    Json(req): Json<TodoListRequest>,
) -> TodoResult<ApiResponse<TodoList>> {
    let list = TodoListService::new(state.db)
        .edit(id, req.type_id, &req.name, current.user_id)
        .await?;
    Ok(ApiResponse(list))
}

/// DELETE /api/todo/list/{id}
pub async fn list_delete<D: Database>(
    State(state): State<TodoState<D>>,
    current: CurrentUser,
    Path(id): Path<i64>,
) -> TodoResult<ApiResponse<TodoList>> {
    let list = TodoListService::new(state.db)
        .delete(id, current.user_id)
        .await?;
    Ok(ApiResponse(list))
}

// ============================================================================
// Todo list details
// ============================================================================

/// GET /api/todo/list/details
pub async fn details_index<D: Database>(
    State(state): State<TodoState<D>>,
    Query(params): Query<ListParams>,
    Query(filter): Query<DetailsFilter>,
) -> TodoResult<ApiResponse<Paginated<TodoListDetails>>> {
    let page = params.page_request()?;
    let orders = params.orders(TODO_ORDER_COLUMNS);
    let details = TodoListDetailsService::new(state.db)
        .index(filter.to_do_list_id, params.keyword(), page, &orders)
        .await?;
    Ok(ApiResponse(details))
}

/// POST /api/todo/list/details
pub async fn details_create<D: Database>(
    State(state): State<TodoState<D>>,
    current: CurrentUser,
    Json(req): Json<DetailsCreateRequest>,
) -> TodoResult<ApiResponse<TodoListDetails>> {
    let details = TodoListDetailsService::new(state.db)
        .create(req.into(), current.user_id)
        .await?;
    Ok(ApiResponse(details))
}

/// GET /api/todo/list/details/{id}
pub async fn details_show<D: Database>(
    State(state): State<TodoState<D>>,
    Path(id): Path<i64>,
) -> TodoResult<ApiResponse<TodoListDetails>> {
    Ok(ApiResponse(TodoListDetailsService::new(state.db).show(id).await?))
}

/// PUT /api/todo/list/details/{id}
pub async fn details_update<D: Database>(
    State(state): State<TodoState<D>>,
    current: CurrentUser,
    Path(id): Path<i64>,
    Json(req): Json<DetailsUpdateRequest>,
) -> TodoResult<ApiResponse<TodoListDetails>> {
    let details = TodoListDetailsService::new(state.db)
        .edit(id, &req.name, &req.detail, current.user_id)
        .await?;
    Ok(ApiResponse(details))
}

/// DELETE /api/todo/list/details/{id}
pub async fn details_delete<D: Database>(
    State(state): State<TodoState<D>>,
    current: CurrentUser,
    Path(id): Path<i64>,
) -> TodoResult<ApiResponse<TodoListDetails>> {
    let details = TodoListDetailsService::new(state.db)
        .delete(id, current.user_id)
        .await?;
    Ok(ApiResponse(details))
}
