//! Todo CRUD handlers.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};

use super::{err, ApiError, ApiResult, AppState};
use crate::store::{NewTodo, StoreError, Todo, TodoPatch};

fn store_error(state: &AppState, e: StoreError) -> (StatusCode, Json<ApiError>) {
    match e {
        StoreError::NotFound { .. } => err(StatusCode::NOT_FOUND, e.to_string()),
        StoreError::Invalid(_) => err(StatusCode::UNPROCESSABLE_ENTITY, e.to_string()),
        StoreError::Database(_) => {
            state.sink.error(&e, Some("todos"), "database query");
            err(StatusCode::INTERNAL_SERVER_ERROR, "database error")
        }
    }
}

fn body_error(rejection: JsonRejection) -> (StatusCode, Json<ApiError>) {
    err(StatusCode::UNPROCESSABLE_ENTITY, rejection.body_text())
}

/// List all todos
pub async fn list_todos(State(state): State<AppState>) -> ApiResult<Vec<Todo>> {
    state
        .store
        .list()
        .await
        .map(Json)
        .map_err(|e| store_error(&state, e))
}

/// Create a todo
pub async fn create_todo(
    State(state): State<AppState>,
    body: Result<Json<NewTodo>, JsonRejection>,
) -> Result<(StatusCode, Json<Todo>), (StatusCode, Json<ApiError>)> {
    let Json(new) = body.map_err(body_error)?;
    let todo = state
        .store
        .create(new)
        .await
        .map_err(|e| store_error(&state, e))?;
    tracing::info!(id = todo.id, "created todo");
    Ok((StatusCode::CREATED, Json(todo)))
}

/// Get a todo by id
pub async fn get_todo(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Todo> {
    state
        .store
        .get(id)
        .await
        .map(Json)
        .map_err(|e| store_error(&state, e))
}

/// Update some fields of a todo
pub async fn update_todo(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    body: Result<Json<TodoPatch>, JsonRejection>,
) -> ApiResult<Todo> {
    let Json(patch) = body.map_err(body_error)?;
    state
        .store
        .update(id, patch)
        .await
        .map(Json)
        .map_err(|e| store_error(&state, e))
}

/// Delete a todo
pub async fn delete_todo(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, (StatusCode, Json<ApiError>)> {
    state
        .store
        .delete(id)
        .await
        .map_err(|e| store_error(&state, e))?;
    tracing::info!(id, "deleted todo");
    Ok(StatusCode::NO_CONTENT)
}
