use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::{routing::get, Json, Router};
use http::StatusCode;

use crate::application::todo_service::TodoService;
use crate::domain::query::{RawTodoQuery, TodoQuery};
use crate::domain::todo::{Todo, TodoId};
use crate::http::types::{ApiError, CreateTodoBody, UpdateTodoBody};

#[derive(Clone)]
pub struct AppState<S: TodoService> { pub service: S }

pub fn router<S: TodoService + Clone + Send + Sync + 'static>(state: AppState<S>) -> Router {
    Router::new()
        .route("/todos", get(list_todos::<S>).post(create_todo::<S>))
        .route("/todos/:id", get(get_todo::<S>).patch(update_todo::<S>).delete(delete_todo::<S>))
        .with_state(state)
}

async fn list_todos<S: TodoService>(
    State(state): State<AppState<S>>,
    query: Result<Query<RawTodoQuery>, QueryRejection>,
) -> Result<Json<Vec<Todo>>, ApiError> {
    let Query(raw) = query?;
    let query = TodoQuery::try_from(raw)?;
    Ok(Json(state.service.list(query).await?))
}

async fn get_todo<S: TodoService>(
    State(state): State<AppState<S>>,
    id: Result<Path<String>, PathRejection>,
) -> Result<Json<Todo>, ApiError> {
    let id = parse_id(id?)?;
    Ok(Json(state.service.get(id).await?))
}

async fn create_todo<S: TodoService>(
    State(state): State<AppState<S>>,
    payload: Result<Json<CreateTodoBody>, JsonRejection>,
) -> Result<(StatusCode, Json<Todo>), ApiError> {
    let Json(body) = payload?;
    let todo = state.service.create(body.into()).await?;
    Ok((StatusCode::CREATED, Json(todo)))
}

async fn update_todo<S: TodoService>(
    State(state): State<AppState<S>>,
    id: Result<Path<String>, PathRejection>,
    payload: Result<Json<UpdateTodoBody>, JsonRejection>,
) -> Result<Json<Todo>, ApiError> {
    let id = parse_id(id?)?;
    let Json(body) = payload?;
    Ok(Json(state.service.update(id, body.into()).await?))
}

async fn delete_todo<S: TodoService>(
    State(state): State<AppState<S>>,
    id: Result<Path<String>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(id?)?;
    state.service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Only checks the shape; the service decides whether the number is a usable id.
fn parse_id(Path(raw): Path<String>) -> Result<TodoId, ApiError> {
    raw.parse::<i64>()
        .map(TodoId)
        .map_err(|_| ApiError::bad_request("Validation failed (numeric string is expected)"))
}
