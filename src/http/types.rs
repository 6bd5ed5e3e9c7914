use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::response::{IntoResponse, Response};
use http::StatusCode;
use serde::{Deserialize, Serialize};

use crate::domain::error::TodoError;
use crate::domain::todo::{CreateTodo, UpdateTodo};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateTodoBody {
    pub title: Option<String>,
    pub is_completed: Option<bool>,
}

impl From<CreateTodoBody> for CreateTodo {
    fn from(body: CreateTodoBody) -> Self { Self { title: body.title, is_completed: body.is_completed } }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateTodoBody {
    pub title: Option<String>,
    pub is_completed: Option<bool>,
}

impl From<UpdateTodoBody> for UpdateTodo {
    fn from(body: UpdateTodoBody) -> Self { Self { title: body.title, is_completed: body.is_completed } }
}

/// Error envelope: `{"statusCode": 404, "message": "...", "error": "Not Found"}`.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub status_code: u16,
    pub message: String,
    pub error: String,
}

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self { status: StatusCode::BAD_REQUEST, message: message.into() }
    }
}

impl From<TodoError> for ApiError {
    fn from(err: TodoError) -> Self {
        match err {
            TodoError::Validation(_) | TodoError::InvalidArgument(_) => Self::bad_request(err.to_string()),
            TodoError::NotFound(_) => Self { status: StatusCode::NOT_FOUND, message: err.to_string() },
            TodoError::Backend(source) => {
                tracing::error!(error = ?source, "repository failure");
                Self { status: StatusCode::INTERNAL_SERVER_ERROR, message: "Internal server error".into() }
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self { Self::bad_request(rejection.body_text()) }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self { Self::bad_request(rejection.body_text()) }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self { Self::bad_request(rejection.body_text()) }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_client_error() {
            tracing::debug!(status = %self.status, message = %self.message, "rejected request");
        }
        let body = ErrorBody {
            status_code: self.status.as_u16(),
            error: self.status.canonical_reason().unwrap_or("Error").to_string(),
            message: self.message,
        };
        (self.status, axum::Json(body)).into_response()
    }
}
