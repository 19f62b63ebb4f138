//! Task handlers.

use crate::api::AppState;
use crate::error::Error;
use crate::types::{AddLinksRequest, CreatedTask, TaskId, TaskStatus};
use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// POST /task - Create a task
#[utoipa::path(
    post,
    path = "/task",
    tag = "tasks",
    responses(
        (status = 201, description = "Task created", body = CreatedTask),
        (status = 429, description = "Too many active tasks", body = crate::error::ApiError),
        (status = 503, description = "Server is shutting down", body = crate::error::ApiError),
        (status = 500, description = "Internal server error", body = crate::error::ApiError)
    )
)]
pub async fn create_task(State(state): State<AppState>) -> Response {
    match state.engine.create_task().await {
        Ok(id) => (
            StatusCode::CREATED,
            Json(CreatedTask {
                id,
                status: TaskStatus::Created,
            }),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

/// PATCH /task/:id - Attach links to a task
///
/// The body is decoded regardless of its Content-Type; anything that is not
/// `{"links": [string, ...]}` is rejected as an invalid request.
#[utoipa::path(
    patch,
    path = "/task/{id}",
    tag = "tasks",
    params(
        ("id" = String, Path, description = "Task ID")
    ),
    request_body = AddLinksRequest,
    responses(
        (status = 200, description = "Links attached"),
        (status = 400, description = "Malformed body, too many files or unsupported extension", body = crate::error::ApiError),
        (status = 404, description = "Task not found", body = crate::error::ApiError),
        (status = 500, description = "Internal server error", body = crate::error::ApiError)
    )
)]
pub async fn add_links(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Response {
    let request: AddLinksRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => return Error::InvalidRequest(e.to_string()).into_response(),
    };

    match state.engine.add_links(&TaskId::from(id), request.links).await {
        Ok(()) => StatusCode::OK.into_response(),
        Err(e) => e.into_response(),
    }
}

/// GET /task/:id - Get a task's status
#[utoipa::path(
    get,
    path = "/task/{id}",
    tag = "tasks",
    params(
        ("id" = String, Path, description = "Task ID")
    ),
    responses(
        (status = 200, description = "Task status", body = crate::types::TaskView),
        (status = 404, description = "Task not found", body = crate::error::ApiError),
        (status = 500, description = "Internal server error", body = crate::error::ApiError)
    )
)]
pub async fn get_task(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match state.engine.get_task(&TaskId::from(id)).await {
        Ok(task) => (StatusCode::OK, Json(task.view())).into_response(),
        Err(e) => e.into_response(),
    }
}
