//! System handlers: health and OpenAPI.

use crate::api::AppState;
use crate::error::ApiError;
use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Body of a healthy `GET /health`
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Always `ok`
    pub status: String,
    /// Crate version
    pub version: String,
    /// Tasks currently holding an admission slot
    pub active_tasks: usize,
    /// Admission ceiling
    pub max_active_tasks: usize,
    /// Per-task link ceiling
    pub max_links_per_task: usize,
}

/// GET /health - Health check
#[utoipa::path(
    get,
    path = "/health",
    tag = "system",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
        (status = 503, description = "Task store unavailable", body = ApiError)
    )
)]
pub async fn health_check(State(state): State<AppState>) -> Response {
    if let Err(e) = state.engine.ping().await {
        tracing::warn!(error = %e, "health check failed");
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ApiError::service_unavailable(e.to_string())),
        )
            .into_response();
    }

    let limits = state.engine.limits();
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        active_tasks: state.engine.active_tasks(),
        max_active_tasks: limits.max_active_tasks,
        max_links_per_task: limits.max_links_per_task,
    })
    .into_response()
}

/// GET /openapi.json - OpenAPI specification
#[utoipa::path(
    get,
    path = "/openapi.json",
    tag = "system",
    responses(
        (status = 200, description = "OpenAPI 3.1 specification in JSON format")
    )
)]
pub async fn openapi_spec() -> impl IntoResponse {
    use crate::api::openapi::ApiDoc;
    use utoipa::OpenApi;

    Json(ApiDoc::openapi())
}
