//! OpenAPI documentation and schema generation
//!
//! This module defines the OpenAPI specification for the zipfetch HTTP API
//! using utoipa for compile-time spec generation.

use utoipa::OpenApi;

/// OpenAPI documentation for the zipfetch HTTP API
///
/// Served as JSON at `/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "zipfetch HTTP API",
        version = "0.1.0",
        description = "Create bundling tasks, attach PDF/JPEG links and poll for the resulting ZIP archive",
        license(
            name = "MIT OR Apache-2.0"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server")
    ),
    paths(
        // Tasks
        crate::api::routes::create_task,
        crate::api::routes::add_links,
        crate::api::routes::get_task,

        // System
        crate::api::routes::health_check,
        crate::api::routes::openapi_spec,
    ),
    components(schemas(
        // Core types from types.rs
        crate::types::TaskStatus,
        crate::types::TaskView,
        crate::types::CreatedTask,
        crate::types::AddLinksRequest,

        // Route response types
        crate::api::routes::HealthResponse,

        // Error types from error.rs
        crate::error::ApiError,
        crate::error::ErrorDetail,
    )),
    tags(
        (name = "tasks", description = "Bundling tasks - create, attach links, poll status"),
        (name = "system", description = "System endpoints - Health checks, OpenAPI spec"),
    )
)]
pub struct ApiDoc;
