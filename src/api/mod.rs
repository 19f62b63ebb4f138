//! REST API server module
//!
//! Exposes the task engine over HTTP: create a task, attach links to it and
//! poll its status, plus health and OpenAPI endpoints.

use crate::engine::TaskEngine;
use crate::{Config, Result};
use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;

pub mod error_response;
pub mod openapi;
pub mod routes;
pub mod state;

pub use openapi::ApiDoc;
pub use state::AppState;

/// Create the API router with all route definitions
///
/// # Routes
///
/// ## Tasks
/// - `POST /task` - Create a task
/// - `PATCH /task/:id` - Attach links to a task
/// - `GET /task/:id` - Get task status
///
/// ## System
/// - `GET /health` - Health check
/// - `GET /openapi.json` - OpenAPI specification
pub fn create_router(engine: TaskEngine) -> Router {
    let state = AppState::new(engine);

    Router::new()
        // Tasks
        .route("/task", post(routes::create_task))
        .route("/task/:id", get(routes::get_task).patch(routes::add_links))
        // System
        .route("/health", get(routes::health_check))
        .route("/openapi.json", get(routes::openapi_spec))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Start the API server on the configured address.
///
/// Binds `config.server.address` and serves until `shutdown` is cancelled;
/// see [`serve_api`] for the drain behaviour.
///
/// # Example
///
/// ```no_run
/// use zipfetch::{Config, TaskEngine};
/// use std::sync::Arc;
/// use tokio_util::sync::CancellationToken;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = Arc::new(Config::default());
/// let engine = TaskEngine::from_config(&config)?;
///
/// // Blocks until the token is cancelled
/// zipfetch::api::start_api_server(engine, config, CancellationToken::new()).await?;
/// # Ok(())
/// # }
/// ```
pub async fn start_api_server(
    engine: TaskEngine,
    config: Arc<Config>,
    shutdown: CancellationToken,
) -> Result<()> {
    let address = &config.server.address;

    tracing::info!(address = %address, "Starting API server");

    let listener = TcpListener::bind(address.as_str())
        .await
        .map_err(crate::error::Error::Io)?;

    match listener.local_addr() {
        Ok(local) => tracing::info!(address = %local, "API server listening"),
        Err(e) => tracing::debug!(error = %e, "could not read listener address"),
    }

    serve_api(listener, engine, config.server.shutdown_timeout, shutdown).await
}

/// Serve the API on an already bound listener
///
/// Once `shutdown` is cancelled the listener stops accepting and in-flight
/// requests get `shutdown_timeout` to finish; whatever is still running
/// after that is dropped.
pub async fn serve_api(
    listener: TcpListener,
    engine: TaskEngine,
    shutdown_timeout: Duration,
    shutdown: CancellationToken,
) -> Result<()> {
    let app = create_router(engine);

    let signal = shutdown.clone();
    let server = axum::serve(listener, app)
        .with_graceful_shutdown(async move { signal.cancelled_owned().await })
        .into_future();
    let mut server = std::pin::pin!(server);

    tokio::select! {
        result = &mut server => {
            result.map_err(|e| crate::error::Error::ApiServerError(e.to_string()))?;
            tracing::info!("API server stopped");
            return Ok(());
        }
        _ = shutdown.cancelled() => {}
    }

    match tokio::time::timeout(shutdown_timeout, server).await {
        Ok(result) => {
            result.map_err(|e| crate::error::Error::ApiServerError(e.to_string()))?;
            tracing::info!("API server stopped");
        }
        Err(_) => {
            tracing::warn!(
                timeout_secs = shutdown_timeout.as_secs_f64(),
                "in-flight requests did not finish before the shutdown timeout"
            );
        }
    }

    Ok(())
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;
