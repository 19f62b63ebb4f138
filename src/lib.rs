//! # zipfetch
//!
//! HTTP service that bundles remote PDF and JPEG files into ZIP archives.
//!
//! A client creates a task, attaches up to `max_links_per_task` links to it
//! and polls it. Once `max_links_per_task` links have been resolved the
//! downloaded files are packed into one archive whose path appears on the
//! task; a task holding fewer links keeps waiting for more. At most
//! `max_active_tasks` tasks are in flight at once.
//!
//! ## Quick Start
//!
//! ```no_run
//! use zipfetch::{Config, TaskEngine};
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Arc::new(Config::default());
//!     let engine = TaskEngine::from_config(&config)?;
//!
//!     // Dispatch admitted tasks onto workers
//!     let dispatcher = tokio::spawn({
//!         let engine = engine.clone();
//!         async move { engine.start().await }
//!     });
//!
//!     let shutdown = CancellationToken::new();
//!     zipfetch::api::start_api_server(engine.clone(), config, shutdown).await?;
//!
//!     engine.shutdown().await;
//!     dispatcher.await??;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// REST API module
pub mod api;
/// ZIP archive assembly
pub mod archive;
/// Command line interface
pub mod cli;
/// Configuration types
pub mod config;
/// Link fetching
pub mod downloader;
/// Task lifecycle engine (decomposed into focused submodules)
pub mod engine;
/// Error types
pub mod error;
/// Tracing subscriber setup
pub mod logging;
/// Task persistence
pub mod store;
/// Core domain types
pub mod types;
/// Utility functions
pub mod utils;

// Re-export commonly used types
pub use archive::{Archiver, ZipArchiver};
pub use cli::Cli;
pub use config::{Config, Environment, ServerConfig, TaskLimits};
pub use downloader::{Downloader, HttpDownloader};
pub use engine::TaskEngine;
pub use error::{
    ApiError, ArchiveError, DownloadError, Error, ErrorDetail, Result, StoreError, ToHttpStatus,
};
pub use store::{MemoryTaskStore, TaskStore};
pub use types::{LinkOutcome, Task, TaskId, TaskStatus, TaskView};

/// Wait for a termination signal.
///
/// - **Unix:** listens for SIGTERM and SIGINT, with fallbacks if signal registration fails.
/// - **Windows/other:** listens for Ctrl+C via `tokio::signal::ctrl_c()`.
#[cfg(unix)]
pub async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    // Set up signal handlers - these may fail in restricted environments (containers, tests)
    let sigterm_result = signal(SignalKind::terminate());
    let sigint_result = signal(SignalKind::interrupt());

    match (sigterm_result, sigint_result) {
        (Ok(mut sigterm), Ok(mut sigint)) => {
            tokio::select! {
                _ = sigterm.recv() => {
                    tracing::info!("Received SIGTERM signal");
                }
                _ = sigint.recv() => {
                    tracing::info!("Received SIGINT signal (Ctrl+C)");
                }
            }
        }
        (Err(e), _) => {
            tracing::warn!(error = %e, "Could not register SIGTERM handler, waiting for SIGINT only");
            if let Ok(mut sigint) = signal(SignalKind::interrupt()) {
                sigint.recv().await;
                tracing::info!("Received SIGINT signal (Ctrl+C)");
            } else {
                tracing::error!("Could not register any signal handlers, using ctrl_c fallback");
                tokio::signal::ctrl_c().await.ok();
            }
        }
        (_, Err(e)) => {
            tracing::warn!(error = %e, "Could not register SIGINT handler, waiting for SIGTERM only");
            if let Ok(mut sigterm) = signal(SignalKind::terminate()) {
                sigterm.recv().await;
                tracing::info!("Received SIGTERM signal");
            } else {
                tracing::error!("Could not register any signal handlers, using ctrl_c fallback");
                tokio::signal::ctrl_c().await.ok();
            }
        }
    }
}

/// Wait for Ctrl+C.
#[cfg(not(unix))]
pub async fn wait_for_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            tracing::info!("Received Ctrl+C signal");
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C signal");
        }
    }
}
