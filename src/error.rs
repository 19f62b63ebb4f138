//! Error types for zipfetch
//!
//! This module provides the error taxonomy surfaced at the engine boundary:
//! - Admission and validation errors (too many tasks, too many files, bad extensions)
//! - Collaborator errors (store, downloader, archiver)
//! - HTTP status code mapping and structured JSON error bodies for the API

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;
use utoipa::ToSchema;

use crate::types::TaskStatus;

/// Result type alias for zipfetch operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for zipfetch
///
/// Each variant carries enough context to produce a useful log line and a
/// machine-readable API error code.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "max_links_per_task")
        key: Option<String>,
    },

    /// Admission refused: the number of in-flight tasks is at its ceiling
    #[error("server busy: too many active tasks (limit {limit})")]
    TooManyTasks {
        /// Configured maximum number of active tasks
        limit: usize,
    },

    /// A link batch, or the cumulative link count of a task, exceeds the ceiling
    #[error("too many files: {requested} links requested, limit per task is {limit}")]
    TooManyFiles {
        /// Configured maximum number of links per task
        limit: usize,
        /// Number of links the task would hold (or the batch size)
        requested: usize,
    },

    /// A link does not end in one of the allowed extensions
    #[error("unsupported file extension in link {link}: allowed are .pdf, .jpg, .jpeg")]
    InvalidExtension {
        /// The offending link
        link: String,
    },

    /// Malformed request body
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Task not found
    #[error("task not found: {0}")]
    NotFound(String),

    /// A status change that would move a task backwards or out of a terminal state
    #[error("task {id} cannot move from {from} to {to}")]
    InvalidTransition {
        /// The task whose transition was rejected
        id: String,
        /// Current status
        from: TaskStatus,
        /// Requested status
        to: TaskStatus,
    },

    /// Underlying task store failure
    #[error("store error: {0}")]
    Store(StoreError),

    /// Writing an archive failed
    #[error("archive error: {0}")]
    Archive(#[from] ArchiveError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Shutdown in progress - not accepting new tasks
    #[error("shutdown in progress: not accepting new tasks")]
    ShuttingDown,

    /// API server error
    #[error("API server error: {0}")]
    ApiServerError(String),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl From<StoreError> for Error {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::NotFound(id) => Error::NotFound(id),
            other => Error::Store(other),
        }
    }
}

/// Task store errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// A task with this id is already stored
    #[error("a task with id {0} already exists")]
    AlreadyExists(String),

    /// No task with this id
    #[error("no task with id {0}")]
    NotFound(String),

    /// The store has been closed
    #[error("store is closed")]
    Closed,
}

/// Errors produced while fetching a single link
///
/// Never returned to API callers: the worker records the message as the
/// link's failure reason on the task.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// The link is not an absolute http(s) URL
    #[error("invalid url {link}: {reason}")]
    InvalidUrl {
        /// The link as submitted
        link: String,
        /// Why the link was rejected
        reason: String,
    },

    /// Transport failure or non-2xx response
    #[error("failed to fetch {link}: {detail}")]
    Transport {
        /// The link being fetched
        link: String,
        /// Upstream detail (status line or transport error)
        detail: String,
    },

    /// Writing the scratch file failed
    #[error("failed to write {path}: {source}")]
    Io {
        /// Scratch file path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

/// Errors produced while assembling an archive
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// The archive directory could not be created
    #[error("failed to create archive directory {path}: {source}")]
    CreateDir {
        /// Archive directory
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The archive file could not be created
    #[error("failed to create archive {path}: {source}")]
    Create {
        /// Archive file path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Finalizing the ZIP container failed
    #[error("failed to write archive {path}: {reason}")]
    Write {
        /// Archive file path
        path: PathBuf,
        /// Reason reported by the ZIP writer
        reason: String,
    },

    /// The blocking archive job was cancelled or panicked
    #[error("archive job interrupted: {0}")]
    Interrupted(String),
}

/// API error response format
///
/// This structure is returned by API endpoints when an error occurs.
///
/// # Example JSON Response
///
/// ```json
/// {
///   "error": {
///     "code": "too_many_files",
///     "message": "too many files: 4 links requested, limit per task is 3",
///     "details": {
///       "limit": 3,
///       "requested": 4
///     }
///   }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    /// The error details
    pub error: ErrorDetail,
}

/// Detailed error information for API responses
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "not_found", "invalid_extension")
    pub code: String,

    /// Human-readable error message
    pub message: String,

    /// Optional additional context about the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// Create a new API error with code and message
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ErrorDetail {
                code: code.into(),
                message: message.into(),
                details: None,
            },
        }
    }

    /// Create a "service unavailable" error
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new("service_unavailable", message)
    }
}

/// Convert errors to HTTP status codes for API responses
pub trait ToHttpStatus {
    /// Get the HTTP status code for this error
    fn status_code(&self) -> u16;

    /// Get the machine-readable error code
    fn error_code(&self) -> &str;
}

impl ToHttpStatus for Error {
    fn status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - Client error (invalid input)
            Error::Config { .. } => 400,
            Error::TooManyFiles { .. } => 400,
            Error::InvalidExtension { .. } => 400,
            Error::InvalidRequest(_) => 400,

            // 404 Not Found
            Error::NotFound(_) => 404,

            // 409 Conflict
            Error::InvalidTransition { .. } => 409,

            // 429 Too Many Requests - admission refused
            Error::TooManyTasks { .. } => 429,

            // 503 Service Unavailable
            Error::ShuttingDown => 503,

            // 500 Internal Server Error - Server-side issues
            Error::Store(_) => 500,
            Error::Archive(_) => 500,
            Error::Io(_) => 500,
            Error::ApiServerError(_) => 500,
            Error::Other(_) => 500,
        }
    }

    fn error_code(&self) -> &str {
        match self {
            Error::Config { .. } => "config_error",
            Error::TooManyTasks { .. } => "too_many_tasks",
            Error::TooManyFiles { .. } => "too_many_files",
            Error::InvalidExtension { .. } => "invalid_extension",
            Error::InvalidRequest(_) => "invalid_request",
            Error::NotFound(_) => "not_found",
            Error::InvalidTransition { .. } => "invalid_transition",
            Error::Store(e) => match e {
                StoreError::AlreadyExists(_) => "store_conflict",
                StoreError::NotFound(_) => "not_found",
                StoreError::Closed => "store_closed",
            },
            Error::Archive(_) => "archive_error",
            Error::Io(_) => "io_error",
            Error::ShuttingDown => "shutting_down",
            Error::ApiServerError(_) => "api_server_error",
            Error::Other(_) => "internal_error",
        }
    }
}

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        let code = error.error_code().to_string();
        let message = error.to_string();

        let details = match &error {
            Error::TooManyTasks { limit } => Some(serde_json::json!({
                "limit": limit,
            })),
            Error::TooManyFiles { limit, requested } => Some(serde_json::json!({
                "limit": limit,
                "requested": requested,
            })),
            Error::InvalidExtension { link } => Some(serde_json::json!({
                "link": link,
            })),
            Error::NotFound(id) => Some(serde_json::json!({
                "task_id": id,
            })),
            _ => None,
        };

        ApiError {
            error: ErrorDetail {
                code,
                message,
                details,
            },
        }
    }
}
