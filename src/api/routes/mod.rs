//! Route handlers for the HTTP API
//!
//! Handlers are organized by domain:
//! - [`tasks`] - Task creation, link attachment, status polling
//! - [`system`] - Health and OpenAPI

mod system;
mod tasks;

// Re-export all handlers so `routes::function_name` continues to work
pub use system::*;
pub use tasks::*;
