//! Application state for the API server

use crate::engine::TaskEngine;

/// Shared application state accessible to all route handlers
///
/// Cloned for each request; the engine itself is a bundle of `Arc`s, so this
/// is cheap.
#[derive(Clone)]
pub struct AppState {
    /// The task engine serving every route
    pub engine: TaskEngine,
}

impl AppState {
    /// Create a new AppState
    pub fn new(engine: TaskEngine) -> Self {
        Self { engine }
    }
}
