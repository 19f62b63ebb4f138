//! Task persistence
//!
//! The engine reads and writes tasks only through the [`TaskStore`] trait.
//! Every task handed out by a store is a detached snapshot: mutating it has
//! no effect until it is written back with [`TaskStore::update`].
//!
//! ## Submodules
//!
//! - [`memory`] - process-scoped in-memory store

use async_trait::async_trait;

use crate::error::StoreError;
use crate::types::{Task, TaskId};

pub mod memory;

pub use memory::MemoryTaskStore;

/// Result type for store operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Concurrent mapping from task id to task
///
/// Operations on a single id are linearizable. Concurrent updates of the
/// same id do not merge: the last writer wins.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Store a copy of `task`
    ///
    /// # Errors
    ///
    /// - [`StoreError::AlreadyExists`] if a task with the same id is present
    /// - [`StoreError::Closed`] after [`close`](TaskStore::close)
    async fn insert(&self, task: &Task) -> StoreResult<()>;

    /// Snapshot of the task with this id
    ///
    /// # Errors
    ///
    /// - [`StoreError::NotFound`] for an unknown id
    /// - [`StoreError::Closed`] after [`close`](TaskStore::close)
    async fn get(&self, id: &TaskId) -> StoreResult<Task>;

    /// Replace the record keyed by `task.id` with a copy of `task`
    ///
    /// # Errors
    ///
    /// - [`StoreError::NotFound`] for an unknown id
    /// - [`StoreError::Closed`] after [`close`](TaskStore::close)
    async fn update(&self, task: &Task) -> StoreResult<()>;

    /// Release resources; every later call fails with [`StoreError::Closed`]
    async fn close(&self) -> StoreResult<()>;

    /// Cheap liveness probe used by the health endpoint
    async fn ping(&self) -> StoreResult<()>;

    /// Human-readable name for logging
    fn name(&self) -> &'static str;
}
