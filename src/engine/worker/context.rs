//! Worker context: shared state for one task's worker.

use tokio_util::sync::CancellationToken;

use crate::error::Result;
use crate::types::{Task, TaskId, TaskStatus};

use super::super::{AdmissionPermit, TaskEngine};

/// Everything a worker needs to drive one task
///
/// Owns the task's admission permit: the slot is released when the context
/// is dropped, whichever way the worker exits.
pub(crate) struct TaskContext {
    pub(crate) id: TaskId,
    pub(crate) engine: TaskEngine,
    pub(crate) cancel_token: CancellationToken,
    pub(crate) _permit: AdmissionPermit,
}

impl TaskContext {
    /// Maximum number of links this task may resolve
    pub(super) fn ceiling(&self) -> usize {
        self.engine.limits.max_links_per_task
    }

    /// Fresh snapshot of the task
    pub(super) async fn snapshot(&self) -> Result<Task> {
        self.engine.get_task(&self.id).await
    }

    /// Apply a change to the task and persist it
    pub(super) async fn update<T>(&self, apply: impl FnOnce(&mut Task) -> Result<T>) -> Result<T> {
        self.engine.mutate_task(&self.id, apply).await
    }

    /// Mark the task failed after an unrecoverable error
    ///
    /// Best effort: if the store itself is failing the task is left as-is.
    pub(super) async fn mark_failed(&self, reason: &str) {
        let result = self
            .update(|task| {
                if task.status == TaskStatus::Created {
                    task.transition(TaskStatus::Running)?;
                }
                task.transition(TaskStatus::Failed)
            })
            .await;

        match result {
            Ok(()) => tracing::warn!(task_id = %self.id, reason, "task failed"),
            Err(e) => tracing::error!(
                task_id = %self.id,
                reason,
                error = %e,
                "could not mark task failed"
            ),
        }
    }
}
