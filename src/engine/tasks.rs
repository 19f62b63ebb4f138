//! Task creation and lookup.

use std::sync::atomic::Ordering;

use crate::error::{Error, Result};
use crate::types::{Task, TaskId};

use super::{QueuedTask, TaskEngine};

impl TaskEngine {
    /// Create a task and queue it for a worker
    ///
    /// Takes an admission slot, stores an empty task in the `Created` state
    /// and hands it to the dispatcher. The slot stays held until the task's
    /// worker exits.
    ///
    /// # Errors
    ///
    /// - [`Error::TooManyTasks`] if every admission slot is taken
    /// - [`Error::ShuttingDown`] once [`shutdown`](TaskEngine::shutdown) has begun
    /// - [`Error::Store`] if the store rejects the insert
    pub async fn create_task(&self) -> Result<TaskId> {
        if !self.queue_state.accepting_new.load(Ordering::SeqCst) {
            return Err(Error::ShuttingDown);
        }

        let permit = self
            .queue_state
            .admission
            .try_acquire()
            .ok_or(Error::TooManyTasks {
                limit: self.queue_state.admission.ceiling(),
            })?;

        let sender = self
            .queue_state
            .sender
            .lock()
            .await
            .clone()
            .ok_or(Error::ShuttingDown)?;

        let id = TaskId::generate();
        // An insert failure drops the permit, releasing the slot
        self.collaborators.store.insert(&Task::new(id.clone())).await?;

        sender
            .send(QueuedTask {
                id: id.clone(),
                permit,
            })
            .await
            .map_err(|_| {
                tracing::warn!(task_id = %id, "task dispatcher is gone, task will not run");
                Error::ShuttingDown
            })?;

        tracing::info!(
            task_id = %id,
            active_tasks = self.active_tasks(),
            "task created"
        );
        Ok(id)
    }

    /// Snapshot of a task
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] for an unknown id.
    pub async fn get_task(&self, id: &TaskId) -> Result<Task> {
        Ok(self.collaborators.store.get(id).await?)
    }
}
