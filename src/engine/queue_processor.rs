//! Queue processor: hands queued tasks to workers.

use crate::error::{Error, Result};

use super::TaskEngine;
use super::worker::{TaskContext, run_task};

impl TaskEngine {
    /// Run the dispatcher until the engine shuts down
    ///
    /// Receives every created task from the pending-task channel and spawns a
    /// worker for it. Returns once the channel is closed by
    /// [`shutdown`](TaskEngine::shutdown) and every worker has finished.
    ///
    /// # Errors
    ///
    /// Returns an error if the dispatcher was already started.
    pub async fn start(&self) -> Result<()> {
        let mut receiver = self
            .queue_state
            .receiver
            .lock()
            .await
            .take()
            .ok_or_else(|| Error::Other("task engine already started".to_string()))?;

        // Counts as an outstanding worker so shutdown cannot finish waiting
        // while queued tasks are still being dispatched
        let dispatcher = self.queue_state.workers.token();
        tracing::info!("task dispatcher started");

        while let Some(queued) = receiver.recv().await {
            tracing::debug!(task_id = %queued.id, "dispatching task");

            let ctx = TaskContext {
                id: queued.id,
                engine: self.clone(),
                cancel_token: self.queue_state.shutdown_token.clone(),
                _permit: queued.permit,
            };
            self.queue_state.workers.spawn(run_task(ctx));
        }

        drop(dispatcher);
        self.queue_state.workers.close();
        self.queue_state.workers.wait().await;

        tracing::info!("task dispatcher stopped");
        Ok(())
    }
}
