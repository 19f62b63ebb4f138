//! Shutdown coordination.

use std::sync::atomic::Ordering;

use super::TaskEngine;

impl TaskEngine {
    /// Stop accepting tasks and wait for every worker to finish
    ///
    /// Shutdown sequence:
    /// 1. Refuses new tasks
    /// 2. Signals cancellation to all workers (each stops before its next download)
    /// 3. Closes the pending-task channel
    /// 4. Waits for queued tasks to be dispatched and all workers to exit
    ///
    /// Interrupted tasks keep the progress already persisted and stay
    /// non-terminal. Calling this more than once is harmless.
    pub async fn shutdown(&self) {
        tracing::info!("Initiating task engine shutdown");

        // 1. Stop accepting new tasks
        self.queue_state.accepting_new.store(false, Ordering::SeqCst);

        // 2. Signal cancellation to every worker
        self.queue_state.shutdown_token.cancel();

        // 3. Close the pending-task channel
        if self.queue_state.sender.lock().await.take().is_some() {
            tracing::debug!("pending-task channel closed");
        }

        // 4. Wait for workers to drain
        self.queue_state.workers.close();
        tracing::debug!(
            workers = self.queue_state.workers.len(),
            "waiting for workers to exit"
        );
        self.queue_state.workers.wait().await;

        tracing::info!(
            active_tasks = self.active_tasks(),
            "Task engine shutdown complete"
        );
    }

    /// Whether [`shutdown`](TaskEngine::shutdown) has been called
    pub fn is_shutting_down(&self) -> bool {
        !self.queue_state.accepting_new.load(Ordering::SeqCst)
    }
}
