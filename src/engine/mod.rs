//! Task lifecycle engine split into focused submodules.
//!
//! The `TaskEngine` struct and its methods are organized by domain:
//! - [`admission`] - Global cap on in-flight tasks
//! - [`tasks`] - Task creation and lookup
//! - [`links`] - Link attachment and validation
//! - [`queue_processor`] - Pending-task dispatch onto workers
//! - [`lifecycle`] - Shutdown coordination
//! - [`worker`] - Per-task state machine

pub mod admission;
mod lifecycle;
mod links;
mod queue_processor;
mod tasks;
mod worker;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod test_helpers;
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;

pub use admission::{AdmissionController, AdmissionPermit};

use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::Duration;
use tokio::sync::{Mutex, mpsc};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use crate::archive::{Archiver, ZipArchiver};
use crate::config::{Config, TaskLimits};
use crate::downloader::{Downloader, HttpDownloader};
use crate::error::Result;
use crate::store::{MemoryTaskStore, TaskStore};
use crate::types::{Task, TaskId};

/// A created task waiting for a worker, together with its admission slot
#[derive(Debug)]
pub(crate) struct QueuedTask {
    pub(crate) id: TaskId,
    pub(crate) permit: AdmissionPermit,
}

/// Admission, pending-task channel and worker bookkeeping
#[derive(Clone)]
pub(crate) struct QueueState {
    /// Caps the number of in-flight tasks
    pub(crate) admission: AdmissionController,
    /// Producer side of the pending-task channel (taken on shutdown)
    pub(crate) sender: Arc<Mutex<Option<mpsc::Sender<QueuedTask>>>>,
    /// Consumer side of the pending-task channel (taken by `start`)
    pub(crate) receiver: Arc<Mutex<Option<mpsc::Receiver<QueuedTask>>>>,
    /// Flag to indicate whether new tasks are accepted (set to false during shutdown)
    pub(crate) accepting_new: Arc<AtomicBool>,
    /// Tracks spawned workers so shutdown can wait for them
    pub(crate) workers: TaskTracker,
    /// Process-level cancellation signal observed by every worker
    pub(crate) shutdown_token: CancellationToken,
    /// Serializes read-modify-write cycles on tasks
    pub(crate) mutation_lock: Arc<Mutex<()>>,
}

impl QueueState {
    fn new(max_active_tasks: usize) -> Self {
        // mpsc::channel panics on a zero capacity; with no admission slots nothing is ever sent
        let (sender, receiver) = mpsc::channel(max_active_tasks.max(1));

        Self {
            admission: AdmissionController::new(max_active_tasks),
            sender: Arc::new(Mutex::new(Some(sender))),
            receiver: Arc::new(Mutex::new(Some(receiver))),
            accepting_new: Arc::new(AtomicBool::new(true)),
            workers: TaskTracker::new(),
            shutdown_token: CancellationToken::new(),
            mutation_lock: Arc::new(Mutex::new(())),
        }
    }
}

/// Collaborators the engine drives
#[derive(Clone)]
pub(crate) struct Collaborators {
    pub(crate) store: Arc<dyn TaskStore>,
    pub(crate) downloader: Arc<dyn Downloader>,
    pub(crate) archiver: Arc<dyn Archiver>,
}

/// Task lifecycle engine (cloneable - all state is Arc-shared)
///
/// Owns admission control and the pending-task queue, dispatches each
/// admitted task onto its own worker and is the only writer of task state
/// after creation.
#[derive(Clone)]
pub struct TaskEngine {
    pub(crate) collaborators: Collaborators,
    pub(crate) limits: TaskLimits,
    /// How long an idle worker sleeps before re-reading its task
    pub(crate) link_poll_interval: Duration,
    pub(crate) queue_state: QueueState,
}

impl TaskEngine {
    /// Create an engine over explicit collaborators
    pub fn new(
        config: &Config,
        store: Arc<dyn TaskStore>,
        downloader: Arc<dyn Downloader>,
        archiver: Arc<dyn Archiver>,
    ) -> Self {
        Self {
            collaborators: Collaborators {
                store,
                downloader,
                archiver,
            },
            limits: config.limits,
            link_poll_interval: config.link_poll_interval,
            queue_state: QueueState::new(config.limits.max_active_tasks),
        }
    }

    /// Create an engine with the production collaborators
    ///
    /// Uses an in-memory store, an HTTP downloader writing into
    /// `config.temp_dir` and a ZIP archiver writing into `config.archive_dir`
    /// (created if missing).
    pub fn from_config(config: &Config) -> Result<Self> {
        let downloader = HttpDownloader::new(&config.temp_dir, config.download_timeout)?;
        let archiver = ZipArchiver::create(&config.archive_dir)?;

        tracing::info!(
            archive_dir = %config.archive_dir.display(),
            temp_dir = %config.temp_dir.display(),
            max_active_tasks = config.limits.max_active_tasks,
            max_links_per_task = config.limits.max_links_per_task,
            "task engine configured"
        );

        Ok(Self::new(
            config,
            Arc::new(MemoryTaskStore::new()),
            Arc::new(downloader),
            Arc::new(archiver),
        ))
    }

    /// Configured ceilings
    pub fn limits(&self) -> TaskLimits {
        self.limits
    }

    /// Number of tasks currently holding an admission slot
    pub fn active_tasks(&self) -> usize {
        self.queue_state.admission.active()
    }

    /// Check that the store is reachable
    pub async fn ping(&self) -> Result<()> {
        Ok(self.collaborators.store.ping().await?)
    }

    /// Close the underlying store; later task operations fail
    pub async fn close_store(&self) -> Result<()> {
        Ok(self.collaborators.store.close().await?)
    }

    /// Read-modify-write a task under the engine mutation lock
    ///
    /// `apply` runs on a fresh snapshot; the task is written back only if it
    /// returns `Ok`.
    pub(crate) async fn mutate_task<T>(
        &self,
        id: &TaskId,
        apply: impl FnOnce(&mut Task) -> Result<T>,
    ) -> Result<T> {
        let _guard = self.queue_state.mutation_lock.lock().await;

        let mut task = self.collaborators.store.get(id).await?;
        let output = apply(&mut task)?;
        self.collaborators.store.update(&task).await?;
        Ok(output)
    }
}
