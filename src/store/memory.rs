//! In-memory task store
//!
//! Tasks live for the lifetime of the process. Reads take a shared lock,
//! writes an exclusive one, and every task crosses the boundary as a clone.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

use super::{StoreResult, TaskStore};
use crate::error::StoreError;
use crate::types::{Task, TaskId};

/// Process-scoped [`TaskStore`] backed by a `HashMap`
#[derive(Debug, Default)]
pub struct MemoryTaskStore {
    tasks: RwLock<HashMap<TaskId, Task>>,
    closed: AtomicBool,
}

impl MemoryTaskStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored tasks
    pub async fn len(&self) -> usize {
        self.tasks.read().await.len()
    }

    /// Whether the store holds no tasks
    pub async fn is_empty(&self) -> bool {
        self.tasks.read().await.is_empty()
    }

    fn ensure_open(&self) -> StoreResult<()> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(StoreError::Closed);
        }
        Ok(())
    }
}

#[async_trait]
impl TaskStore for MemoryTaskStore {
    async fn insert(&self, task: &Task) -> StoreResult<()> {
        self.ensure_open()?;
        let mut tasks = self.tasks.write().await;

        if tasks.contains_key(&task.id) {
            return Err(StoreError::AlreadyExists(task.id.to_string()));
        }
        tasks.insert(task.id.clone(), task.clone());
        Ok(())
    }

    async fn get(&self, id: &TaskId) -> StoreResult<Task> {
        self.ensure_open()?;
        self.tasks
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    async fn update(&self, task: &Task) -> StoreResult<()> {
        self.ensure_open()?;
        let mut tasks = self.tasks.write().await;

        match tasks.get_mut(&task.id) {
            Some(stored) => {
                *stored = task.clone();
                Ok(())
            }
            None => Err(StoreError::NotFound(task.id.to_string())),
        }
    }

    async fn close(&self) -> StoreResult<()> {
        if self.closed.swap(true, Ordering::SeqCst) {
            tracing::debug!("memory store already closed");
        } else {
            tracing::debug!("memory store closed");
        }
        Ok(())
    }

    async fn ping(&self) -> StoreResult<()> {
        self.ensure_open()
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
