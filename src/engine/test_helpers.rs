//! Shared test helpers for creating TaskEngine instances with scripted collaborators.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::archive::Archiver;
use crate::config::{Config, TaskLimits};
use crate::downloader::Downloader;
use crate::engine::TaskEngine;
use crate::error::{ArchiveError, DownloadError, StoreError};
use crate::store::{MemoryTaskStore, StoreResult, TaskStore};
use crate::types::{Task, TaskId, TaskStatus};

/// Scripted behaviour for one link
#[derive(Clone, Debug)]
pub(crate) enum FakeResponse {
    /// Succeed immediately
    Ok,
    /// Fail with a transport error carrying this detail
    Fail(&'static str),
    /// Fail the first call like `Fail`, succeed afterwards
    FailOnce(&'static str),
    /// Never complete (until the future is dropped)
    Hang,
}

/// [`Downloader`] that answers from a script and records every call
///
/// Links without a scripted response succeed.
#[derive(Default)]
pub(crate) struct FakeDownloader {
    responses: Mutex<HashMap<String, FakeResponse>>,
    calls: Mutex<Vec<String>>,
}

impl FakeDownloader {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn respond(&self, link: &str, response: FakeResponse) {
        self.responses
            .lock()
            .unwrap()
            .insert(link.to_string(), response);
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Downloader for FakeDownloader {
    async fn fetch(&self, link: &str) -> Result<PathBuf, DownloadError> {
        let response = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(link.to_string());
            let mut responses = self.responses.lock().unwrap();
            match responses.get(link).cloned() {
                Some(FakeResponse::FailOnce(detail)) => {
                    responses.insert(link.to_string(), FakeResponse::Ok);
                    FakeResponse::Fail(detail)
                }
                other => other.unwrap_or(FakeResponse::Ok),
            }
        };

        match response {
            FakeResponse::Ok => {
                let n = self.calls.lock().unwrap().len();
                Ok(PathBuf::from(format!("/scratch/file-{n}.pdf")))
            }
            FakeResponse::Fail(detail) | FakeResponse::FailOnce(detail) => {
                Err(DownloadError::Transport {
                    link: link.to_string(),
                    detail: detail.to_string(),
                })
            }
            FakeResponse::Hang => std::future::pending().await,
        }
    }
}

/// [`Archiver`] that records bundles without touching the filesystem
#[derive(Default)]
pub(crate) struct FakeArchiver {
    fail: bool,
    bundles: Mutex<Vec<Vec<PathBuf>>>,
}

impl FakeArchiver {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub(crate) fn bundles(&self) -> Vec<Vec<PathBuf>> {
        self.bundles.lock().unwrap().clone()
    }
}

#[async_trait]
impl Archiver for FakeArchiver {
    async fn bundle(&self, paths: &[PathBuf]) -> Result<PathBuf, ArchiveError> {
        let mut bundles = self.bundles.lock().unwrap();
        bundles.push(paths.to_vec());

        if self.fail {
            return Err(ArchiveError::Interrupted("disk full".into()));
        }
        Ok(PathBuf::from(format!("/archives/{}.zip", bundles.len())))
    }
}

/// [`MemoryTaskStore`] whose `n`-th update (1-based) fails once
pub(crate) struct FlakyStore {
    inner: MemoryTaskStore,
    fail_update: usize,
    updates: AtomicUsize,
}

impl FlakyStore {
    pub(crate) fn failing_update(n: usize) -> Self {
        Self {
            inner: MemoryTaskStore::new(),
            fail_update: n,
            updates: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl TaskStore for FlakyStore {
    async fn insert(&self, task: &Task) -> StoreResult<()> {
        self.inner.insert(task).await
    }

    async fn get(&self, id: &TaskId) -> StoreResult<Task> {
        self.inner.get(id).await
    }

    async fn update(&self, task: &Task) -> StoreResult<()> {
        let n = self.updates.fetch_add(1, Ordering::SeqCst) + 1;
        if n == self.fail_update {
            return Err(StoreError::Closed);
        }
        self.inner.update(task).await
    }

    async fn close(&self) -> StoreResult<()> {
        self.inner.close().await
    }

    async fn ping(&self) -> StoreResult<()> {
        self.inner.ping().await
    }

    fn name(&self) -> &'static str {
        "flaky"
    }
}

/// Engine over `store` with default fakes for the other collaborators
pub(crate) fn create_test_engine_over(
    store: Arc<dyn TaskStore>,
    max_active_tasks: usize,
    max_links_per_task: usize,
) -> TaskEngine {
    TaskEngine::new(
        &test_config(max_active_tasks, max_links_per_task),
        store,
        Arc::new(FakeDownloader::new()),
        Arc::new(FakeArchiver::new()),
    )
}

/// Engine wired to fakes, with handles to inspect them
pub(crate) struct TestEngine {
    pub(crate) engine: TaskEngine,
    pub(crate) store: Arc<MemoryTaskStore>,
    pub(crate) downloader: Arc<FakeDownloader>,
    pub(crate) archiver: Arc<FakeArchiver>,
}

pub(crate) fn test_config(max_active_tasks: usize, max_links_per_task: usize) -> Config {
    Config {
        limits: TaskLimits {
            max_active_tasks,
            max_links_per_task,
        },
        link_poll_interval: Duration::from_millis(10),
        ..Config::default()
    }
}

/// Helper to create an engine over fake collaborators (not started).
pub(crate) fn create_test_engine(max_active_tasks: usize, max_links_per_task: usize) -> TestEngine {
    create_test_engine_with(
        max_active_tasks,
        max_links_per_task,
        FakeDownloader::new(),
        FakeArchiver::new(),
    )
}

pub(crate) fn create_test_engine_with(
    max_active_tasks: usize,
    max_links_per_task: usize,
    downloader: FakeDownloader,
    archiver: FakeArchiver,
) -> TestEngine {
    let store = Arc::new(MemoryTaskStore::new());
    let downloader = Arc::new(downloader);
    let archiver = Arc::new(archiver);

    let engine = TaskEngine::new(
        &test_config(max_active_tasks, max_links_per_task),
        Arc::clone(&store) as Arc<dyn TaskStore>,
        Arc::clone(&downloader) as Arc<dyn Downloader>,
        Arc::clone(&archiver) as Arc<dyn Archiver>,
    );

    TestEngine {
        engine,
        store,
        downloader,
        archiver,
    }
}

/// Spawn the dispatcher in the background
pub(crate) fn start(engine: &TaskEngine) -> tokio::task::JoinHandle<crate::Result<()>> {
    let engine = engine.clone();
    tokio::spawn(async move { engine.start().await })
}

/// Poll until the task reaches `status`, panicking after a few seconds
pub(crate) async fn wait_for_status(engine: &TaskEngine, id: &TaskId, status: TaskStatus) -> Task {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    loop {
        let task = engine.get_task(id).await.unwrap();
        if task.status == status {
            return task;
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "task {id} stuck in {} waiting for {status}",
            task.status
        );
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

/// Poll until `check` holds for the task, panicking after a few seconds
pub(crate) async fn wait_until(
    engine: &TaskEngine,
    id: &TaskId,
    check: impl Fn(&Task) -> bool,
) -> Task {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    loop {
        let task = engine.get_task(id).await.unwrap();
        if check(&task) {
            return task;
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "condition not reached for task {id}: {task:?}"
        );
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

/// Poll until the engine holds `expected` admission slots
pub(crate) async fn wait_for_active(engine: &TaskEngine, expected: usize) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while engine.active_tasks() != expected {
        assert!(
            tokio::time::Instant::now() < deadline,
            "active tasks stuck at {}, expected {expected}",
            engine.active_tasks()
        );
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

/// `n` distinct allowed links
pub(crate) fn links(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("http://h/file-{i}.pdf")).collect()
}
