//! Core types for zipfetch

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use utoipa::ToSchema;

use crate::error::{Error, Result};

/// Unique identifier for a task
///
/// Generated from a random v4 UUID. Parsing accepts any string so that an
/// unknown id reaches the store and is reported as not found.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct TaskId(pub String);

impl TaskId {
    /// Generate a fresh, process-unique task id
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Borrow the id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for TaskId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for TaskId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Task status
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    /// Created, waiting for a worker
    Created,
    /// A worker is downloading links
    Running,
    /// Archive assembled
    Done,
    /// Nothing could be archived
    Failed,
}

impl TaskStatus {
    /// Whether no further transitions are possible
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Done | TaskStatus::Failed)
    }

    /// Whether moving from `self` to `next` keeps the status monotonic
    ///
    /// The only allowed moves are Created → Running and Running → Done/Failed.
    pub fn can_transition_to(&self, next: TaskStatus) -> bool {
        matches!(
            (self, next),
            (TaskStatus::Created, TaskStatus::Running)
                | (TaskStatus::Running, TaskStatus::Done)
                | (TaskStatus::Running, TaskStatus::Failed)
        )
    }

    fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Created => "created",
            TaskStatus::Running => "running",
            TaskStatus::Done => "done",
            TaskStatus::Failed => "failed",
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A link that was fetched successfully
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadedFile {
    /// Link occurrence this file was fetched from
    pub link: String,
    /// Local path of the fetched file
    pub path: PathBuf,
}

/// A link that could not be fetched
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedLink {
    /// Link occurrence that failed
    pub link: String,
    /// Human-readable failure reason
    pub reason: String,
}

/// Result of resolving one link
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LinkOutcome {
    /// Fetched into this local file
    Downloaded(PathBuf),
    /// Could not be fetched, with the reason
    Failed(String),
}

/// A bundling task
///
/// Links are resolved strictly in submission order, so the first
/// `resolved()` entries of `links` have an outcome in either `downloaded`
/// or `failed`, and every remaining entry is pending. A repeated link gets
/// one entry per occurrence, all sharing the outcome of its first
/// occurrence, so no link is ever both downloaded and failed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Task {
    /// Task identifier
    pub id: TaskId,
    /// Current status
    pub status: TaskStatus,
    /// Links in submission order
    pub links: Vec<String>,
    /// Successfully fetched links, in resolution order
    pub downloaded: Vec<DownloadedFile>,
    /// Failed links, in resolution order
    pub failed: Vec<FailedLink>,
    /// Archive path, set once the task is done
    pub archive: Option<PathBuf>,
}

impl Task {
    /// Create an empty task in the `Created` state
    pub fn new(id: TaskId) -> Self {
        Self {
            id,
            status: TaskStatus::Created,
            links: Vec::new(),
            downloaded: Vec::new(),
            failed: Vec::new(),
            archive: None,
        }
    }

    /// Number of link occurrences with an outcome
    pub fn resolved(&self) -> usize {
        self.downloaded.len() + self.failed.len()
    }

    /// Links that have not been attempted yet
    pub fn pending_links(&self) -> &[String] {
        self.links.get(self.resolved()..).unwrap_or(&[])
    }

    /// Local paths of all fetched files, in resolution order, each once
    pub fn downloaded_paths(&self) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = Vec::with_capacity(self.downloaded.len());
        for file in &self.downloaded {
            if !paths.contains(&file.path) {
                paths.push(file.path.clone());
            }
        }
        paths
    }

    /// Outcome already recorded for an earlier occurrence of `link`
    pub fn recorded_outcome(&self, link: &str) -> Option<LinkOutcome> {
        if let Some(file) = self.downloaded.iter().find(|f| f.link == link) {
            return Some(LinkOutcome::Downloaded(file.path.clone()));
        }
        self.failed
            .iter()
            .find(|f| f.link == link)
            .map(|f| LinkOutcome::Failed(f.reason.clone()))
    }

    /// Record the outcome of the next pending occurrence of `link`
    pub fn record(&mut self, link: String, outcome: LinkOutcome) {
        match outcome {
            LinkOutcome::Downloaded(path) => self.downloaded.push(DownloadedFile { link, path }),
            LinkOutcome::Failed(reason) => self.failed.push(FailedLink { link, reason }),
        }
    }

    /// Move the task to `next`, rejecting backward or terminal-escaping moves
    pub fn transition(&mut self, next: TaskStatus) -> Result<()> {
        if !self.status.can_transition_to(next) {
            return Err(Error::InvalidTransition {
                id: self.id.to_string(),
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        Ok(())
    }

    /// Public representation of this task
    pub fn view(&self) -> TaskView {
        let failed_files: BTreeMap<String, String> = self
            .failed
            .iter()
            .map(|f| (f.link.clone(), f.reason.clone()))
            .collect();

        TaskView {
            id: self.id.clone(),
            status: self.status,
            archive: self
                .archive
                .as_ref()
                .map(|path| path.to_string_lossy().into_owned()),
            failed_files: (!failed_files.is_empty()).then_some(failed_files),
        }
    }
}

/// Task as returned by `GET /task/{id}`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TaskView {
    /// Task identifier
    #[schema(value_type = String)]
    pub id: TaskId,
    /// Current status
    pub status: TaskStatus,
    /// Archive path, present once the task is done
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archive: Option<String>,
    /// Failed links mapped to their failure reason, present when non-empty
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failed_files: Option<BTreeMap<String, String>>,
}

/// Body of a successful `POST /task`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CreatedTask {
    /// Identifier of the new task
    #[schema(value_type = String)]
    pub id: TaskId,
    /// Always `created`
    pub status: TaskStatus,
}

/// Body of `PATCH /task/{id}`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AddLinksRequest {
    /// Absolute http(s) URLs ending in .pdf, .jpg or .jpeg
    pub links: Vec<String>,
}
