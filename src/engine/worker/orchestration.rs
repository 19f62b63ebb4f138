//! Worker orchestration: the processing loop for a single task.

use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::types::{LinkOutcome, Task, TaskStatus};

use super::context::TaskContext;
use super::finalization::{finalize_archive, finalize_failed};

/// What the worker does next with a task snapshot
#[derive(Debug, PartialEq, Eq)]
pub(super) enum Step {
    /// Every link up to the ceiling failed
    Fail,
    /// The ceiling is reached with at least one download
    Archive,
    /// Fetch these links, in order
    Download(Vec<String>),
    /// Nothing to do until more links arrive
    Wait,
}

/// Result of one link attempt
#[derive(Debug, PartialEq, Eq)]
enum Progress {
    Recorded,
    Interrupted,
}

/// Decide the next step from a snapshot
pub(super) fn next_step(task: &Task, ceiling: usize) -> Step {
    if task.failed.len() == ceiling {
        return Step::Fail;
    }
    if task.resolved() == ceiling {
        return Step::Archive;
    }

    let pending = task.pending_links();
    if pending.is_empty() {
        Step::Wait
    } else {
        Step::Download(pending.to_vec())
    }
}

/// Drive a task from `Created` to a terminal state.
///
/// Phases:
/// 1. Transition to Running
/// 2. Download pending links one at a time, persisting each outcome
/// 3. Wait for more links until the ceiling is reached
/// 4. Classify: all failed, or archive what was downloaded
///
/// Shutdown is observed before each download and while waiting; an
/// interrupted task keeps its persisted progress and stays non-terminal.
pub(crate) async fn run_task(ctx: TaskContext) {
    let id = ctx.id.clone();

    if ctx.cancel_token.is_cancelled() {
        debug!(task_id = %id, "shutdown before start, task left as created");
        return;
    }

    // Phase 1: Mark running
    if let Err(e) = ctx.update(|task| task.transition(TaskStatus::Running)).await {
        ctx.mark_failed(&format!("could not start task: {e}")).await;
        return;
    }
    info!(task_id = %id, "task running");

    loop {
        if ctx.cancel_token.is_cancelled() {
            info!(task_id = %id, "task interrupted by shutdown, progress kept");
            return;
        }

        let task = match ctx.snapshot().await {
            Ok(task) => task,
            Err(e) => {
                ctx.mark_failed(&format!("could not read task: {e}")).await;
                return;
            }
        };

        match next_step(&task, ctx.ceiling()) {
            // Phase 4: Terminal classification
            Step::Fail => {
                finalize_failed(&ctx, &task).await;
                return;
            }
            Step::Archive => {
                finalize_archive(&ctx, &task).await;
                return;
            }

            // Phase 2: Download pending links
            Step::Download(links) => {
                for link in links {
                    match download_link(&ctx, link).await {
                        Ok(Progress::Recorded) => {}
                        Ok(Progress::Interrupted) => {
                            info!(task_id = %id, "task interrupted by shutdown, progress kept");
                            return;
                        }
                        Err(e) => {
                            ctx.mark_failed(&format!("could not record progress: {e}"))
                                .await;
                            return;
                        }
                    }
                }
            }

            // Phase 3: Wait for more links
            Step::Wait => {
                tokio::select! {
                    biased;
                    _ = ctx.cancel_token.cancelled() => {}
                    _ = tokio::time::sleep(ctx.engine.link_poll_interval) => {}
                }
            }
        }
    }
}

/// Resolve one link occurrence and persist its outcome
///
/// A link that already has an outcome in this task is not fetched again;
/// the occurrence takes over the earlier outcome.
async fn download_link(ctx: &TaskContext, link: String) -> Result<Progress> {
    let outcome = match ctx.snapshot().await?.recorded_outcome(&link) {
        Some(earlier) => {
            debug!(task_id = %ctx.id, %link, "repeated link, reusing earlier outcome");
            earlier
        }
        None => match fetch(ctx, &link).await {
            Some(outcome) => outcome,
            None => return Ok(Progress::Interrupted),
        },
    };

    ctx.update(move |task| {
        // Only the worker resolves links, strictly in order
        if task.pending_links().first() != Some(&link) {
            return Err(Error::Other(format!(
                "link {link} is not the next pending link of task {}",
                task.id
            )));
        }
        task.record(link, outcome);
        Ok(())
    })
    .await?;

    Ok(Progress::Recorded)
}

/// Fetch a link, or `None` if shutdown interrupted the transfer
async fn fetch(ctx: &TaskContext, link: &str) -> Option<LinkOutcome> {
    let downloader = &ctx.engine.collaborators.downloader;

    let result = tokio::select! {
        biased;
        _ = ctx.cancel_token.cancelled() => return None,
        result = downloader.fetch(link) => result,
    };

    Some(match result {
        Ok(path) => {
            debug!(task_id = %ctx.id, %link, path = %path.display(), "link downloaded");
            LinkOutcome::Downloaded(path)
        }
        Err(e) => {
            warn!(task_id = %ctx.id, %link, error = %e, "link download failed");
            LinkOutcome::Failed(e.to_string())
        }
    })
}
