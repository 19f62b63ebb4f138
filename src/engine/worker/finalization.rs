//! Task finalization: terminal classification and archiving.

use crate::types::{Task, TaskStatus};

use super::context::TaskContext;

/// Mark a task whose every link failed as `Failed`
pub(super) async fn finalize_failed(ctx: &TaskContext, task: &Task) {
    match ctx.update(|t| t.transition(TaskStatus::Failed)).await {
        Ok(()) => tracing::warn!(
            task_id = %ctx.id,
            failed = task.failed.len(),
            "task failed: no link could be downloaded"
        ),
        Err(e) => tracing::error!(
            task_id = %ctx.id,
            error = %e,
            "could not mark task failed"
        ),
    }
}

/// Bundle the downloaded files and mark the task `Done`, or `Failed` if archiving fails
pub(super) async fn finalize_archive(ctx: &TaskContext, task: &Task) {
    let paths = task.downloaded_paths();

    let archive = match ctx.engine.collaborators.archiver.bundle(&paths).await {
        Ok(archive) => archive,
        Err(e) => {
            ctx.mark_failed(&format!("archive assembly failed: {e}"))
                .await;
            return;
        }
    };

    let result = ctx
        .update(|t| {
            t.transition(TaskStatus::Done)?;
            t.archive = Some(archive.clone());
            Ok(())
        })
        .await;

    match result {
        Ok(()) => tracing::info!(
            task_id = %ctx.id,
            archive = %archive.display(),
            files = paths.len(),
            failed = task.failed.len(),
            "task done"
        ),
        Err(e) => {
            ctx.mark_failed(&format!("could not record archive: {e}"))
                .await
        }
    }
}
