//! Link attachment.

use crate::error::{Error, Result};
use crate::types::TaskId;
use crate::utils::has_allowed_extension;

use super::TaskEngine;

impl TaskEngine {
    /// Append `links` to a task, in order
    ///
    /// The batch is validated as a whole before the task is touched: if it
    /// is too large or any link has a disallowed extension, nothing is added.
    /// This never waits on download progress.
    ///
    /// # Errors
    ///
    /// - [`Error::TooManyFiles`] if the batch, or the task's total link count
    ///   after appending, exceeds `max_links_per_task`
    /// - [`Error::InvalidExtension`] naming the first link not ending in
    ///   `.pdf`, `.jpg` or `.jpeg`
    /// - [`Error::NotFound`] for an unknown id
    pub async fn add_links(&self, id: &TaskId, links: Vec<String>) -> Result<()> {
        let limit = self.limits.max_links_per_task;

        if links.len() > limit {
            return Err(Error::TooManyFiles {
                limit,
                requested: links.len(),
            });
        }

        if let Some(link) = links.iter().find(|link| !has_allowed_extension(link)) {
            return Err(Error::InvalidExtension { link: link.clone() });
        }

        let added = links.len();
        let total = self
            .mutate_task(id, |task| {
                let requested = task.links.len() + links.len();
                if requested > limit {
                    return Err(Error::TooManyFiles { limit, requested });
                }
                task.links.extend(links);
                Ok(task.links.len())
            })
            .await?;

        tracing::debug!(task_id = %id, added, total, "links added");
        Ok(())
    }
}
