//! Archive assembly
//!
//! The engine bundles downloaded files through the [`Archiver`] trait; the
//! production implementation is [`ZipArchiver`].

use async_trait::async_trait;
use std::path::PathBuf;

use crate::error::ArchiveError;

mod zip;

pub use self::zip::ZipArchiver;

/// Bundles local files into a single archive
///
/// Bundling is best-effort: inputs that cannot be opened are skipped, and an
/// archive with no entries is still a success. Deciding whether the result
/// is useful is the caller's job.
#[async_trait]
pub trait Archiver: Send + Sync {
    /// Write `paths` into a fresh archive and return its location
    async fn bundle(&self, paths: &[PathBuf]) -> Result<PathBuf, ArchiveError>;
}
