use async_trait::async_trait;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tokio::task::spawn_blocking;
use tracing::{debug, info, warn};

use super::Archiver;
use crate::error::ArchiveError;

/// [`Archiver`] writing deflated ZIP files named `<uuid>.zip`
#[derive(Clone, Debug)]
pub struct ZipArchiver {
    dir: PathBuf,
}

impl ZipArchiver {
    /// Create an archiver for `dir`, creating the directory if missing
    pub fn create(dir: impl Into<PathBuf>) -> Result<Self, ArchiveError> {
        let dir = dir.into();
        ensure_dir(&dir)?;
        Ok(Self { dir })
    }

    /// Directory receiving archives
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl Archiver for ZipArchiver {
    async fn bundle(&self, paths: &[PathBuf]) -> Result<PathBuf, ArchiveError> {
        let dir = self.dir.clone();
        let inputs = paths.to_vec();

        // zip writes synchronously; keep it off the async workers
        spawn_blocking(move || write_archive(&dir, &inputs))
            .await
            .map_err(|e| ArchiveError::Interrupted(e.to_string()))?
    }
}

fn ensure_dir(dir: &Path) -> Result<(), ArchiveError> {
    let mut builder = std::fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o755);
    }

    builder.create(dir).map_err(|source| ArchiveError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })
}

fn write_archive(dir: &Path, inputs: &[PathBuf]) -> Result<PathBuf, ArchiveError> {
    ensure_dir(dir)?;

    let archive_path = dir.join(format!("{}.zip", uuid::Uuid::new_v4()));
    let file = File::create(&archive_path).map_err(|source| ArchiveError::Create {
        path: archive_path.clone(),
        source,
    })?;

    match write_entries(BufWriter::new(file), &archive_path, inputs) {
        Ok(entries) => {
            info!(
                archive = %archive_path.display(),
                entries,
                skipped = inputs.len() - entries,
                "archive written"
            );
            Ok(archive_path)
        }
        Err(e) => {
            if let Err(remove_err) = std::fs::remove_file(&archive_path) {
                debug!(archive = %archive_path.display(), error = %remove_err, "could not remove partial archive");
            }
            Err(e)
        }
    }
}

/// Writes every openable input as a top-level entry, returning how many were written
fn write_entries(
    writer: BufWriter<File>,
    archive_path: &Path,
    inputs: &[PathBuf],
) -> Result<usize, ArchiveError> {
    let write_err = |reason: String| ArchiveError::Write {
        path: archive_path.to_path_buf(),
        reason,
    };

    let mut zip = zip::ZipWriter::new(writer);
    let options =
        zip::write::FileOptions::default().compression_method(zip::CompressionMethod::Deflated);
    let mut entries = 0;

    for input in inputs {
        let Some(name) = input.file_name().map(|n| n.to_string_lossy().into_owned()) else {
            warn!(path = %input.display(), "skipping input without a file name");
            continue;
        };

        let mut source = match open_regular_file(input) {
            Ok(f) => f,
            Err(e) => {
                warn!(path = %input.display(), error = %e, "skipping unreadable input");
                continue;
            }
        };

        zip.start_file(name.as_str(), options)
            .map_err(|e| write_err(format!("failed to start entry {name}: {e}")))?;
        std::io::copy(&mut source, &mut zip)
            .map_err(|e| write_err(format!("failed to copy {}: {e}", input.display())))?;
        entries += 1;
    }

    let mut writer = zip
        .finish()
        .map_err(|e| write_err(format!("failed to finalize: {e}")))?;
    std::io::Write::flush(&mut writer).map_err(|e| write_err(format!("failed to flush: {e}")))?;

    Ok(entries)
}

fn open_regular_file(path: &Path) -> std::io::Result<File> {
    let file = File::open(path)?;
    if !file.metadata()?.is_file() {
        return Err(std::io::Error::other("not a regular file"));
    }
    Ok(file)
}
