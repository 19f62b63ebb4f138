//! Link fetching
//!
//! The engine fetches each link through the [`Downloader`] trait; the
//! production implementation is [`HttpDownloader`].

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use url::Url;

use crate::error::{DownloadError, Error, Result};
use crate::utils::path_extension;

/// Fetches one remote file into a local scratch file
///
/// Dropping the returned future must abort the transfer; the engine relies
/// on this to cancel an in-flight download on shutdown.
#[async_trait]
pub trait Downloader: Send + Sync {
    /// Download `link` and return the path of the local copy
    ///
    /// # Errors
    ///
    /// - [`DownloadError::InvalidUrl`] if `link` is not an absolute http(s) URL
    /// - [`DownloadError::Transport`] on a transport failure or non-2xx response
    /// - [`DownloadError::Io`] if the scratch file cannot be written
    async fn fetch(&self, link: &str) -> std::result::Result<PathBuf, DownloadError>;
}

/// [`Downloader`] that issues a plain GET with `reqwest`
///
/// The body is streamed chunk by chunk into `<scratch_dir>/<uuid><ext>`,
/// where `<ext>` is the extension of the URL path, so archive entries stay
/// recognisable.
#[derive(Clone, Debug)]
pub struct HttpDownloader {
    client: reqwest::Client,
    scratch_dir: PathBuf,
}

impl HttpDownloader {
    /// Create a downloader writing into `scratch_dir` with a per-request `timeout`
    pub fn new(scratch_dir: impl Into<PathBuf>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("zipfetch/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Other(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            scratch_dir: scratch_dir.into(),
        })
    }

    /// Directory receiving downloaded files
    pub fn scratch_dir(&self) -> &Path {
        &self.scratch_dir
    }

    async fn stream_to_file(
        &self,
        link: &str,
        mut response: reqwest::Response,
        path: &Path,
    ) -> std::result::Result<u64, DownloadError> {
        let io_err = |source| DownloadError::Io {
            path: path.to_path_buf(),
            source,
        };

        let mut file = tokio::fs::File::create(path).await.map_err(io_err)?;
        let mut written = 0u64;

        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| transport_error(link, &e))?
        {
            file.write_all(&chunk).await.map_err(io_err)?;
            written += chunk.len() as u64;
        }

        file.flush().await.map_err(io_err)?;
        file.sync_all().await.map_err(io_err)?;
        Ok(written)
    }
}

#[async_trait]
impl Downloader for HttpDownloader {
    async fn fetch(&self, link: &str) -> std::result::Result<PathBuf, DownloadError> {
        let url = parse_http_url(link)?;

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| transport_error(link, &e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::Transport {
                link: link.to_string(),
                detail: format!("HTTP {status}"),
            });
        }

        tokio::fs::create_dir_all(&self.scratch_dir)
            .await
            .map_err(|source| DownloadError::Io {
                path: self.scratch_dir.clone(),
                source,
            })?;

        let file_name = format!("{}{}", uuid::Uuid::new_v4(), path_extension(&url));
        let path = self.scratch_dir.join(file_name);

        match self.stream_to_file(link, response, &path).await {
            Ok(bytes) => {
                tracing::debug!(link, path = %path.display(), bytes, "link downloaded");
                Ok(path)
            }
            Err(e) => {
                if let Err(remove_err) = tokio::fs::remove_file(&path).await {
                    tracing::debug!(path = %path.display(), error = %remove_err, "could not remove partial download");
                }
                Err(e)
            }
        }
    }
}

fn parse_http_url(link: &str) -> std::result::Result<Url, DownloadError> {
    let invalid = |reason: String| DownloadError::InvalidUrl {
        link: link.to_string(),
        reason,
    };

    let url = Url::parse(link).map_err(|e| invalid(e.to_string()))?;
    match url.scheme() {
        "http" | "https" => {}
        other => return Err(invalid(format!("unsupported scheme '{other}'"))),
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(invalid("missing host".to_string()));
    }
    Ok(url)
}

fn transport_error(link: &str, error: &reqwest::Error) -> DownloadError {
    let detail = if error.is_timeout() {
        format!("timed out: {error}")
    } else if error.is_connect() {
        format!("connection failed: {error}")
    } else {
        error.to_string()
    };

    DownloadError::Transport {
        link: link.to_string(),
        detail,
    }
}
