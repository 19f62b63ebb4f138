//! Configuration types for zipfetch

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::{path::PathBuf, time::Duration};

/// Deployment environment, selects log verbosity
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Verbose, human-oriented logs
    #[default]
    Dev,
    /// Info-level logs without colours
    Prod,
}

/// HTTP server configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to listen on, `host:port` (default: "localhost:8080")
    #[serde(default = "default_address")]
    pub address: String,

    /// How long in-flight requests may drain after a shutdown signal (default: 1s)
    #[serde(default = "default_shutdown_timeout", with = "duration_serde")]
    pub shutdown_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
            shutdown_timeout: default_shutdown_timeout(),
        }
    }
}

/// Global and per-task ceilings
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskLimits {
    /// Maximum number of tasks in flight at once (default: 3)
    ///
    /// Zero is accepted and refuses every task.
    #[serde(default = "default_max_active_tasks")]
    pub max_active_tasks: usize,

    /// Maximum number of links a single task may hold (default: 3)
    #[serde(default = "default_max_links_per_task")]
    pub max_links_per_task: usize,
}

impl Default for TaskLimits {
    fn default() -> Self {
        Self {
            max_active_tasks: default_max_active_tasks(),
            max_links_per_task: default_max_links_per_task(),
        }
    }
}

/// Main configuration for the zipfetch service
///
/// Built from command line flags and environment variables by
/// [`Cli::into_config`](crate::cli::Cli::into_config); every field has a
/// default so partial configurations deserialize cleanly.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Deployment environment
    #[serde(default)]
    pub environment: Environment,

    /// Directory receiving finished archives (default: "static/archives")
    #[serde(default = "default_archive_dir")]
    pub archive_dir: PathBuf,

    /// Scratch directory for downloaded files (default: the OS temp dir)
    #[serde(default = "default_temp_dir")]
    pub temp_dir: PathBuf,

    /// Task ceilings
    #[serde(default)]
    pub limits: TaskLimits,

    /// Timeout for a single link download (default: 60s)
    #[serde(default = "default_download_timeout", with = "duration_serde")]
    pub download_timeout: Duration,

    /// How often an idle worker re-reads its task for new links (default: 100ms)
    #[serde(default = "default_link_poll_interval", with = "duration_millis_serde")]
    pub link_poll_interval: Duration,
}

impl Config {
    /// Check that the configuration can start a server
    pub fn validate(&self) -> Result<()> {
        if self.server.address.trim().is_empty() {
            return Err(Error::Config {
                message: "server address must not be empty".to_string(),
                key: Some("server.address".to_string()),
            });
        }

        if self.limits.max_links_per_task == 0 {
            return Err(Error::Config {
                message: "max_links_per_task must be at least 1".to_string(),
                key: Some("limits.max_links_per_task".to_string()),
            });
        }

        if self.limits.max_active_tasks > tokio::sync::Semaphore::MAX_PERMITS {
            return Err(Error::Config {
                message: format!(
                    "max_active_tasks must not exceed {}",
                    tokio::sync::Semaphore::MAX_PERMITS
                ),
                key: Some("limits.max_active_tasks".to_string()),
            });
        }

        if self.link_poll_interval.is_zero() {
            return Err(Error::Config {
                message: "link_poll_interval must be greater than zero".to_string(),
                key: Some("link_poll_interval".to_string()),
            });
        }

        Ok(())
    }
}

fn default_address() -> String {
    "localhost:8080".to_string()
}

fn default_shutdown_timeout() -> Duration {
    Duration::from_secs(1)
}

fn default_max_active_tasks() -> usize {
    3
}

fn default_max_links_per_task() -> usize {
    3
}

fn default_archive_dir() -> PathBuf {
    PathBuf::from("static/archives")
}

fn default_temp_dir() -> PathBuf {
    std::env::temp_dir()
}

fn default_download_timeout() -> Duration {
    Duration::from_secs(60)
}

fn default_link_poll_interval() -> Duration {
    Duration::from_millis(100)
}

// Duration serialization helper
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

// Same as duration_serde, in milliseconds
mod duration_millis_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(u64::try_from(duration.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}
