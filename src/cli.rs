//! Command line interface
//!
//! Every flag can also be supplied through an environment variable. An
//! explicit flag wins over the environment, which wins over the default.

use clap::Parser;
use std::path::PathBuf;

use crate::config::{Config, Environment, ServerConfig, TaskLimits};
use crate::error::Result;

/// Bundle remote PDF/JPEG files into ZIP archives over HTTP
#[derive(Parser, Debug)]
#[command(name = "zipfetch")]
#[command(version)]
#[command(about = "Small HTTP service that bundles remote files into ZIP archives", long_about = None)]
pub struct Cli {
    /// Address to listen on
    #[arg(short = 'a', long, env = "SERVER_ADDRESS", value_name = "HOST:PORT")]
    #[arg(default_value = "localhost:8080")]
    pub address: String,

    /// Environment, selects log verbosity
    #[arg(long = "env", env = "ENV", value_enum, default_value_t = Environment::Dev)]
    pub environment: Environment,

    /// Directory receiving finished archives
    #[arg(long = "dir", env = "ARCHIVE_DIR", value_name = "DIR")]
    #[arg(default_value = "static/archives")]
    #[arg(value_hint = clap::ValueHint::DirPath)]
    pub archive_dir: PathBuf,

    /// Maximum number of tasks in flight at once
    #[arg(long = "tasks", env = "MAX_ACTIVE_TASKS", default_value_t = 3)]
    pub max_active_tasks: usize,

    /// Maximum number of links per task
    #[arg(long = "links", env = "MAX_LINKS_PER_TASK", default_value_t = 3)]
    pub max_links_per_task: usize,
}

impl Cli {
    /// Build and validate the service configuration from parsed arguments
    pub fn into_config(self) -> Result<Config> {
        let config = Config {
            server: ServerConfig {
                address: self.address,
                ..ServerConfig::default()
            },
            environment: self.environment,
            archive_dir: self.archive_dir,
            limits: TaskLimits {
                max_active_tasks: self.max_active_tasks,
                max_links_per_task: self.max_links_per_task,
            },
            ..Config::default()
        };

        config.validate()?;
        Ok(config)
    }
}
