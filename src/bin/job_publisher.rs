//! Interactive job publisher.
//!
//! Starts the configured managers and workers, then reads batch sizes from
//! stdin until `q` or end of input.

use std::fs;
use std::io;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use tracing::info;

use job_publisher::builders::build_publisher;
use job_publisher::config::{ManagerKind, PublisherConfig, StorePolicy};
use job_publisher::core::DispatchError;
use job_publisher::runtime::Driver;
use job_publisher::util::LogControl;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum StoreArg {
    Fifo,
    LongestFirst,
}

impl From<StoreArg> for StorePolicy {
    fn from(arg: StoreArg) -> Self {
        match arg {
            StoreArg::Fifo => Self::Fifo,
            StoreArg::LongestFirst => Self::LongestFirst,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum KindArg {
    SlotTable,
    ExecutorPool,
}

impl From<KindArg> for ManagerKind {
    fn from(arg: KindArg) -> Self {
        match arg {
            KindArg::SlotTable => Self::SlotTable,
            KindArg::ExecutorPool => Self::ExecutorPool,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "job-publisher", version, about = "Distribute timed jobs across managers and workers")]
struct Cli {
    /// Number of managers; at least 3.
    #[arg(env = "JOB_PUBLISHER_MANAGERS")]
    managers: Option<usize>,

    /// Worker threads per manager; at least 10.
    #[arg(env = "JOB_PUBLISHER_WORKERS")]
    workers: Option<usize>,

    /// Start with debug logging.
    #[arg(short, long, env = "JOB_PUBLISHER_DEBUG")]
    debug: bool,

    /// Log file.
    #[arg(short, long, env = "JOB_PUBLISHER_LOG_FILE", default_value = "logger.txt")]
    log_file: PathBuf,

    /// Append to the log file instead of truncating it.
    #[arg(short, long, env = "JOB_PUBLISHER_APPEND")]
    append: bool,

    /// Pending/active store policy.
    #[arg(long, value_enum, env = "JOB_PUBLISHER_STORE")]
    store: Option<StoreArg>,

    /// Manager realization.
    #[arg(long, value_enum, env = "JOB_PUBLISHER_MANAGER_KIND")]
    manager_kind: Option<KindArg>,

    /// Upper bound for generated job durations, in milliseconds.
    #[arg(long, env = "JOB_PUBLISHER_MAX_WORK_MILLIS")]
    max_work_millis: Option<u64>,

    /// Seed for generated durations.
    #[arg(long, env = "JOB_PUBLISHER_SEED")]
    seed: Option<u64>,

    /// JSON configuration file; command-line values take precedence.
    #[arg(long, env = "JOB_PUBLISHER_CONFIG")]
    config: Option<PathBuf>,
}

impl Cli {
    fn publisher_config(&self) -> anyhow::Result<PublisherConfig> {
        let mut cfg = match &self.config {
            Some(path) => {
                let raw = fs::read_to_string(path)
                    .with_context(|| format!("failed to read config {}", path.display()))?;
                PublisherConfig::from_json_str(&raw).map_err(DispatchError::Configuration)?
            }
            None => PublisherConfig::default(),
        };

        if let Some(managers) = self.managers {
            cfg.managers = managers;
        }
        if let Some(workers) = self.workers {
            cfg.workers_per_manager = workers;
        }
        if let Some(store) = self.store {
            cfg.store = store.into();
        }
        if let Some(kind) = self.manager_kind {
            cfg.manager_kind = kind.into();
        }
        if let Some(millis) = self.max_work_millis {
            cfg.max_work_millis = millis;
        }
        if self.seed.is_some() {
            cfg.seed = self.seed;
        }

        cfg.validate_minimums().map_err(DispatchError::Configuration)?;
        Ok(cfg)
    }
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let cfg = cli.publisher_config()?;
    let logs = LogControl::install(cli.debug, Some(&cli.log_file), cli.append)
        .with_context(|| format!("failed to open log file {}", cli.log_file.display()))?;

    let publisher = build_publisher(&cfg)?;
    let exit = Driver::new(&publisher, &logs).run(io::stdin().lock(), io::stdout().lock());
    info!(?exit, "driver loop finished");

    publisher.await_termination();
    Ok(())
}
