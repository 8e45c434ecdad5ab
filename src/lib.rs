//! tracker_watch library: tracker signup and invite monitoring
//!
//! Polls tracker signup pages on a fixed interval, decides from each page
//! whether signups are open, and notifies when a tracker opens. Optionally
//! scans Reddit, web search and custom pages for invite offers and reports
//! each one once.
//!
//! # Example
//!
//! ```no_run
//! use tracker_watch::{run_monitor, FileConfig};
//!
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let config = FileConfig::load(std::path::Path::new("config.yaml")).await?;
//! let report = run_monitor(config, true).await?;
//! println!("{} cycle(s) completed", report.cycles);
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime. Use `#[tokio::main]` in your application
//! or ensure you're calling library functions within an async context.

mod app;
pub mod config;
pub mod detect;
mod error_handling;
pub mod fetch;
pub mod initialization;
pub mod matching;
mod models;
pub mod monitor;
pub mod notify;
pub mod scan;
pub mod state;
mod utils;

use anyhow::Result;
use log::info;

// Re-export public API
pub use app::{check_config, shutdown_token, CheckReport};
pub use config::{Cli, FileConfig, LogFormat, LogLevel};
pub use error_handling::{
    ConfigError, CycleStats, FetchError, FetchFailureKind, InitializationError, NotifyError,
    StateError,
};
pub use models::Target;
pub use monitor::{CycleReport, Monitor, MonitorReport};

/// Loads the configuration named on the command line.
///
/// `--state-file` overrides the file's `state_file`.
///
/// # Errors
///
/// Returns an error if the file is missing or is not valid YAML.
pub async fn load_config(cli: &Cli) -> Result<FileConfig> {
    let mut config = FileConfig::load(&cli.config).await?;
    if let Some(path) = &cli.state_file {
        config.state_file = path.clone();
    }
    Ok(config)
}

/// Runs the monitor.
///
/// With `once`, runs a single cycle (status pass plus invite pass when
/// enabled) and returns. Otherwise loops until Ctrl-C or SIGTERM.
///
/// # Errors
///
/// Returns an error if initialization fails, or if the single cycle of a
/// `once` run aborts.
pub async fn run_monitor(config: FileConfig, once: bool) -> Result<MonitorReport> {
    let mut monitor = Monitor::from_config(&config).await?;
    if monitor.context().targets.is_empty() {
        log::warn!("No enabled trackers configured");
    }

    if once {
        let cycle = monitor.run_once().await?;
        info!(
            "Single cycle done: {} checked, {} opened, {} failed",
            cycle.checked, cycle.opened, cycle.failed
        );
        return Ok(MonitorReport {
            cycles: 1,
            failed_cycles: 0,
        });
    }

    Ok(monitor.run(shutdown_token()).await)
}
