//! Command-line options.
//!
//! The CLI only selects files and logging; everything about what is monitored
//! lives in the YAML configuration file.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::config::constants::DEFAULT_CONFIG_PATH;

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Command-line options for the `tracker_watch` binary.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "tracker_watch",
    version,
    about = "Watches tracker signup pages and invite sources, and notifies on changes"
)]
pub struct Cli {
    /// Path to the YAML configuration file
    #[arg(
        short,
        long,
        env = "TRACKER_WATCH_CONFIG",
        default_value = DEFAULT_CONFIG_PATH
    )]
    pub config: PathBuf,

    /// State file path (overrides `state_file` from the configuration)
    #[arg(long, env = "TRACKER_WATCH_STATE")]
    pub state_file: Option<PathBuf>,

    /// Run a single cycle and exit
    #[arg(long)]
    pub once: bool,

    /// Validate the configuration, send test notifications and exit
    #[arg(long, conflicts_with = "once")]
    pub check_config: bool,

    /// Log level
    #[arg(long, value_enum, default_value = "info")]
    pub log_level: LogLevel,

    /// Log format
    #[arg(long, value_enum, default_value = "plain")]
    pub log_format: LogFormat,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_conversion() {
        assert_eq!(
            log::LevelFilter::from(LogLevel::Error),
            log::LevelFilter::Error
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Warn),
            log::LevelFilter::Warn
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Info),
            log::LevelFilter::Info
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Debug),
            log::LevelFilter::Debug
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Trace),
            log::LevelFilter::Trace
        );
    }

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["tracker_watch"]).expect("defaults should parse");
        assert!(!cli.once);
        assert!(!cli.check_config);
        assert!(cli.state_file.is_none());
        assert!(matches!(cli.log_format, LogFormat::Plain));
    }

    #[test]
    fn test_cli_flags() {
        let cli = Cli::try_parse_from([
            "tracker_watch",
            "--config",
            "my.yaml",
            "--state-file",
            "state.json",
            "--once",
            "--log-level",
            "debug",
            "--log-format",
            "json",
        ])
        .expect("flags should parse");
        assert_eq!(cli.config, PathBuf::from("my.yaml"));
        assert_eq!(cli.state_file, Some(PathBuf::from("state.json")));
        assert!(cli.once);
        assert!(matches!(cli.log_level, LogLevel::Debug));
        assert!(matches!(cli.log_format, LogFormat::Json));
    }

    #[test]
    fn test_cli_once_conflicts_with_check_config() {
        let result = Cli::try_parse_from(["tracker_watch", "--once", "--check-config"]);
        assert!(result.is_err());
    }
}
