//! Logger initialization.
//!
//! Plain output (colored, one emoji per level) for terminals and container
//! logs, or one JSON object per line for log shippers.

use std::io::Write;

use crate::config::LogFormat;
use crate::error_handling::InitializationError;
use colored::*;
use log::LevelFilter;

/// Initializes the global logger.
///
/// `RUST_LOG` is read first; `level` then overrides the default and this
/// crate's own filter, so `--log-level` always wins for `tracker_watch`
/// records while `RUST_LOG` can still tune other modules.
///
/// ```bash
/// RUST_LOG=reqwest=debug tracker_watch --config config.yaml --log-level info
/// ```
///
/// # Errors
///
/// Returns `InitializationError::LoggerError` if a logger is already set.
pub fn init_logger_with(level: LevelFilter, format: LogFormat) -> Result<(), InitializationError> {
    let mut builder = env_logger::Builder::from_default_env();
    builder.filter_level(level);
    builder.filter_module("html5ever", LevelFilter::Error);
    builder.filter_module("selectors", LevelFilter::Warn);
    builder.filter_module("reqwest", LevelFilter::Info);
    builder.filter_module("hyper", LevelFilter::Info);
    builder.filter_module("hyper_util", LevelFilter::Info);
    builder.filter_module("tracker_watch", level);

    match format {
        LogFormat::Json => {
            builder.format(|buf, record| {
                let line = serde_json::json!({
                    "ts": chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
                    "level": record.level().as_str(),
                    "target": record.target(),
                    "msg": record.args().to_string(),
                });
                writeln!(buf, "{}", line)
            });
        }
        LogFormat::Plain => {
            colored::control::set_override(true);
            builder.format(|buf, record| {
                let level = record.level();
                let (emoji, colored_level) = match level {
                    log::Level::Error => ("❌", level.as_str().red()),
                    log::Level::Warn => ("⚠️", level.as_str().yellow()),
                    log::Level::Info => ("✔️", level.as_str().green()),
                    log::Level::Debug => ("🔍", level.as_str().blue()),
                    log::Level::Trace => ("🔬", level.as_str().purple()),
                };
                writeln!(
                    buf,
                    "{} {} {} [{}] {}",
                    chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string().dimmed(),
                    emoji,
                    record.target().cyan(),
                    colored_level,
                    record.args()
                )
            });
        }
    }

    builder.try_init()?;
    Ok(())
}
