//! Application configuration and constants.
//!
//! This module provides:
//! - Configuration constants (timeouts, limits, defaults)
//! - The YAML configuration file model
//! - CLI option types and parsing

mod constants;
mod file;
mod types;

// Re-export all constants
pub use constants::*;
pub use file::{
    CustomUrlsConfig, DiscordConfig, EmailConfig, FileConfig, FlareSolverrConfig,
    InviteScanConfig, NotificationsConfig, RedditConfig, TelegramConfig, TrackerConfig,
    WebSearchConfig, WebhookConfig,
};
pub use types::{Cli, LogFormat, LogLevel};
