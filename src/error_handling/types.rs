//! Error type definitions.
//!
//! This module defines the error types used throughout the application and the
//! failure kinds used to summarize fetch errors per cycle.

use log::SetLoggerError;
use reqwest::Error as ReqwestError;
use strum_macros::EnumIter as EnumIterMacro;
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error initializing the HTTP client.
    #[error("HTTP client initialization error: {0}")]
    HttpClientError(#[from] ReqwestError),
}

/// A page could not be retrieved this cycle.
///
/// Fetch errors are always transient from the monitor's point of view: the
/// target is skipped and its stored state is left untouched.
#[derive(Error, Debug)]
pub enum FetchError {
    /// Transport failure or non-success status from a direct request.
    #[error("HTTP request failed: {0}")]
    Http(#[from] ReqwestError),

    /// The bypass proxy answered but reported a failure.
    #[error("Bypass proxy error: {0}")]
    Proxy(String),
}

/// Invalid configuration for a single tracker or feature.
///
/// Configuration errors are reported once when the configuration is loaded;
/// the affected tracker or feature is then treated as disabled.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The tracker entry has no `name`.
    #[error("tracker entry #{0} has no name")]
    MissingName(usize),

    /// Another enabled tracker already uses this name.
    #[error("duplicate tracker name '{0}'")]
    DuplicateName(String),

    /// The tracker URL is missing or does not parse.
    #[error("invalid URL '{0}'")]
    InvalidUrl(String),

    /// The check method is not one of `text_match`, `xpath`, `css_selector`.
    #[error("unknown check method '{0}'")]
    UnknownMethod(String),

    /// The check method needs a parameter that is absent.
    #[error("method '{method}' requires '{field}'")]
    MissingParameter {
        /// Check method name
        method: &'static str,
        /// Missing configuration key
        field: &'static str,
    },

    /// The CSS selector does not parse.
    #[error("invalid CSS selector '{selector}': {reason}")]
    InvalidSelector {
        /// Selector as written in the configuration
        selector: String,
        /// Parser message
        reason: String,
    },

    /// The XPath expression does not parse or uses unsupported syntax.
    #[error("invalid XPath expression '{expr}': {reason}")]
    InvalidXPath {
        /// Expression as written in the configuration
        expr: String,
        /// Parser message
        reason: String,
    },

    /// A numeric setting is outside the range the monitor can work with.
    #[error("'{field}' is {value}, above the maximum of {max}")]
    OutOfRange {
        /// Configuration key
        field: &'static str,
        /// Configured value
        value: u64,
        /// Largest accepted value
        max: u64,
    },

    /// An email address does not parse.
    #[error("invalid email address '{0}'")]
    InvalidEmailAddress(String),

    /// A notification channel is enabled but incomplete.
    #[error("{channel} notifications enabled but '{field}' is empty")]
    IncompleteChannel {
        /// Channel name
        channel: &'static str,
        /// Missing configuration key
        field: &'static str,
    },
}

/// Errors reading or writing the persisted state file.
#[derive(Error, Debug)]
pub enum StateError {
    /// File system error.
    #[error("State file I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The file exists but is not a valid state document.
    #[error("State file is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Errors delivering a notification to a sink.
#[derive(Error, Debug)]
pub enum NotifyError {
    /// Transport failure or non-success status from the sink.
    #[error("HTTP request failed: {0}")]
    Http(#[from] ReqwestError),

    /// The email message could not be assembled.
    #[error("Email could not be built: {0}")]
    Message(#[from] lettre::error::Error),

    /// The SMTP server could not be reached or refused the message.
    #[error("SMTP delivery failed: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),

    /// The sink did not answer in time.
    #[error("Timed out after {0:?}")]
    Timeout(std::time::Duration),
}

/// Classification of fetch failures, used for per-cycle statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum FetchFailureKind {
    Timeout,
    Connect,
    Redirect,
    BotDetection, // 403 Forbidden - typically bot detection
    NotFound,
    RateLimited,
    ClientError, // Other 4xx
    ServerError,
    Body,
    Proxy,
    Aborted, // the check task panicked
    Other,
}

impl std::fmt::Display for FetchFailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FetchFailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FetchFailureKind::Timeout => "Timeout",
            FetchFailureKind::Connect => "Connection error",
            FetchFailureKind::Redirect => "Redirect error",
            FetchFailureKind::BotDetection => "Bot detection (403 Forbidden)",
            FetchFailureKind::NotFound => "Not Found (404)",
            FetchFailureKind::RateLimited => "Too many requests (429)",
            FetchFailureKind::ClientError => "Other client error (4xx)",
            FetchFailureKind::ServerError => "Server error (5xx)",
            FetchFailureKind::Body => "Body read error",
            FetchFailureKind::Proxy => "Bypass proxy error",
            FetchFailureKind::Aborted => "Check aborted",
            FetchFailureKind::Other => "Other error",
        }
    }
}
