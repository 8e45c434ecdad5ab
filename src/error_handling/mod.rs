//! Error handling and cycle statistics.
//!
//! This module provides:
//! - Error type definitions for each concern (init, fetch, config, state, notify)
//! - Fetch failure categorization
//! - Per-cycle statistics tracking

mod categorization;
mod stats;
mod types;

// Re-export public API
pub use categorization::categorize_fetch_error;
pub use stats::CycleStats;
pub use types::{
    ConfigError, FetchError, FetchFailureKind, InitializationError, NotifyError, StateError,
};
