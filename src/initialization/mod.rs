//! Application initialization.
//!
//! Logger, shared HTTP client and request pacing.

mod client;
mod logger;
mod rate_limiter;

pub use client::init_client;
pub use logger::init_logger_with;
pub use rate_limiter::{init_rate_limiter, RateLimiter};
