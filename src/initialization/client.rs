//! HTTP client initialization.
//!
//! One shared client serves page fetches, proxy calls, scanners and
//! notification sinks. Per-request timeouts override the default where a
//! caller needs a longer or shorter budget.

use std::sync::Arc;
use std::time::Duration;

use reqwest::ClientBuilder;

use crate::config::{MAX_REDIRECT_HOPS, TCP_CONNECT_TIMEOUT};

/// Initializes the shared HTTP client.
///
/// Creates a `reqwest::Client` configured with:
/// - the given User-Agent header
/// - the given overall request timeout
/// - a short TCP connect timeout
/// - redirect following (up to `MAX_REDIRECT_HOPS` hops)
///
/// # Errors
///
/// Returns a `reqwest::Error` if client creation fails.
pub fn init_client(
    user_agent: &str,
    timeout: Duration,
) -> Result<Arc<reqwest::Client>, reqwest::Error> {
    let client = ClientBuilder::new()
        .timeout(timeout)
        .connect_timeout(TCP_CONNECT_TIMEOUT)
        .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECT_HOPS))
        .user_agent(user_agent)
        .build()?;
    Ok(Arc::new(client))
}
