//! Fetch error categorization.

use super::types::{FetchError, FetchFailureKind};

/// Categorizes a `reqwest::Error` into a `FetchFailureKind`.
///
/// HTTP status codes are checked first (they are only present when the
/// request went through `error_for_status`), then the transport error class.
fn categorize_reqwest_error(error: &reqwest::Error) -> FetchFailureKind {
    if let Some(status) = error.status() {
        match status.as_u16() {
            403 => return FetchFailureKind::BotDetection,
            404 => return FetchFailureKind::NotFound,
            429 => return FetchFailureKind::RateLimited,
            _ if status.is_client_error() => return FetchFailureKind::ClientError,
            _ if status.is_server_error() => return FetchFailureKind::ServerError,
            _ => {}
        }
    }

    if error.is_timeout() {
        FetchFailureKind::Timeout
    } else if error.is_connect() {
        FetchFailureKind::Connect
    } else if error.is_redirect() {
        FetchFailureKind::Redirect
    } else if error.is_body() || error.is_decode() {
        FetchFailureKind::Body
    } else {
        FetchFailureKind::Other
    }
}

/// Categorizes any fetch error.
pub fn categorize_fetch_error(error: &FetchError) -> FetchFailureKind {
    match error {
        FetchError::Http(e) => categorize_reqwest_error(e),
        FetchError::Proxy(_) => FetchFailureKind::Proxy,
    }
}
