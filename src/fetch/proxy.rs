//! Bypass proxy client (FlareSolverr v1 API).
//!
//! The proxy runs a real browser to get past anti-bot challenges and returns
//! the rendered page. Request:
//! `{"cmd": "request.get", "url": ..., "maxTimeout": ms}`; response:
//! `{"status": "ok", "message": ..., "solution": {"response": "<html>"}}`.

use std::sync::Arc;
use std::time::Duration;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::config::{DIRECT_FETCH_TIMEOUT, PROXY_TIMEOUT_MARGIN};
use crate::error_handling::FetchError;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProxyRequest<'a> {
    cmd: &'static str,
    url: &'a str,
    max_timeout: u64,
}

#[derive(Debug, Deserialize)]
struct ProxyResponse {
    #[serde(default)]
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    solution: Option<ProxySolution>,
}

#[derive(Debug, Deserialize)]
struct ProxySolution {
    #[serde(default)]
    response: String,
}

/// Client for an external bypass proxy.
#[derive(Debug, Clone)]
pub struct BypassProxy {
    client: Arc<reqwest::Client>,
    endpoint: String,
    max_timeout_ms: u64,
}

impl BypassProxy {
    pub fn new(client: Arc<reqwest::Client>, endpoint: impl Into<String>, max_timeout_ms: u64) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            max_timeout_ms,
        }
    }

    /// Total time allowed for one proxy call.
    ///
    /// The proxy may legitimately spend its whole `maxTimeout` solving a
    /// challenge, so the HTTP timeout must cover that plus a normal fetch.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.max_timeout_ms) + DIRECT_FETCH_TIMEOUT + PROXY_TIMEOUT_MARGIN
    }

    /// Fetches `url` through the proxy.
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Http` for transport failures and non-success
    /// statuses, and `FetchError::Proxy` when the proxy reports an error.
    pub async fn get(&self, url: &str) -> Result<String, FetchError> {
        let payload = ProxyRequest {
            cmd: "request.get",
            url,
            max_timeout: self.max_timeout_ms,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&payload)
            .timeout(self.request_timeout())
            .send()
            .await?
            .error_for_status()?;
        let body: ProxyResponse = response.json().await?;

        if body.status == "ok" {
            debug!("Bypass proxy solved {}", url);
            Ok(body.solution.map(|s| s.response).unwrap_or_default())
        } else {
            Err(FetchError::Proxy(
                body.message.unwrap_or_else(|| "Unknown error".to_string()),
            ))
        }
    }
}
