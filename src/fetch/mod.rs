//! Page retrieval.
//!
//! A [`ContentFetcher`] gets the raw content of a tracker page, either
//! directly or through the bypass proxy. When the proxy is selected but
//! fails, the fetcher falls back to one direct attempt before giving up.
//! Nothing is retried beyond that within a cycle; the next poll is the retry.

mod proxy;
mod request;

use std::sync::Arc;

use log::{debug, warn};

use crate::config::FlareSolverrConfig;
use crate::error_handling::FetchError;
use crate::models::Target;

pub use proxy::BypassProxy;
use request::RequestHeaders;

/// Fetches page content for targets and scanners.
#[derive(Debug, Clone)]
pub struct ContentFetcher {
    client: Arc<reqwest::Client>,
    proxy: Option<BypassProxy>,
    proxy_by_default: bool,
}

impl ContentFetcher {
    /// Creates a fetcher.
    ///
    /// `proxy_by_default` applies to targets without their own
    /// `use_flaresolverr` setting.
    pub fn new(
        client: Arc<reqwest::Client>,
        proxy: Option<BypassProxy>,
        proxy_by_default: bool,
    ) -> Self {
        Self {
            client,
            proxy,
            proxy_by_default,
        }
    }

    /// Creates a fetcher from the `flaresolverr` configuration section.
    ///
    /// The proxy client is built whenever an endpoint is configured, so a
    /// single tracker can opt in even when the global default is off.
    pub fn from_config(client: Arc<reqwest::Client>, config: &FlareSolverrConfig) -> Self {
        let proxy = (!config.url.trim().is_empty())
            .then(|| BypassProxy::new(Arc::clone(&client), config.url.clone(), config.max_timeout));
        Self::new(client, proxy, config.enabled)
    }

    pub fn client(&self) -> &Arc<reqwest::Client> {
        &self.client
    }

    /// Whether `target` is fetched through the proxy.
    pub fn should_use_proxy(&self, target: &Target) -> bool {
        self.proxy.is_some() && target.use_flaresolverr.unwrap_or(self.proxy_by_default)
    }

    /// Fetches the content of `target.url`.
    ///
    /// # Errors
    ///
    /// Returns the direct-request error when the page could not be retrieved
    /// by any route.
    pub async fn fetch(&self, target: &Target) -> Result<String, FetchError> {
        if let Some(proxy) = self.proxy.as_ref().filter(|_| self.should_use_proxy(target)) {
            debug!("Fetching {} via bypass proxy", target.name);
            match proxy.get(&target.url).await {
                Ok(content) => return Ok(content),
                Err(e) => warn!(
                    "Bypass proxy failed for {}, trying direct request: {}",
                    target.name, e
                ),
            }
        }
        if self.proxy.is_none() && target.use_flaresolverr == Some(true) {
            debug!("No bypass proxy configured for {}, fetching directly", target.name);
        }
        self.fetch_direct(&target.url).await
    }

    /// Plain GET with browser headers.
    ///
    /// Any status outside 2xx is an error. Redirects are followed by the
    /// client.
    pub async fn fetch_direct(&self, url: &str) -> Result<String, FetchError> {
        let response = RequestHeaders::apply_to_request_builder(self.client.get(url))
            .send()
            .await?
            .error_for_status()?;
        Ok(response.text().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DEFAULT_USER_AGENT, DIRECT_FETCH_TIMEOUT};
    use crate::initialization::init_client;
    use crate::matching::MatchStrategy;
    use httptest::matchers::request;
    use httptest::{matchers::*, responders::*, Expectation, Server};
    use serde_json::json;

    fn target(url: String, use_flaresolverr: Option<bool>) -> Target {
        Target {
            name: "AlphaTracker".to_string(),
            signup_url: url.clone(),
            url,
            strategy: MatchStrategy::text_match(&["open"], &[]),
            use_flaresolverr,
            scan_invites: false,
        }
    }

    fn client() -> Arc<reqwest::Client> {
        init_client(DEFAULT_USER_AGENT, DIRECT_FETCH_TIMEOUT).unwrap()
    }

    #[tokio::test]
    async fn test_direct_fetch_returns_body() {
        let server = Server::run();
        server.expect(
            Expectation::matching(all_of![
                request::method_path("GET", "/signup"),
                request::headers(contains(("accept-language", "en-US,en;q=0.9"))),
            ])
            .respond_with(status_code(200).body("Signups open")),
        );

        let fetcher = ContentFetcher::new(client(), None, false);
        let content = fetcher
            .fetch(&target(server.url_str("/signup"), None))
            .await
            .unwrap();
        assert_eq!(content, "Signups open");
    }

    #[tokio::test]
    async fn test_non_success_status_is_error() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("GET", "/signup"))
                .respond_with(status_code(503)),
        );

        let fetcher = ContentFetcher::new(client(), None, false);
        let result = fetcher.fetch(&target(server.url_str("/signup"), None)).await;
        assert!(matches!(result, Err(FetchError::Http(_))));
    }

    #[tokio::test]
    async fn test_proxy_used_when_enabled() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("POST", "/v1")).respond_with(
                json_encoded(json!({"status": "ok", "solution": {"response": "via proxy"}})),
            ),
        );
        server.expect(
            Expectation::matching(request::method_path("GET", "/signup"))
                .times(0)
                .respond_with(status_code(500)),
        );

        let client = client();
        let proxy = BypassProxy::new(Arc::clone(&client), server.url_str("/v1"), 1_000);
        let fetcher = ContentFetcher::new(client, Some(proxy), true);
        let content = fetcher
            .fetch(&target(server.url_str("/signup"), None))
            .await
            .unwrap();
        assert_eq!(content, "via proxy");
    }

    #[tokio::test]
    async fn test_proxy_failure_falls_back_to_direct() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("POST", "/v1"))
                .respond_with(json_encoded(json!({"status": "error", "message": "timeout"}))),
        );
        server.expect(
            Expectation::matching(request::method_path("GET", "/signup"))
                .respond_with(status_code(200).body("direct content")),
        );

        let client = client();
        let proxy = BypassProxy::new(Arc::clone(&client), server.url_str("/v1"), 1_000);
        let fetcher = ContentFetcher::new(client, Some(proxy), true);
        let content = fetcher
            .fetch(&target(server.url_str("/signup"), None))
            .await
            .unwrap();
        assert_eq!(content, "direct content");
    }

    #[tokio::test]
    async fn test_per_target_override_disables_proxy() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("POST", "/v1"))
                .times(0)
                .respond_with(status_code(500)),
        );
        server.expect(
            Expectation::matching(request::method_path("GET", "/signup"))
                .respond_with(status_code(200).body("direct")),
        );

        let client = client();
        let proxy = BypassProxy::new(Arc::clone(&client), server.url_str("/v1"), 1_000);
        let fetcher = ContentFetcher::new(client, Some(proxy), true);
        let content = fetcher
            .fetch(&target(server.url_str("/signup"), Some(false)))
            .await
            .unwrap();
        assert_eq!(content, "direct");
    }

    #[test]
    fn test_should_use_proxy_requires_endpoint() {
        let fetcher = ContentFetcher::new(client(), None, true);
        assert!(!fetcher.should_use_proxy(&target("http://t/".into(), Some(true))));
    }

    #[test]
    fn test_per_target_override_enables_proxy() {
        let client = client();
        let proxy = BypassProxy::new(Arc::clone(&client), "http://proxy/v1", 1_000);
        let fetcher = ContentFetcher::new(client, Some(proxy), false);
        assert!(!fetcher.should_use_proxy(&target("http://t/".into(), None)));
        assert!(fetcher.should_use_proxy(&target("http://t/".into(), Some(true))));
    }
}
