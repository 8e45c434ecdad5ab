//! Invite scanning across secondary sources.
//!
//! A [`SourceScanner`] asks every enabled [`InviteSource`] for mentions of
//! each tracker and returns, per tracker, the concatenated results in source
//! order. Every request is paced by a shared limiter and fails on its own: a
//! broken subreddit, query or page is logged and skipped.

mod classify;
mod custom_urls;
mod reddit;
mod web_search;

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use serde::Serialize;

use crate::config::InviteScanConfig;
use crate::error_handling::FetchError;
use crate::initialization::{init_rate_limiter, RateLimiter};

pub use custom_urls::CustomUrlsSource;
pub use reddit::RedditSource;
pub use web_search::WebSearchSource;

/// A discovered mention of a tracker.
///
/// `url` is the deduplication key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanItem {
    /// Where the item came from, e.g. `r/OpenSignups`
    pub source: String,
    pub title: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<i64>,
    pub discovered_at: DateTime<Utc>,
}

impl ScanItem {
    pub fn new(
        source: impl Into<String>,
        title: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            title: title.into(),
            url: url.into(),
            snippet: None,
            author: None,
            score: None,
            discovered_at: Utc::now(),
        }
    }

    pub fn with_snippet(mut self, snippet: impl Into<String>) -> Self {
        let snippet = snippet.into();
        self.snippet = (!snippet.trim().is_empty()).then_some(snippet);
        self
    }

    pub fn with_author(mut self, author: Option<String>) -> Self {
        self.author = author;
        self
    }

    pub fn with_score(mut self, score: Option<i64>) -> Self {
        self.score = score;
        self
    }
}

/// One configured secondary source with its own parameters.
#[derive(Debug, Clone)]
pub enum InviteSource {
    Reddit(RedditSource),
    WebSearch(WebSearchSource),
    CustomUrls(CustomUrlsSource),
}

impl InviteSource {
    pub fn label(&self) -> &'static str {
        match self {
            InviteSource::Reddit(_) => "reddit",
            InviteSource::WebSearch(_) => "web_search",
            InviteSource::CustomUrls(_) => "custom_urls",
        }
    }
}

/// HTTP access shared by all sources.
#[derive(Debug, Clone)]
pub(crate) struct ScanHttp {
    client: Arc<reqwest::Client>,
    limiter: Option<Arc<RateLimiter>>,
}

impl ScanHttp {
    /// Sends a paced request and returns the response body.
    ///
    /// Non-success statuses are errors.
    pub(crate) async fn text(&self, request: reqwest::RequestBuilder) -> Result<String, FetchError> {
        if let Some(limiter) = &self.limiter {
            limiter.acquire().await;
        }
        let response = request.send().await?.error_for_status()?;
        Ok(response.text().await?)
    }

    pub(crate) fn client(&self) -> &reqwest::Client {
        &self.client
    }
}

/// Runs every enabled invite source.
#[derive(Debug, Clone)]
pub struct SourceScanner {
    http: ScanHttp,
    keywords: Vec<String>,
    sources: Vec<InviteSource>,
}

impl SourceScanner {
    pub fn new(
        client: Arc<reqwest::Client>,
        limiter: Option<Arc<RateLimiter>>,
        keywords: &[String],
        sources: Vec<InviteSource>,
    ) -> Self {
        let keywords = keywords
            .iter()
            .map(|k| k.trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();
        Self {
            http: ScanHttp { client, limiter },
            keywords,
            sources,
        }
    }

    /// Builds the scanner from the `invite_scan` section, keeping only the
    /// enabled sources.
    pub fn from_config(client: Arc<reqwest::Client>, config: &InviteScanConfig) -> Self {
        let mut sources = Vec::new();
        if config.reddit.enabled {
            match RedditSource::from_config(&config.reddit) {
                Ok(source) => sources.push(InviteSource::Reddit(source)),
                Err(e) => warn!("Disabling Reddit invite source: {}", e),
            }
        }
        if config.web_search.enabled {
            sources.push(InviteSource::WebSearch(WebSearchSource::new(
                config.web_search.base_url.clone(),
            )));
        }
        if config.custom_urls.enabled {
            sources.push(InviteSource::CustomUrls(CustomUrlsSource::new(
                config.custom_urls.urls.clone(),
            )));
        }
        let limiter = init_rate_limiter(config.request_delay_seconds);
        Self::new(client, limiter, &config.keywords, sources)
    }

    pub fn sources(&self) -> &[InviteSource] {
        &self.sources
    }

    /// Scans all sources for every name.
    ///
    /// Every name gets an entry, possibly empty. Items keep source order;
    /// duplicates across sources are not merged here.
    pub async fn scan(&self, names: &[&str]) -> BTreeMap<String, Vec<ScanItem>> {
        let mut results: BTreeMap<String, Vec<ScanItem>> = names
            .iter()
            .map(|name| (name.to_string(), Vec::new()))
            .collect();
        if names.is_empty() || self.keywords.is_empty() {
            debug!("Invite scan skipped: no trackers or no keywords");
            return results;
        }

        for source in &self.sources {
            let found = match source {
                InviteSource::Reddit(s) => s.scan(&self.http, names, &self.keywords).await,
                InviteSource::WebSearch(s) => s.scan(&self.http, names, &self.keywords).await,
                InviteSource::CustomUrls(s) => s.scan(&self.http, names, &self.keywords).await,
            };
            for (name, items) in found {
                debug!("{} found {} items for {}", source.label(), items.len(), name);
                results.entry(name).or_default().extend(items);
            }
        }

        let total: usize = results.values().map(Vec::len).sum();
        info!("Invite scan finished: {} candidate items", total);
        results
    }
}
