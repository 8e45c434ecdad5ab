//! Subreddit search.
//!
//! Uses the public listing endpoint
//! `/r/{subreddit}/search.json?q=...&restrict_sr=on&sort=new`, which needs no
//! credentials.

use chrono::{DateTime, TimeDelta, Utc};
use log::warn;
use serde::Deserialize;

use super::classify;
use super::{ScanHttp, ScanItem};
use crate::config::{
    RedditConfig, MAX_POST_AGE_HOURS, MAX_POST_SNIPPET_CHARS, REDDIT_SEARCH_LIMIT,
};
use crate::error_handling::ConfigError;
use crate::utils::text::{collapse_whitespace, truncate_chars};

/// Permalinks are keyed against the canonical host, whatever mirror was
/// queried, so seen-sets stay stable.
const PERMALINK_BASE: &str = "https://www.reddit.com";

#[derive(Debug, Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    #[serde(default)]
    children: Vec<Child>,
}

#[derive(Debug, Deserialize)]
struct Child {
    data: Post,
}

#[derive(Debug, Clone, Deserialize)]
struct Post {
    #[serde(default)]
    title: String,
    #[serde(default)]
    selftext: String,
    #[serde(default)]
    permalink: String,
    #[serde(default)]
    author: Option<String>,
    #[serde(default)]
    score: Option<i64>,
    #[serde(default)]
    created_utc: f64,
}

/// Searches a list of subreddits for invite offers.
#[derive(Debug, Clone)]
pub struct RedditSource {
    base_url: String,
    subreddits: Vec<String>,
    max_age_hours: u64,
}

impl RedditSource {
    pub fn new(base_url: impl Into<String>, subreddits: Vec<String>, max_age_hours: u64) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            subreddits,
            max_age_hours,
        }
    }

    /// # Errors
    ///
    /// Returns `ConfigError::OutOfRange` when `max_age_hours` exceeds
    /// `MAX_POST_AGE_HOURS`.
    pub fn from_config(config: &RedditConfig) -> Result<Self, ConfigError> {
        if config.max_age_hours > MAX_POST_AGE_HOURS {
            return Err(ConfigError::OutOfRange {
                field: "max_age_hours",
                value: config.max_age_hours,
                max: MAX_POST_AGE_HOURS,
            });
        }
        Ok(Self::new(
            config.base_url.clone(),
            config.subreddits.clone(),
            config.max_age_hours,
        ))
    }

    /// Listing time filter wide enough for the age window.
    fn time_filter(&self) -> &'static str {
        match self.max_age_hours {
            0..=1 => "hour",
            2..=24 => "day",
            25..=168 => "week",
            169..=744 => "month",
            745..=8_784 => "year",
            _ => "all",
        }
    }

    /// Oldest creation time still accepted. Saturates at the earliest
    /// representable instant instead of overflowing.
    fn cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        i64::try_from(self.max_age_hours)
            .ok()
            .and_then(TimeDelta::try_hours)
            .and_then(|age| now.checked_sub_signed(age))
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    pub(crate) async fn scan(
        &self,
        http: &ScanHttp,
        names: &[&str],
        keywords: &[String],
    ) -> Vec<(String, Vec<ScanItem>)> {
        let cutoff = self.cutoff(Utc::now());
        let mut results = Vec::with_capacity(names.len());
        for name in names {
            let mut items = Vec::new();
            for subreddit in &self.subreddits {
                match self.search(http, subreddit, name).await {
                    Ok(posts) => items.extend(
                        posts
                            .iter()
                            .filter_map(|post| offer_item(post, subreddit, name, keywords, cutoff)),
                    ),
                    Err(e) => warn!("Reddit search in r/{} for {} failed: {}", subreddit, name, e),
                }
            }
            results.push((name.to_string(), items));
        }
        results
    }

    async fn search(
        &self,
        http: &ScanHttp,
        subreddit: &str,
        name: &str,
    ) -> anyhow::Result<Vec<Post>> {
        let endpoint = format!("{}/r/{}/search.json", self.base_url, subreddit);
        let limit = REDDIT_SEARCH_LIMIT.to_string();
        let request = http.client().get(&endpoint).query(&[
            ("q", name),
            ("restrict_sr", "on"),
            ("sort", "new"),
            ("t", self.time_filter()),
            ("limit", limit.as_str()),
        ]);
        let body = http.text(request).await?;
        let listing: Listing = serde_json::from_str(&body)?;
        Ok(listing.data.children.into_iter().map(|c| c.data).collect())
    }
}

/// Converts a post into an item when it is recent, mentions the tracker
/// with a keyword, and reads as an offer.
fn offer_item(
    post: &Post,
    subreddit: &str,
    name: &str,
    keywords: &[String],
    cutoff: DateTime<Utc>,
) -> Option<ScanItem> {
    let created = DateTime::<Utc>::from_timestamp(post.created_utc as i64, 0)?;
    if created < cutoff || post.permalink.is_empty() {
        return None;
    }
    let title = post.title.to_lowercase();
    let body = post.selftext.to_lowercase();
    let text = format!("{} {}", title, body);
    if !classify::mentions(&text, &name.to_lowercase(), keywords)
        || !classify::is_offer(&title, &body)
    {
        return None;
    }

    let url = format!("{}{}", PERMALINK_BASE, post.permalink);
    Some(
        ScanItem::new(format!("r/{}", subreddit), post.title.trim(), url)
            .with_snippet(truncate_chars(
                &collapse_whitespace(&post.selftext),
                MAX_POST_SNIPPET_CHARS,
            ))
            .with_author(post.author.clone())
            .with_score(post.score),
    )
}
