//! Fixed list of pages scanned for tracker mentions.
//!
//! Each page is fetched once per scan and checked for every tracker name.
//! A page counts as a mention when the name and any keyword both occur in its
//! visible text. The item key is the page URL; since seen-sets are per
//! tracker, the same page can be reported once for each tracker it names.

use log::warn;

use super::{ScanHttp, ScanItem};
use crate::config::SNIPPET_RADIUS_CHARS;
use crate::utils::text::{snippet_around, visible_text};

#[derive(Debug, Clone)]
pub struct CustomUrlsSource {
    urls: Vec<String>,
}

impl CustomUrlsSource {
    pub fn new(urls: Vec<String>) -> Self {
        Self { urls }
    }

    pub(crate) async fn scan(
        &self,
        http: &ScanHttp,
        names: &[&str],
        keywords: &[String],
    ) -> Vec<(String, Vec<ScanItem>)> {
        let mut pages = Vec::with_capacity(self.urls.len());
        for url in &self.urls {
            match http.text(http.client().get(url)).await {
                Ok(html) => pages.push((url.as_str(), visible_text(&html))),
                Err(e) => warn!("Failed to scan {}: {}", url, e),
            }
        }

        names
            .iter()
            .map(|name| {
                let items = pages
                    .iter()
                    .filter_map(|(url, text)| page_mention(url, text, name, keywords))
                    .collect();
                (name.to_string(), items)
            })
            .collect()
    }
}

fn page_mention(url: &str, text: &str, name: &str, keywords: &[String]) -> Option<ScanItem> {
    let lower = text.to_lowercase();
    if !super::classify::mentions(&lower, &name.to_lowercase(), keywords) {
        return None;
    }
    let host = url::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .unwrap_or_else(|| url.to_string());
    let snippet = snippet_around(text, name, SNIPPET_RADIUS_CHARS).unwrap_or_default();
    Some(
        ScanItem::new(host.clone(), format!("{} mentioned on {}", name, host), url)
            .with_snippet(snippet),
    )
}
