//! General web search through DuckDuckGo's HTML endpoint.
//!
//! One query per tracker and keyword: `"<name>" <keyword>`.

use std::sync::LazyLock;

use log::warn;
use scraper::{Html, Selector};

use super::classify;
use super::{ScanHttp, ScanItem};
use crate::utils::parse_selector_unsafe;
use crate::utils::text::collapse_whitespace;

const SOURCE_LABEL: &str = "web search";

static RESULT_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| parse_selector_unsafe(".result", "RESULT_SELECTOR"));
static TITLE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| parse_selector_unsafe("a.result__a", "TITLE_SELECTOR"));
static SNIPPET_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| parse_selector_unsafe(".result__snippet", "SNIPPET_SELECTOR"));

/// One organic result from the results page.
#[derive(Debug, Clone, PartialEq)]
struct SearchResult {
    title: String,
    url: String,
    snippet: String,
}

#[derive(Debug, Clone)]
pub struct WebSearchSource {
    base_url: String,
}

impl WebSearchSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    pub(crate) async fn scan(
        &self,
        http: &ScanHttp,
        names: &[&str],
        keywords: &[String],
    ) -> Vec<(String, Vec<ScanItem>)> {
        let mut results = Vec::with_capacity(names.len());
        for name in names {
            let mut items = Vec::new();
            for keyword in keywords {
                let query = format!("\"{}\" {}", name, keyword);
                let request = http.client().get(&self.base_url).query(&[("q", &query)]);
                match http.text(request).await {
                    Ok(page) => items.extend(
                        parse_results(&page, &self.base_url)
                            .into_iter()
                            .filter(|r| is_offer_result(r, name))
                            .map(|r| {
                                ScanItem::new(SOURCE_LABEL, r.title, r.url).with_snippet(r.snippet)
                            }),
                    ),
                    Err(e) => warn!("Web search for {} failed: {}", query, e),
                }
            }
            results.push((name.to_string(), items));
        }
        results
    }
}

/// A result is kept when it names the tracker and its title is not a
/// request.
fn is_offer_result(result: &SearchResult, name: &str) -> bool {
    let name = name.to_lowercase();
    let title = result.title.to_lowercase();
    let snippet = result.snippet.to_lowercase();
    (title.contains(&name) || snippet.contains(&name)) && !classify::is_request(&title)
}

fn parse_results(page: &str, base_url: &str) -> Vec<SearchResult> {
    let document = Html::parse_document(page);
    document
        .select(&RESULT_SELECTOR)
        .filter_map(|result| {
            let link = result.select(&TITLE_SELECTOR).next()?;
            let href = link.value().attr("href")?;
            let url = resolve_result_url(href, base_url)?;
            let title = collapse_whitespace(&link.text().collect::<String>());
            let snippet = result
                .select(&SNIPPET_SELECTOR)
                .next()
                .map(|s| collapse_whitespace(&s.text().collect::<String>()))
                .unwrap_or_default();
            Some(SearchResult {
                title,
                url,
                snippet,
            })
        })
        .collect()
}

/// Result links go through a redirector (`/l/?uddg=<target>`); returns the
/// real target.
fn resolve_result_url(href: &str, base_url: &str) -> Option<String> {
    let base = url::Url::parse(base_url).ok()?;
    let link = base.join(href).ok()?;
    let target = link
        .query_pairs()
        .find(|(k, _)| k == "uddg")
        .map(|(_, v)| v.into_owned())
        .unwrap_or_else(|| link.to_string());
    matches!(url::Url::parse(&target).ok()?.scheme(), "http" | "https").then_some(target)
}
