//! CSS selector parsing for built-in selectors.

use scraper::Selector;

/// Parses a CSS selector that must succeed (for compile-time constants).
///
/// Selectors from user configuration go through
/// [`MatchStrategy::from_method`](crate::matching::MatchStrategy::from_method)
/// instead, which reports a `ConfigError`.
///
/// # Panics
///
/// Panics if the selector cannot be parsed (indicates a programming error).
pub fn parse_selector_unsafe(selector_str: &str, context: &str) -> Selector {
    Selector::parse(selector_str).unwrap_or_else(|e| {
        panic!(
            "Failed to parse CSS selector '{}' in {}: {}. This is a programming error.",
            selector_str, context, e
        )
    })
}
