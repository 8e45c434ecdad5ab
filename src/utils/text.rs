//! Plain-text helpers for scanned pages and notification bodies.

use scraper::{Html, Node};

const INVISIBLE_ELEMENTS: &[&str] = &["script", "style", "noscript", "template", "head"];

/// Visible text of an HTML document, whitespace-collapsed.
///
/// Text inside `script`, `style`, `noscript`, `template` and `head` is
/// skipped.
pub fn visible_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut parts: Vec<&str> = Vec::new();
    for node in document.tree.root().descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };
        let hidden = node.ancestors().any(|a| {
            a.value()
                .as_element()
                .is_some_and(|e| INVISIBLE_ELEMENTS.contains(&e.name()))
        });
        if !hidden {
            parts.push(text);
        }
    }
    collapse_whitespace(&parts.join(" "))
}

/// Replaces every whitespace run with a single space and trims the ends.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Truncates to at most `max_chars` characters, appending `...` when cut.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", text[..idx].trim_end()),
        None => text.to_string(),
    }
}

/// Context around the first case-insensitive occurrence of `needle`.
///
/// Returns up to `radius` characters on each side of the match, or `None`
/// when `needle` does not occur.
pub fn snippet_around(text: &str, needle: &str, radius: usize) -> Option<String> {
    let pattern = regex::RegexBuilder::new(&regex::escape(needle))
        .case_insensitive(true)
        .build()
        .ok()?;
    let found = pattern.find(text)?;

    let start = text[..found.start()]
        .char_indices()
        .rev()
        .nth(radius.saturating_sub(1))
        .map_or(0, |(i, _)| i);
    let end = text[found.end()..]
        .char_indices()
        .nth(radius)
        .map_or(text.len(), |(i, _)| found.end() + i);

    let mut snippet = text[start..end].trim().to_string();
    if start > 0 {
        snippet.insert_str(0, "...");
    }
    if end < text.len() {
        snippet.push_str("...");
    }
    Some(snippet)
}
