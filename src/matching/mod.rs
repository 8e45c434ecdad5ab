//! Page content evaluation.
//!
//! A tracker's matching strategy turns fetched page content into a verdict:
//! `true` when the watched condition (e.g. "signups are open") holds.
//!
//! Strategies are validated and compiled when the configuration is loaded, so
//! evaluation itself cannot fail: an unknown method name or an unparsable
//! query is a [`ConfigError`] at load time, never a `false` verdict at poll
//! time.

mod xpath;

use scraper::{Html, Selector};

use crate::error_handling::ConfigError;

pub use xpath::XPath;

/// Raw strategy parameters, as found in a tracker's configuration entry.
#[derive(Debug, Clone, Copy)]
pub struct MatchParams<'a> {
    pub match_text: &'a [String],
    pub not_match_text: &'a [String],
    pub xpath: Option<&'a str>,
    pub css_selector: Option<&'a str>,
}

/// A compiled matching strategy.
#[derive(Debug, Clone)]
pub enum MatchStrategy {
    /// Case-insensitive substring matching. Terms are stored lowercased.
    TextMatch {
        /// Any of these present means open (unless excluded)
        include: Vec<String>,
        /// Any of these present means closed, regardless of `include`
        exclude: Vec<String>,
    },
    /// True iff the XPath expression selects at least one node (or yields a
    /// true, non-zero or non-empty scalar).
    XPath(XPath),
    /// True iff the selector matches at least one element.
    CssSelector(Selector),
}

impl MatchStrategy {
    /// Builds a strategy from its configured method name and parameters.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` for an unknown method, a missing required
    /// parameter, or a query that does not parse.
    pub fn from_method(method: &str, params: MatchParams<'_>) -> Result<Self, ConfigError> {
        match method.trim() {
            "text_match" => Ok(Self::text_match(params.match_text, params.not_match_text)),
            "xpath" => {
                let expr = non_empty(params.xpath).ok_or(ConfigError::MissingParameter {
                    method: "xpath",
                    field: "xpath",
                })?;
                Ok(MatchStrategy::XPath(XPath::parse(expr)?))
            }
            "css_selector" => {
                let selector =
                    non_empty(params.css_selector).ok_or(ConfigError::MissingParameter {
                        method: "css_selector",
                        field: "css_selector",
                    })?;
                let compiled =
                    Selector::parse(selector).map_err(|e| ConfigError::InvalidSelector {
                        selector: selector.to_string(),
                        reason: e.to_string(),
                    })?;
                Ok(MatchStrategy::CssSelector(compiled))
            }
            other => Err(ConfigError::UnknownMethod(other.to_string())),
        }
    }

    /// Builds a text strategy; blank terms are dropped.
    pub fn text_match<S: AsRef<str>>(include: &[S], exclude: &[S]) -> Self {
        let normalize = |terms: &[S]| {
            terms
                .iter()
                .map(|t| t.as_ref().to_lowercase())
                .filter(|t| !t.trim().is_empty())
                .collect()
        };
        MatchStrategy::TextMatch {
            include: normalize(include),
            exclude: normalize(exclude),
        }
    }

    /// Configuration name of this strategy.
    pub fn method_name(&self) -> &'static str {
        match self {
            MatchStrategy::TextMatch { .. } => "text_match",
            MatchStrategy::XPath(_) => "xpath",
            MatchStrategy::CssSelector(_) => "css_selector",
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Evaluates page content against a strategy.
pub fn evaluate(content: &str, strategy: &MatchStrategy) -> bool {
    match strategy {
        MatchStrategy::TextMatch { include, exclude } => text_matches(content, include, exclude),
        MatchStrategy::XPath(expr) => expr.matches(content),
        MatchStrategy::CssSelector(selector) => Html::parse_document(content)
            .select(selector)
            .next()
            .is_some(),
    }
}

/// Exclusion terms are checked first and win over inclusion terms.
///
/// Terms must already be lowercase.
fn text_matches(content: &str, include: &[String], exclude: &[String]) -> bool {
    let content = content.to_lowercase();
    if exclude.iter().any(|term| content.contains(term.as_str())) {
        return false;
    }
    include.iter().any(|term| content.contains(term.as_str()))
}
