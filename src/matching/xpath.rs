//! XPath 1.0 queries over parsed HTML.
//!
//! Pages are parsed with `sxd_html` into an `sxd_document` tree and queried
//! with `sxd_xpath`, so the full XPath 1.0 language is available: unions,
//! `or`/`not()`, string functions and so on.
//!
//! A result counts as a match the way a truthiness test would read it: a
//! non-empty node-set, `true`, a non-zero number or a non-empty string.

use log::warn;
use sxd_xpath::{Context, Factory, Value};

use crate::error_handling::ConfigError;

/// A validated XPath expression.
///
/// Compiled expressions from `sxd_xpath` are neither `Send` nor `Sync`, so
/// only the validated source is kept and it is compiled again per
/// evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XPath {
    source: String,
}

impl XPath {
    /// Validates `expr`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidXPath` when the expression is empty or
    /// does not parse.
    pub fn parse(expr: &str) -> Result<Self, ConfigError> {
        compile(expr)?;
        Ok(Self {
            source: expr.to_string(),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Whether the expression matches anything in `content`.
    ///
    /// Evaluation failures (an unknown function, say) are logged and read
    /// as no match.
    pub fn matches(&self, content: &str) -> bool {
        let xpath = match compile(&self.source) {
            Ok(xpath) => xpath,
            Err(e) => {
                warn!("{}", e);
                return false;
            }
        };
        let package = sxd_html::parse_html(content);
        let document = package.as_document();
        let context = Context::new();
        match xpath.evaluate(&context, document.root()) {
            Ok(value) => truthy(&value),
            Err(e) => {
                warn!("XPath '{}' failed to evaluate: {}", self.source, e);
                false
            }
        }
    }
}

fn compile(expr: &str) -> Result<sxd_xpath::XPath, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidXPath {
        expr: expr.to_string(),
        reason,
    };
    match Factory::new().build(expr) {
        Ok(Some(xpath)) => Ok(xpath),
        Ok(None) => Err(invalid("empty expression".to_string())),
        Err(e) => Err(invalid(e.to_string())),
    }
}

fn truthy(value: &Value<'_>) -> bool {
    match value {
        Value::Nodeset(nodes) => nodes.size() > 0,
        Value::Boolean(b) => *b,
        Value::Number(n) => *n != 0.0,
        Value::String(s) => !s.is_empty(),
    }
}
