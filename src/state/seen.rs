//! Per-tracker sets of already-reported scan keys.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::config::SEEN_SET_CAPACITY;
use crate::scan::ScanItem;

/// Ordered, bounded collection of deduplication keys (item URLs).
///
/// Insertion order defines age: when the set grows past its capacity the
/// oldest keys are evicted first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SeenSet(Vec<String>);

impl SeenSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.iter().any(|k| k == key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> &[String] {
        &self.0
    }
}

impl<S: Into<String>> FromIterator<S> for SeenSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        merge(SeenSet::new(), iter)
    }
}

/// Items whose key is not in `seen`, in their original order.
///
/// Pure: neither argument is modified. A key repeated within `items` is
/// returned once.
pub fn filter_new(items: &[ScanItem], seen: &SeenSet) -> Vec<ScanItem> {
    let known: HashSet<&str> = seen.0.iter().map(String::as_str).collect();
    let mut emitted = HashSet::new();
    items
        .iter()
        .filter(|item| !known.contains(item.url.as_str()) && emitted.insert(item.url.as_str()))
        .cloned()
        .collect()
}

/// Ordered union of `seen` and `keys`, truncated to the newest
/// [`SEEN_SET_CAPACITY`] entries.
pub fn merge<I, S>(seen: SeenSet, keys: I) -> SeenSet
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut merged = seen.0;
    let mut present: HashSet<String> = merged.iter().cloned().collect();
    for key in keys {
        let key = key.into();
        if present.insert(key.clone()) {
            merged.push(key);
        }
    }
    if merged.len() > SEEN_SET_CAPACITY {
        let excess = merged.len() - SEEN_SET_CAPACITY;
        merged.drain(..excess);
    }
    SeenSet(merged)
}
