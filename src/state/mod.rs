//! Persisted monitor state.
//!
//! One JSON document holds the last known status of every tracker and the
//! seen-set of every tracker whose invites are scanned:
//!
//! ```json
//! {
//!   "trackers": {
//!     "AlphaTracker": {
//!       "is_open": true,
//!       "last_check": "2024-05-01T12:00:00Z",
//!       "last_status_change": "2024-05-01T12:00:00Z"
//!     }
//!   },
//!   "invite_seen": { "AlphaTracker": ["https://www.reddit.com/r/..."] }
//! }
//! ```

mod seen;
mod store;

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use seen::{filter_new, merge, SeenSet};
pub use store::StateStore;

/// Last known status of one tracker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusRecord {
    pub is_open: bool,
    /// Time of the last successful poll
    pub last_check: DateTime<Utc>,
    /// Time `is_open` last changed; never cleared once set
    #[serde(default)]
    pub last_status_change: Option<DateTime<Utc>>,
}

/// Everything that survives a restart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistedState {
    pub trackers: BTreeMap<String, StatusRecord>,
    pub invite_seen: BTreeMap<String, SeenSet>,
}

impl PersistedState {
    pub fn status(&self, name: &str) -> Option<&StatusRecord> {
        self.trackers.get(name)
    }

    /// The tracker's seen-set, empty if it has never been scanned.
    pub fn seen(&self, name: &str) -> SeenSet {
        self.invite_seen.get(name).cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_sections_default_to_empty() {
        let state: PersistedState = serde_json::from_str("{}").unwrap();
        assert!(state.trackers.is_empty());
        assert!(state.invite_seen.is_empty());
        assert!(state.seen("AlphaTracker").is_empty());
    }

    #[test]
    fn test_record_without_change_timestamp() {
        let json = r#"{"trackers": {"AlphaTracker": {"is_open": false, "last_check": "2024-05-01T12:00:00Z"}}}"#;
        let state: PersistedState = serde_json::from_str(json).unwrap();
        let record = state.status("AlphaTracker").unwrap();
        assert!(!record.is_open);
        assert!(record.last_status_change.is_none());
    }
}
