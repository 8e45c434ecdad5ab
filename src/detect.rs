//! Status transition detection.
//!
//! | prior `is_open` | verdict | result    |
//! |-----------------|---------|-----------|
//! | absent          | true    | Opened    |
//! | absent          | false   | Unchanged |
//! | false           | true    | Opened    |
//! | true            | false   | Closed    |
//! | same as verdict |         | Unchanged |
//!
//! A fetch failure produces no verdict, so [`detect`] is never called for it
//! and the stored record stays as it was.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::state::StatusRecord;

/// Classification of a verdict relative to the stored status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Now open; was closed or never seen. The only notifying transition.
    Opened,
    /// Was open, now closed. Logged, not notified.
    Closed,
    Unchanged,
}

/// Applies `verdict` for `name` to `records` and classifies the change.
///
/// `last_check` is always set to `now`; `last_status_change` only on
/// `Opened` and `Closed`.
pub fn detect(
    name: &str,
    verdict: bool,
    records: &mut BTreeMap<String, StatusRecord>,
    now: DateTime<Utc>,
) -> Transition {
    let prior = records.get(name).map(|r| r.is_open);
    let transition = match (prior, verdict) {
        (None | Some(false), true) => Transition::Opened,
        (Some(true), false) => Transition::Closed,
        _ => Transition::Unchanged,
    };

    let record = records
        .entry(name.to_string())
        .or_insert_with(|| StatusRecord {
            is_open: verdict,
            last_check: now,
            last_status_change: None,
        });
    record.is_open = verdict;
    record.last_check = now;
    if transition != Transition::Unchanged {
        record.last_status_change = Some(now);
    }
    transition
}
