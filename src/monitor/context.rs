//! Shared resources for monitor cycles.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::config::{FileConfig, DEFAULT_USER_AGENT, DIRECT_FETCH_TIMEOUT};
use crate::fetch::ContentFetcher;
use crate::initialization::init_client;
use crate::models::Target;
use crate::notify::Notifier;
use crate::scan::SourceScanner;
use crate::state::StateStore;

/// Everything a cycle needs, built once at startup.
///
/// Cycles receive it behind an `Arc`; nothing in it is mutated after
/// construction. The mutable part of the monitor is the persisted state,
/// which is passed to each cycle by value.
#[derive(Debug)]
pub struct MonitorContext {
    /// Enabled, valid trackers in polling order
    pub targets: Vec<Target>,
    pub fetcher: ContentFetcher,
    pub notifier: Notifier,
    /// `None` when invite scanning is disabled
    pub scanner: Option<SourceScanner>,
    pub store: StateStore,
    pub check_interval: Duration,
    /// Pause between two trackers within a pass
    pub check_delay: Duration,
    pub invite_scan_interval: Duration,
}

impl MonitorContext {
    /// Builds the context from a loaded configuration.
    ///
    /// Invalid trackers and incomplete notification channels are logged and
    /// left out; only the HTTP client itself can fail here.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn from_config(config: &FileConfig) -> Result<Self> {
        let client = init_client(DEFAULT_USER_AGENT, DIRECT_FETCH_TIMEOUT)
            .context("Failed to initialize HTTP client")?;

        let scanner = config
            .invite_scan
            .enabled
            .then(|| SourceScanner::from_config(Arc::clone(&client), &config.invite_scan));

        Ok(Self {
            targets: config.targets(),
            fetcher: ContentFetcher::from_config(Arc::clone(&client), &config.flaresolverr),
            notifier: Notifier::from_config(client, &config.notifications),
            scanner,
            store: StateStore::new(config.state_file.clone()),
            check_interval: minutes(config.check_interval_minutes),
            check_delay: Duration::from_secs(config.check_delay_seconds),
            invite_scan_interval: minutes(config.invite_scan.interval_minutes),
        })
    }

    /// Trackers included in invite scanning.
    pub fn invite_targets(&self) -> impl Iterator<Item = &Target> {
        self.targets.iter().filter(|t| t.scan_invites)
    }
}

fn minutes(value: u64) -> Duration {
    Duration::from_secs(value.saturating_mul(60))
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: &str = r#"
check_interval_minutes: 5
check_delay_seconds: 1
state_file: /tmp/tracker_watch_state.json
invite_scan:
  enabled: true
  interval_minutes: 45
trackers:
  - name: AlphaTracker
    url: https://alpha.example/
    match_text: ["open"]
  - name: BetaTracker
    url: https://beta.example/
    method: css_selector
    css_selector: "form#signup"
    scan_invites: false
  - name: Broken
    url: https://broken.example/
    method: regex
"#;

    #[test]
    fn test_from_config_builds_context() {
        let config = FileConfig::from_yaml(CONFIG).unwrap();
        let ctx = MonitorContext::from_config(&config).unwrap();

        assert_eq!(ctx.targets.len(), 2);
        assert_eq!(ctx.check_interval, Duration::from_secs(300));
        assert_eq!(ctx.check_delay, Duration::from_secs(1));
        assert_eq!(ctx.invite_scan_interval, Duration::from_secs(45 * 60));
        assert!(ctx.scanner.is_some());
        let invite: Vec<&str> = ctx.invite_targets().map(|t| t.name.as_str()).collect();
        assert_eq!(invite, ["AlphaTracker"]);
    }

    #[test]
    fn test_out_of_range_reddit_age_disables_only_reddit() {
        let config = FileConfig::from_yaml(
            r#"
invite_scan:
  enabled: true
  reddit:
    max_age_hours: 3000000000
  web_search:
    enabled: true
"#,
        )
        .unwrap();
        let ctx = MonitorContext::from_config(&config).unwrap();
        let labels: Vec<&str> = ctx
            .scanner
            .as_ref()
            .map(|s| s.sources().iter().map(|src| src.label()).collect())
            .unwrap_or_default();
        assert_eq!(labels, ["web_search"]);
    }

    #[test]
    fn test_scanner_absent_when_disabled() {
        let config = FileConfig::from_yaml("trackers: []").unwrap();
        let ctx = MonitorContext::from_config(&config).unwrap();
        assert!(ctx.scanner.is_none());
        assert!(ctx.targets.is_empty());
    }
}
