//! Configuration self-test (`--check-config`).
//!
//! Lists what would be monitored, sends a test notification through every
//! enabled channel and fetches the first tracker once. Output goes to stdout for a
//! human at a terminal.

use anyhow::Result;

use crate::config::FileConfig;
use crate::matching::evaluate;
use crate::monitor::MonitorContext;
use crate::notify::{sinks_from_config, NotificationEvent};

/// Results of a configuration self-test.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckReport {
    /// Enabled, valid trackers
    pub trackers: usize,
    /// Notification channels that accepted the test message
    pub channels_ok: usize,
    pub channels_failed: usize,
    /// Verdict for the first tracker, `None` if it could not be fetched or
    /// there is no tracker
    pub first_verdict: Option<bool>,
}

impl CheckReport {
    /// Whether the configuration is usable as-is.
    pub fn passed(&self) -> bool {
        self.trackers > 0 && self.channels_failed == 0
    }
}

/// Runs the self-test against a loaded configuration.
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be created.
pub async fn check_config(config: &FileConfig) -> Result<CheckReport> {
    let ctx = MonitorContext::from_config(config)?;
    let mut report = CheckReport {
        trackers: ctx.targets.len(),
        ..CheckReport::default()
    };

    println!("\n📢 Notification channels:");
    let (_, problems) = sinks_from_config(&config.notifications);
    for problem in &problems {
        report.channels_failed += 1;
        println!("❌ {}", problem);
    }
    let outcomes = ctx.notifier.deliver_each(&NotificationEvent::test()).await;
    if outcomes.is_empty() && problems.is_empty() {
        println!("⏭️  No channels enabled");
    }
    for (channel, result) in outcomes {
        match result {
            Ok(()) => {
                report.channels_ok += 1;
                println!("✅ {}: test notification sent", channel);
            }
            Err(e) => {
                report.channels_failed += 1;
                println!("❌ {}: {}", channel, e);
            }
        }
    }

    println!("\n🎯 Trackers:");
    println!("Entries in config: {}", config.trackers.len());
    println!("Enabled and valid: {}", ctx.targets.len());
    for target in &ctx.targets {
        println!("  • {}", target.name);
        println!("    URL: {}", target.url);
        println!("    Method: {}", target.strategy.method_name());
        if ctx.fetcher.should_use_proxy(target) {
            println!("    Via bypass proxy");
        }
    }

    match ctx.targets.first() {
        None => println!("❌ No trackers are enabled! Enable at least one tracker."),
        Some(first) => {
            println!("\n🔍 Testing connection to {}...", first.name);
            match ctx.fetcher.fetch(first).await {
                Ok(content) => {
                    let verdict = evaluate(&content, &first.strategy);
                    report.first_verdict = Some(verdict);
                    println!(
                        "✅ Fetched {} ({} bytes), signups currently {}",
                        first.name,
                        content.len(),
                        if verdict { "OPEN" } else { "closed" }
                    );
                }
                Err(e) => println!("❌ Failed to fetch {}: {}", first.name, e),
            }
        }
    }

    if let Some(scanner) = &ctx.scanner {
        let sources: Vec<&str> = scanner.sources().iter().map(|s| s.label()).collect();
        println!(
            "\n🎟️ Invite scanning: {} tracker(s), sources: {}",
            ctx.invite_targets().count(),
            if sources.is_empty() {
                "none".to_string()
            } else {
                sources.join(", ")
            }
        );
    }
    Ok(report)
}
