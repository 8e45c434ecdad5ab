//! The two passes of a monitor cycle: status checks and, when due, an
//! invite scan.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use log::{debug, error, info, warn};

use super::MonitorContext;
use crate::detect::{detect, Transition};
use crate::error_handling::{categorize_fetch_error, CycleStats, FetchError};
use crate::matching::evaluate;
use crate::notify::NotificationEvent;
use crate::state::{filter_new, merge, SeenSet, StatusRecord};

/// Outcome counts of a cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Trackers that produced a verdict
    pub checked: usize,
    pub opened: usize,
    pub closed: usize,
    /// Trackers skipped because their page could not be fetched
    pub failed: usize,
    /// Whether the invite pass ran
    pub invite_scan: bool,
    /// Invite items reported as new
    pub new_invite_items: usize,
}

/// Status pass over a copy of the tracker records.
///
/// Returns the updated records with the pass's counts. Runs as its own task,
/// so the records it returns are committed before any invite scanning starts.
pub async fn status_pass(
    ctx: Arc<MonitorContext>,
    mut records: BTreeMap<String, StatusRecord>,
) -> (BTreeMap<String, StatusRecord>, CycleReport) {
    let stats = CycleStats::new();
    check_targets(&ctx, &mut records, &stats).await;
    stats.log_summary();

    let report = CycleReport {
        checked: stats.checked(),
        opened: stats.opened(),
        closed: stats.closed(),
        failed: stats.total_failures(),
        ..CycleReport::default()
    };
    (records, report)
}

/// Invite pass over a copy of the seen-sets.
pub async fn invite_pass(
    ctx: Arc<MonitorContext>,
    mut seen: BTreeMap<String, SeenSet>,
) -> (BTreeMap<String, SeenSet>, usize) {
    let reported = scan_invites(&ctx, &mut seen).await;
    (seen, reported)
}

/// Polls every tracker once, in order, and applies the verdicts.
///
/// A tracker whose page cannot be fetched keeps its record untouched. Each
/// fetch and evaluation runs in its own task; a panic there counts as a
/// failed check for that tracker only.
pub async fn check_targets(
    ctx: &Arc<MonitorContext>,
    records: &mut BTreeMap<String, StatusRecord>,
    stats: &CycleStats,
) {
    info!("Checking {} trackers...", ctx.targets.len());
    for (index, target) in ctx.targets.iter().enumerate() {
        if index > 0 && !ctx.check_delay.is_zero() {
            tokio::time::sleep(ctx.check_delay).await;
        }

        let verdict = match tokio::spawn(check_one(Arc::clone(ctx), index)).await {
            Ok(Ok(verdict)) => verdict,
            Ok(Err(e)) => {
                warn!(
                    "Failed to fetch {} ({}): {}",
                    target.name,
                    categorize_fetch_error(&e),
                    e
                );
                stats.record_failure(&e);
                continue;
            }
            Err(e) => {
                error!("Check of {} aborted: {}", target.name, e);
                stats.record_aborted();
                continue;
            }
        };

        stats.record_checked();
        match detect(&target.name, verdict, records, Utc::now()) {
            Transition::Opened => {
                info!("🚀 {} signup is now OPEN!", target.name);
                stats.record_opened();
                ctx.notifier
                    .deliver(&NotificationEvent::opened(target))
                    .await;
            }
            Transition::Closed => {
                info!("🔒 {} signup is now closed", target.name);
                stats.record_closed();
            }
            Transition::Unchanged => {
                debug!(
                    "{}: {}",
                    target.name,
                    if verdict { "open" } else { "closed" }
                );
            }
        }
    }
}

/// Fetches and evaluates the tracker at `index`.
async fn check_one(ctx: Arc<MonitorContext>, index: usize) -> Result<bool, FetchError> {
    let target = &ctx.targets[index];
    let content = ctx.fetcher.fetch(target).await?;
    Ok(evaluate(&content, &target.strategy))
}

/// Scans invite sources and reports items not seen before.
///
/// Every key from this scan is merged into the tracker's seen-set after the
/// notification attempt, whether or not delivery succeeded. Returns the
/// number of new items reported.
pub async fn scan_invites(ctx: &MonitorContext, seen: &mut BTreeMap<String, SeenSet>) -> usize {
    let Some(scanner) = &ctx.scanner else {
        return 0;
    };
    let targets: Vec<_> = ctx.invite_targets().collect();
    if targets.is_empty() {
        debug!("No trackers enabled for invite scanning");
        return 0;
    }

    info!("Scanning invite sources for {} trackers...", targets.len());
    let names: Vec<&str> = targets.iter().map(|t| t.name.as_str()).collect();
    let mut results = scanner.scan(&names).await;

    let mut reported = 0;
    for target in targets {
        let items = results.remove(&target.name).unwrap_or_default();
        let previous = seen.remove(&target.name).unwrap_or_default();

        let fresh = filter_new(&items, &previous);
        if !fresh.is_empty() {
            info!("🎟️ {} new invite mentions for {}", fresh.len(), target.name);
            reported += fresh.len();
            ctx.notifier
                .deliver(&NotificationEvent::invites_found(target, fresh))
                .await;
        }

        let updated = merge(previous, items.into_iter().map(|item| item.url));
        seen.insert(target.name.clone(), updated);
    }
    reported
}
