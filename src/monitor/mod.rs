//! The monitoring loop.
//!
//! A [`Monitor`] owns the persisted state and runs cycles on a fixed
//! interval. A cycle is two passes, status then invites, each run as its own
//! task on a copy of its part of the state. A pass that panics has its copy
//! discarded; the error is logged and the loop pauses before trying again.
//! State is written to disk after each completed pass.

mod context;
mod cycle;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use log::{error, info};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::config::{FileConfig, LOOP_ERROR_COOLDOWN};
use crate::state::PersistedState;

pub use context::MonitorContext;
pub use cycle::{check_targets, invite_pass, scan_invites, status_pass, CycleReport};

/// Summary of a monitor run, returned when the loop stops.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MonitorReport {
    /// Cycles that completed
    pub cycles: usize,
    /// Cycles that aborted unexpectedly
    pub failed_cycles: usize,
}

#[derive(Debug)]
pub struct Monitor {
    ctx: Arc<MonitorContext>,
    state: PersistedState,
    last_invite_scan: Option<Instant>,
}

impl Monitor {
    pub fn new(ctx: MonitorContext, state: PersistedState) -> Self {
        Self {
            ctx: Arc::new(ctx),
            state,
            last_invite_scan: None,
        }
    }

    /// Builds the context and loads the persisted state.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created. A missing or
    /// corrupt state file is not an error.
    pub async fn from_config(config: &FileConfig) -> Result<Self> {
        let ctx = MonitorContext::from_config(config)?;
        let state = ctx.store.load().await;
        Ok(Self::new(ctx, state))
    }

    pub fn context(&self) -> &MonitorContext {
        &self.ctx
    }

    pub fn state(&self) -> &PersistedState {
        &self.state
    }

    fn invite_scan_due(&self) -> bool {
        self.ctx.scanner.is_some()
            && self
                .last_invite_scan
                .map_or(true, |at| at.elapsed() >= self.ctx.invite_scan_interval)
    }

    /// Runs one cycle and persists the resulting state.
    ///
    /// The status pass and the invite pass each run as their own task on a
    /// copy of their part of the state. The status pass is committed and
    /// saved before the invite pass starts, so a failing invite pass never
    /// rolls back a transition that was already notified.
    ///
    /// # Errors
    ///
    /// Returns an error if a pass task panicked; that pass's part of the
    /// in-memory state is then left as it was. A failed state write is only
    /// logged.
    pub async fn run_once(&mut self) -> Result<CycleReport> {
        let records = self.state.trackers.clone();
        let (records, mut report) = tokio::spawn(status_pass(Arc::clone(&self.ctx), records))
            .await
            .map_err(|e| anyhow!("status pass aborted: {}", e))?;
        self.state.trackers = records;
        self.persist().await;

        if self.invite_scan_due() {
            // Marked before running so a failing scan waits a full interval.
            self.last_invite_scan = Some(Instant::now());
            let seen = self.state.invite_seen.clone();
            let (seen, reported) = tokio::spawn(invite_pass(Arc::clone(&self.ctx), seen))
                .await
                .map_err(|e| anyhow!("invite pass aborted: {}", e))?;
            self.state.invite_seen = seen;
            report.invite_scan = true;
            report.new_invite_items = reported;
            self.persist().await;
        }
        Ok(report)
    }

    async fn persist(&self) {
        if let Err(e) = self.ctx.store.save(&self.state).await {
            error!("Failed to save state: {}", e);
        }
    }

    /// Runs cycles until `cancel` fires.
    ///
    /// Cancellation is honoured between cycles and during the pause after
    /// one; a cycle that has started always completes and is saved.
    pub async fn run(mut self, cancel: CancellationToken) -> MonitorReport {
        let mut report = MonitorReport::default();
        info!(
            "Starting tracker monitor (check interval: {} minutes)",
            self.ctx.check_interval.as_secs() / 60
        );
        info!("Monitoring {} trackers", self.ctx.targets.len());

        while !cancel.is_cancelled() {
            let pause = match self.run_once().await {
                Ok(_) => {
                    report.cycles += 1;
                    info!(
                        "Next check in {} minutes",
                        self.ctx.check_interval.as_secs() / 60
                    );
                    self.ctx.check_interval
                }
                Err(e) => {
                    report.failed_cycles += 1;
                    error!("Unexpected error in monitoring loop: {:#}", e);
                    LOOP_ERROR_COOLDOWN
                }
            };
            if !sleep_or_cancel(pause, &cancel).await {
                break;
            }
        }
        info!("Monitor stopped");
        report
    }
}

/// Sleeps for `duration`; returns `false` if cancelled first.
async fn sleep_or_cancel(duration: Duration, cancel: &CancellationToken) -> bool {
    tokio::select! {
        _ = tokio::time::sleep(duration) => true,
        _ = cancel.cancelled() => false,
    }
}
