//! The sweep over all stored shares.

use std::fmt;

use chrono::{TimeDelta, Utc};
use futures::StreamExt;
use serde::Serialize;
use tokio::sync::Mutex;
use tracing;

use dropshare_core::ShareId;
use dropshare_entity::PolicyState;
use dropshare_service::{ReapOutcome, ShareLifecycleManager};

/// Counters from one sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    /// Records looked at.
    pub scanned: u64,
    /// Shares deleted during the sweep.
    pub reaped: u64,
    /// Shares queued for deletion behind running downloads.
    pub deferred: u64,
    /// Records or directories that could not be processed.
    pub failed: u64,
    /// Payload directories removed because no record owned them.
    pub orphans_removed: u64,
}

impl fmt::Display for SweepReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "scanned {}, reaped {}, deferred {}, failed {}, orphans removed {}",
            self.scanned, self.reaped, self.deferred, self.failed, self.orphans_removed
        )
    }
}

/// Deletes shares that are expired or exhausted.
///
/// Deletion goes through the lifecycle manager, so a share with downloads in
/// flight is only removed once they finish.
pub struct Reaper {
    manager: ShareLifecycleManager,
    /// `None` when the grace period is too long to represent.
    orphan_grace: Option<TimeDelta>,
    running: Mutex<()>,
}

impl fmt::Debug for Reaper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reaper")
            .field("orphan_grace", &self.orphan_grace)
            .finish()
    }
}

impl Reaper {
    /// Create a new reaper.
    ///
    /// A grace period beyond what a timestamp can hold disables the orphan
    /// sweep instead of failing.
    pub fn new(manager: ShareLifecycleManager, orphan_grace_minutes: u64) -> Self {
        let orphan_grace = i64::try_from(orphan_grace_minutes)
            .ok()
            .and_then(TimeDelta::try_minutes);
        Self {
            manager,
            orphan_grace,
            running: Mutex::new(()),
        }
    }

    /// Run a full sweep, waiting for a sweep already in progress.
    pub async fn sweep(&self) -> SweepReport {
        let _running = self.running.lock().await;
        self.run().await
    }

    /// Run a full sweep unless one is already in progress.
    pub async fn try_sweep(&self) -> Option<SweepReport> {
        let _running = self.running.try_lock().ok()?;
        Some(self.run().await)
    }

    async fn run(&self) -> SweepReport {
        let started = std::time::Instant::now();
        let mut report = SweepReport::default();

        self.sweep_records(&mut report).await;
        self.sweep_orphans(&mut report).await;

        tracing::info!(
            scanned = report.scanned,
            reaped = report.reaped,
            deferred = report.deferred,
            failed = report.failed,
            orphans_removed = report.orphans_removed,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Reaper sweep finished"
        );
        report
    }

    /// Reap every record whose policy is no longer active.
    async fn sweep_records(&self, report: &mut SweepReport) {
        let now = Utc::now();
        let mut doomed: Vec<(ShareId, PolicyState)> = Vec::new();

        // Collect first so the listing is not held open while deleting.
        {
            let mut records = self.manager.store().list_all();
            while let Some(item) = records.next().await {
                match item {
                    Ok(record) => {
                        report.scanned += 1;
                        let state = record.policy_state(now);
                        if !state.is_active() {
                            doomed.push((record.share_id, state));
                        }
                    }
                    Err(e) => {
                        report.failed += 1;
                        tracing::warn!(error = %e, "Skipping unreadable share record");
                    }
                }
            }
        }

        for (id, state) in doomed {
            match self.manager.reap_or_defer(&id).await {
                Ok(ReapOutcome::Reaped) => {
                    report.reaped += 1;
                    tracing::debug!(share_id = %id, state = %state, "Reaped share");
                }
                Ok(ReapOutcome::Deferred) => report.deferred += 1,
                Ok(ReapOutcome::AlreadyGone) => {}
                Err(e) => {
                    report.failed += 1;
                    tracing::warn!(share_id = %id, error = %e, "Failed to reap share");
                }
            }
        }
    }

    /// Remove payload directories that no record owns and that have not been
    /// touched for the grace period.
    ///
    /// Directories of uploads still in progress are locked and left alone.
    async fn sweep_orphans(&self, report: &mut SweepReport) {
        let Some(cutoff) = self
            .orphan_grace
            .and_then(|grace| Utc::now().checked_sub_signed(grace))
        else {
            tracing::debug!("Orphan grace period out of range; skipping orphan sweep");
            return;
        };
        let storage = self.manager.storage();

        let entries = match storage.list("").await {
            Ok(entries) => entries,
            Err(e) => {
                report.failed += 1;
                tracing::warn!(error = %e, "Failed to list payload directories");
                return;
            }
        };

        for entry in entries {
            if !entry.is_directory {
                continue;
            }
            // Directories that are not share ids are not ours.
            let Ok(id) = ShareId::parse(&entry.path) else {
                continue;
            };
            if entry.last_modified.is_none_or(|modified| modified >= cutoff) {
                continue;
            }

            match self.manager.remove_orphan(&id).await {
                Ok(true) => {
                    report.orphans_removed += 1;
                    tracing::info!(share_id = %id, "Removed orphaned payload directory");
                }
                Ok(false) => {}
                Err(e) => {
                    report.failed += 1;
                    tracing::warn!(share_id = %id, error = %e, "Failed to remove orphaned payload");
                }
            }
        }
    }
}
