use tokio::{
    task::JoinHandle,
    time::{self, Instant, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::{
    error::SweepError,
    evict::{evict_stale, EvictReport},
    policy::RetentionPolicy,
    reclaim::{reclaim_empty, ReclaimReport},
};

/// Result of one full evict-then-reclaim pass.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SweepReport {
    pub evict: EvictReport,
    /// `None` when the root was absent and reclamation never ran.
    pub reclaim: Option<ReclaimReport>,
}

/// Periodically sweeps a storage root according to a [`RetentionPolicy`].
#[derive(Debug, Clone)]
pub struct Sweeper {
    policy: RetentionPolicy,
}

impl Sweeper {
    pub fn new(policy: RetentionPolicy) -> Self {
        Self { policy }
    }

    /// Run one sweep synchronously: evict the whole tree, then reclaim.
    ///
    /// Reclamation only runs once eviction has seen the root, so an absent
    /// root yields an empty report rather than an error.
    pub fn sweep_once(&self) -> Result<SweepReport, SweepError> {
        let evict = evict_stale(&self.policy.root, self.policy.ttl);
        if evict.root_missing {
            return Ok(SweepReport {
                evict,
                reclaim: None,
            });
        }
        let reclaim = reclaim_empty(&self.policy.root)?;
        Ok(SweepReport {
            evict,
            reclaim: Some(reclaim),
        })
    }

    /// Sweep on every interval tick until `shutdown` is cancelled.
    ///
    /// The first sweep happens one interval after start. A pass always runs
    /// to completion; cancellation is only observed between passes. Errors
    /// are logged and never end the loop. An interval that is zero or too
    /// large to schedule is logged and the sweeper returns without sweeping.
    pub async fn run(self, shutdown: CancellationToken) {
        let period = self.policy.interval;
        let start = match Instant::now().checked_add(period) {
            Some(start) if !period.is_zero() => start,
            _ => {
                error!(
                    interval = ?period,
                    "invalid sweep interval, retention sweeper not started"
                );
                return;
            }
        };
        let mut ticker = time::interval_at(start, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(
            root = %self.policy.root.display(),
            ttl_secs = self.policy.ttl.as_secs(),
            interval_secs = period.as_secs(),
            "retention sweeper started"
        );

        loop {
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => {
                    // filesystem walk is blocking; keep it off the async workers
                    let pass = self.clone();
                    match tokio::task::spawn_blocking(move || pass.sweep_once()).await {
                        Ok(Ok(report)) => log_report(&report),
                        Ok(Err(err)) => warn!(error = %err, "sweep incomplete"),
                        Err(err) => error!(error = %err, "sweep task failed"),
                    }
                }
            }
        }
        info!("retention sweeper stopped");
    }

    /// Spawn [`Sweeper::run`] onto the current tokio runtime.
    pub fn spawn(self, shutdown: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(self.run(shutdown))
    }
}

fn log_report(report: &SweepReport) {
    let reclaimed = report.reclaim.as_ref().map_or(0, |r| r.dirs_removed);
    if report.evict.root_missing {
        debug!("storage root absent, nothing to sweep");
    } else if report.evict.files_evicted > 0 || reclaimed > 0 {
        info!(
            evicted = report.evict.files_evicted,
            reclaimed,
            owners = report.evict.owners_scanned,
            "sweep finished"
        );
    } else {
        debug!(owners = report.evict.owners_scanned, "sweep finished, nothing expired");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{
        fs::{self, File},
        time::{Duration, SystemTime},
    };

    const HOUR: Duration = Duration::from_secs(3600);

    fn aged_file(dir: &std::path::Path, name: &str, age: Duration) -> std::path::PathBuf {
        fs::create_dir_all(dir).unwrap();
        let path = dir.join(name);
        let file = File::create(&path).unwrap();
        file.set_modified(SystemTime::now() - age).unwrap();
        path
    }

    #[test]
    fn sweep_once_skips_reclaim_without_root() {
        let tmp = tempfile::tempdir().unwrap();
        let sweeper = Sweeper::new(RetentionPolicy::new(tmp.path().join("missing")));
        let report = sweeper.sweep_once().unwrap();
        assert!(report.evict.root_missing);
        assert!(report.reclaim.is_none());
    }

    #[test]
    fn sweep_once_reclaims_after_eviction() {
        let tmp = tempfile::tempdir().unwrap();
        let owner = tmp.path().join("owner2");
        aged_file(&owner, "old.jpg", 30 * HOUR);
        let sweeper = Sweeper::new(RetentionPolicy::new(tmp.path()));
        let report = sweeper.sweep_once().unwrap();
        assert_eq!(report.evict.files_evicted, 1);
        assert_eq!(report.reclaim.unwrap().dirs_removed, 1);
        assert!(!owner.exists());
    }

    #[tokio::test]
    async fn run_sweeps_on_tick_and_stops_on_cancel() {
        let tmp = tempfile::tempdir().unwrap();
        let owner = tmp.path().join("owner");
        let old = aged_file(&owner, "old.png", 30 * HOUR);
        let fresh = aged_file(&owner, "fresh.png", Duration::ZERO);

        let policy = RetentionPolicy::new(tmp.path()).with_interval(Duration::from_millis(30));
        let token = CancellationToken::new();
        let handle = Sweeper::new(policy).spawn(token.clone());

        time::sleep(Duration::from_millis(200)).await;
        token.cancel();
        time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("sweeper did not stop")
            .unwrap();

        assert!(!old.exists());
        assert!(fresh.exists());
    }

    #[tokio::test]
    async fn unschedulable_interval_stops_cleanly() {
        let tmp = tempfile::tempdir().unwrap();
        let old = aged_file(&tmp.path().join("owner"), "old.png", 30 * HOUR);

        for interval in [Duration::ZERO, Duration::MAX] {
            let policy = RetentionPolicy::new(tmp.path()).with_interval(interval);
            let token = CancellationToken::new();
            let handle = Sweeper::new(policy).spawn(token.clone());
            time::timeout(Duration::from_secs(5), handle)
                .await
                .expect("sweeper did not return")
                .expect("sweeper panicked");
            assert!(!token.is_cancelled());
        }
        assert!(old.exists());
    }

    #[tokio::test]
    async fn cancel_before_first_tick_does_no_work() {
        let tmp = tempfile::tempdir().unwrap();
        let old = aged_file(&tmp.path().join("owner"), "old.png", 30 * HOUR);

        let token = CancellationToken::new();
        let handle = Sweeper::new(RetentionPolicy::new(tmp.path())).spawn(token.clone());
        token.cancel();
        time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("sweeper did not stop")
            .unwrap();

        assert!(old.exists());
    }
}
