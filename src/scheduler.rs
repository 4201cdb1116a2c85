use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use futures::FutureExt;
use tokio::sync::watch;
use tokio::time::{interval_at, Duration, Instant, MissedTickBehavior};
use tracing::{error, info, warn};
use crate::aggregator::{CycleReport, DataManager};
use crate::utils::helper::panic_message;
use crate::utils::task_supervisor::TaskSupervisor;

pub const SCHEDULER_TASK: &str = "update_scheduler";

/// Drives `DataManager::update_all` on a fixed interval until told to stop.
pub struct UpdateScheduler {
    manager: Arc<DataManager>,
    interval: Duration,
}

/// Stops the scheduler loop. Dropping the handle stops it as well.
pub struct SchedulerHandle {
    shutdown: watch::Sender<bool>,
}

impl SchedulerHandle {
    /// The loop exits once any in-flight cycle has been appended.
    pub fn shutdown(&self) {
        // receiver already gone means the loop has exited
        let _ = self.shutdown.send(true);
    }
}

impl UpdateScheduler {
    pub fn new(manager: Arc<DataManager>, interval: Duration) -> Self {
        UpdateScheduler { manager, interval }
    }

    /// Run one cycle to completion so readers have data, then hand the
    /// ticking loop to the supervisor.
    pub async fn start(self, supervisor: &mut TaskSupervisor) -> SchedulerHandle {
        run_guarded(self.manager.update_all()).await;

        let (tx, rx) = watch::channel(false);
        supervisor.spawn(SCHEDULER_TASK, self.run(rx));
        SchedulerHandle { shutdown: tx }
    }

    /// First tick fires one interval from now. Late ticks are delayed
    /// rather than bunched up.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(interval_secs = self.interval.as_secs(), "Update scheduler running");
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    run_guarded(self.manager.update_all()).await;
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!("Update scheduler stopping");
                        break;
                    }
                }
            }
        }
    }
}

/// Last-resort guard around a whole cycle. Adapter panics are already
/// contained per source by the manager; anything else that unwinds out of a
/// cycle is logged here and the loop carries on.
async fn run_guarded<F>(cycle: F) -> Option<CycleReport>
where
    F: Future<Output = CycleReport>,
{
    match AssertUnwindSafe(cycle).catch_unwind().await {
        Ok(report) => {
            if report.defects() > 0 {
                warn!(cycle = report.cycle, defects = report.defects(), "Cycle completed with lost source updates");
            }
            Some(report)
        }
        Err(payload) => {
            error!(details = %panic_message(payload), "Update cycle aborted by an unexpected defect");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(cycle: u64) -> CycleReport {
        CycleReport { cycle, elapsed: Duration::ZERO, outcomes: Vec::new() }
    }

    #[tokio::test]
    async fn completed_cycle_is_passed_through() {
        let result = run_guarded(async { report(7) }).await;
        assert_eq!(result.map(|r| r.cycle), Some(7));
    }

    #[tokio::test]
    async fn panicking_cycle_is_contained() {
        let result = run_guarded(async {
            let report = report(1);
            if report.outcomes.is_empty() {
                panic!("history append failed");
            }
            report
        })
        .await;
        assert!(result.is_none());
    }
}
