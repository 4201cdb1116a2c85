use tokio::task::JoinHandle;
use std::collections::HashMap;
use std::time::Duration;
use crate::error::{Error, Result};
use tracing::{info, error, warn};

/// Task Supervisor - Tracks named background tasks
///
/// ## Purpose
/// Owns the `JoinHandle` of every long-running task (the update scheduler,
/// the snapshot reporter) so the process can notice a task that stopped
/// early and can wind everything down on exit.
///
/// ## Usage
/// ```rust,ignore
/// let mut supervisor = TaskSupervisor::new();
/// supervisor.spawn("update_scheduler", scheduler.run(shutdown_rx));
///
/// if let Err(e) = supervisor.check_health() {
///     error!("Task failure detected: {:?}", e);
/// }
/// ```
pub struct TaskSupervisor {
    tasks: HashMap<String, JoinHandle<()>>,
}

impl TaskSupervisor {
    pub fn new() -> Self {
        TaskSupervisor {
            tasks: HashMap::new(),
        }
    }

    /// Spawn a new background task and register it for monitoring
    pub fn spawn<F>(&mut self, name: impl Into<String>, future: F) -> &mut Self
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let name = name.into();
        let handle = tokio::spawn(future);

        info!("Spawned background task: {}", name);
        if let Some(previous) = self.tasks.insert(name.clone(), handle) {
            warn!("Replacing background task {}, aborting the previous one", name);
            previous.abort();
        }
        self
    }

    /// Every registered task is expected to run until shutdown; any that
    /// has finished is reported and dropped from tracking.
    pub fn check_health(&mut self) -> Result<()> {
        let finished: Vec<String> = self.tasks
            .iter()
            .filter(|(_, handle)| handle.is_finished())
            .map(|(name, _)| name.clone())
            .collect();

        if finished.is_empty() {
            return Ok(());
        }

        for name in &finished {
            self.tasks.remove(name);
        }

        let error_msg = format!("Tasks terminated unexpectedly: {:?}", finished);
        error!("{}", error_msg);
        Err(Error::TaskFailed(error_msg))
    }

    pub fn active_task_count(&self) -> usize {
        self.tasks.len()
    }

    /// Wait up to `grace` for a task to finish on its own, aborting it
    /// otherwise.
    pub async fn wait_for_task(&mut self, name: &str, grace: Duration) -> Result<()> {
        let Some(mut handle) = self.tasks.remove(name) else {
            return Err(Error::TaskFailed(format!("Task {} not found", name)));
        };

        match tokio::time::timeout(grace, &mut handle).await {
            Ok(Ok(())) => {
                info!("Task {} completed", name);
                Ok(())
            }
            Ok(Err(e)) => Err(Error::TaskFailed(format!("Task {} failed: {}", name, e))),
            Err(_) => {
                warn!("Task {} did not stop within {:?}, aborting", name, grace);
                handle.abort();
                Err(Error::TaskFailed(format!("Task {} timed out during shutdown", name)))
            }
        }
    }

    /// Abort everything still registered
    pub fn shutdown_all(&mut self) {
        info!("Shutting down {} background tasks", self.tasks.len());

        for (name, handle) in self.tasks.drain() {
            handle.abort();
            info!("Aborted task: {}", name);
        }
    }
}

impl Default for TaskSupervisor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reports_tasks_that_exit_early() {
        let mut supervisor = TaskSupervisor::new();
        supervisor.spawn("short_lived", async {});
        supervisor.spawn("long_lived", std::future::pending());

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(matches!(supervisor.check_health(), Err(Error::TaskFailed(_))));
        assert_eq!(supervisor.active_task_count(), 1);
        assert!(supervisor.check_health().is_ok());

        supervisor.shutdown_all();
        assert_eq!(supervisor.active_task_count(), 0);
    }

    #[tokio::test]
    async fn wait_for_task_aborts_after_grace() {
        let mut supervisor = TaskSupervisor::new();
        supervisor.spawn("stuck", std::future::pending());

        let result = supervisor.wait_for_task("stuck", Duration::from_millis(10)).await;
        assert!(matches!(result, Err(Error::TaskFailed(_))));
        assert!(supervisor.wait_for_task("stuck", Duration::from_millis(10)).await.is_err());
    }
}
