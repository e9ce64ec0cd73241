//! Cron scheduler for the periodic reaper sweep.

use std::sync::Arc;

use tokio_cron_scheduler::{Job as CronJob, JobScheduler};
use tracing;

use dropshare_core::config::worker::WorkerConfig;
use dropshare_core::error::AppError;

use crate::reaper::Reaper;

/// Cron-based scheduler that runs the reaper.
pub struct ReaperScheduler {
    /// The underlying job scheduler
    scheduler: JobScheduler,
    /// The sweep to run
    reaper: Arc<Reaper>,
    /// Cron expression (six fields, seconds first)
    schedule: String,
    /// Whether to sweep once when started
    sweep_on_startup: bool,
}

impl std::fmt::Debug for ReaperScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReaperScheduler")
            .field("schedule", &self.schedule)
            .field("sweep_on_startup", &self.sweep_on_startup)
            .finish()
    }
}

impl ReaperScheduler {
    /// Create a new reaper scheduler and register the sweep job.
    pub async fn new(reaper: Arc<Reaper>, config: &WorkerConfig) -> Result<Self, AppError> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| AppError::internal(format!("Failed to create scheduler: {e}")))?;

        let this = Self {
            scheduler,
            reaper,
            schedule: config.reaper_schedule.clone(),
            sweep_on_startup: config.sweep_on_startup,
        };
        this.register_sweep().await?;
        Ok(this)
    }

    /// Start the scheduler, sweeping once first if configured.
    pub async fn start(&self) -> Result<(), AppError> {
        if self.sweep_on_startup {
            let report = self.reaper.sweep().await;
            tracing::info!(%report, "Startup sweep complete");
        }

        self.scheduler
            .start()
            .await
            .map_err(|e| AppError::internal(format!("Failed to start scheduler: {e}")))?;

        tracing::info!(schedule = %self.schedule, "Reaper scheduler started");
        Ok(())
    }

    /// Shutdown the scheduler
    pub async fn shutdown(&mut self) -> Result<(), AppError> {
        self.scheduler
            .shutdown()
            .await
            .map_err(|e| AppError::internal(format!("Failed to shutdown scheduler: {e}")))?;

        tracing::info!("Reaper scheduler shut down");
        Ok(())
    }

    /// Reaper sweep on the configured schedule.
    async fn register_sweep(&self) -> Result<(), AppError> {
        let reaper = Arc::clone(&self.reaper);
        let job = CronJob::new_async(self.schedule.as_str(), move |_uuid, _lock| {
            let reaper = Arc::clone(&reaper);
            Box::pin(async move {
                tracing::debug!("Running scheduled reaper sweep");
                if reaper.try_sweep().await.is_none() {
                    tracing::warn!("Previous reaper sweep still running; skipping this one");
                }
            })
        })
        .map_err(|e| {
            AppError::configuration(format!(
                "Invalid reaper schedule {:?}: {e}",
                self.schedule
            ))
        })?;

        self.scheduler
            .add(job)
            .await
            .map_err(|e| AppError::internal(format!("Failed to add reaper schedule: {e}")))?;

        tracing::info!(schedule = %self.schedule, "Registered: reaper sweep");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::testing::{expired_share, manager};

    fn worker_config(schedule: &str, sweep_on_startup: bool) -> WorkerConfig {
        WorkerConfig {
            reaper_schedule: schedule.to_string(),
            sweep_on_startup,
            ..WorkerConfig::default()
        }
    }

    #[tokio::test]
    async fn test_invalid_schedule_is_configuration_error() {
        let (_dir, manager) = manager().await;
        let reaper = Arc::new(Reaper::new(manager, 60));
        let err = ReaperScheduler::new(reaper, &worker_config("every hour", true))
            .await
            .unwrap_err();
        assert_eq!(err.kind, dropshare_core::error::ErrorKind::Configuration);
    }

    #[tokio::test]
    async fn test_start_sweeps_when_configured() {
        let (_dir, manager) = manager().await;
        let id = expired_share(&manager).await;

        let reaper = Arc::new(Reaper::new(manager.clone(), 60));
        let mut scheduler = ReaperScheduler::new(reaper, &worker_config("0 0 * * * *", true))
            .await
            .unwrap();
        scheduler.start().await.unwrap();
        assert!(manager.store().load(&id).await.unwrap_err().is_not_found());
        scheduler.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_start_without_startup_sweep() {
        let (_dir, manager) = manager().await;
        let id = expired_share(&manager).await;

        let reaper = Arc::new(Reaper::new(manager.clone(), 60));
        let mut scheduler = ReaperScheduler::new(reaper, &worker_config("0 0 3 * * *", false))
            .await
            .unwrap();
        scheduler.start().await.unwrap();
        assert!(manager.store().load(&id).await.is_ok());
        scheduler.shutdown().await.unwrap();
    }
}
