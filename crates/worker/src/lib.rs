//! Standalone reminder pipeline scheduler.
//!
//! [`Scheduler`] runs as a background task, periodically driving the full
//! pipeline: both candidate generators followed by one dispatch batch. It is
//! the in-process alternative to hitting the batch HTTP endpoints from an
//! external cron.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio_util::sync::CancellationToken;

use tandem_notify::sender::{EmailSender, PushSender};
use tandem_notify::{Dispatcher, ReminderConfig, ReminderGenerator};

/// Default seconds between pipeline ticks.
pub const DEFAULT_INTERVAL_SECS: u64 = 300;

/// Tick interval, from `SCHEDULER_INTERVAL_SECS` (default 300).
pub fn interval_from_env() -> Duration {
    let secs = std::env::var("SCHEDULER_INTERVAL_SECS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_INTERVAL_SECS);
    Duration::from_secs(secs)
}

// ---------------------------------------------------------------------------
// Scheduler
// ---------------------------------------------------------------------------

/// Background service that runs the reminder pipeline on a fixed interval.
pub struct Scheduler {
    generator: ReminderGenerator,
    dispatcher: Dispatcher,
    interval: Duration,
}

impl Scheduler {
    /// Create a scheduler over the given pool, senders, and tuning.
    pub fn new(
        pool: tandem_db::DbPool,
        email: Arc<dyn EmailSender>,
        push: Arc<dyn PushSender>,
        config: ReminderConfig,
        interval: Duration,
    ) -> Self {
        Self {
            generator: ReminderGenerator::new(pool.clone(), config.clone()),
            dispatcher: Dispatcher::new(pool, email, push, config),
            interval,
        }
    }

    /// Run the pipeline loop.
    ///
    /// Ticks immediately on start, then every `interval`. The loop exits
    /// gracefully when the provided [`CancellationToken`] is cancelled. A
    /// failing tick is logged and the loop keeps going.
    pub async fn run(&self, cancel: CancellationToken) {
        let mut interval = tokio::time::interval(self.interval);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Reminder scheduler cancelled");
                    break;
                }
                _ = interval.tick() => {
                    if let Err(e) = self.tick().await {
                        tracing::error!(error = %e, "Pipeline tick failed");
                    }
                }
            }
        }
    }

    /// Run one full pipeline pass: generate from both sources, then dispatch.
    async fn tick(&self) -> Result<(), sqlx::Error> {
        let now = Utc::now();

        let events = self.generator.run_events(now).await?;
        let tasks = self.generator.run_tasks(now).await?;
        let dispatch = self.dispatcher.run().await?;

        if events.queued + tasks.queued + dispatch.processed > 0 {
            tracing::info!(
                events_queued = events.queued,
                tasks_queued = tasks.queued,
                dispatched = dispatch.processed,
                sent = dispatch.sent,
                failed = dispatch.failed,
                "Pipeline tick complete"
            );
        }

        Ok(())
    }
}
