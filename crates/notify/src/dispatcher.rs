//! Delivery dispatcher.
//!
//! Claims due, pending, under-budget queue rows and attempts delivery per
//! channel, updating row status and appending immutable history. Each run is
//! a short-lived batch; overlapping runs partition the due set through the
//! atomic claim in `QueueRepo`, so no row is ever handled twice at once.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{Duration, Utc};
use serde::Serialize;
use tandem_core::channels::{CHANNEL_EMAIL, CHANNEL_PUSH};
use tandem_core::queue::{STATUS_FAILED, STATUS_SENT};
use tandem_db::models::queue::QueuedNotification;
use tandem_db::repositories::{HistoryRepo, QueueRepo, UserRepo};
use tandem_db::DbPool;

use crate::config::ReminderConfig;
use crate::sender::{EmailSender, PushSender};

/// Failure reason when no requested channel has resolvable contact data.
const NO_CONTACT_INFO: &str = "no contact info";

// ---------------------------------------------------------------------------
// Report and per-row outcome
// ---------------------------------------------------------------------------

/// Summary of one dispatcher run.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct DispatchReport {
    /// Rows claimed by this run.
    pub processed: u64,
    /// Rows settled as sent.
    pub sent: u64,
    /// Rows settled as terminally failed.
    pub failed: u64,
    /// Rows requeued for a later retry.
    pub requeued: u64,
}

/// How one claimed row settled.
enum RowOutcome {
    Sent,
    Failed,
    Requeued,
}

/// Result of one channel attempt.
struct ChannelOutcome {
    channel: String,
    result: Result<(), String>,
}

// ---------------------------------------------------------------------------
// Dispatcher
// ---------------------------------------------------------------------------

/// Pulls due notifications from the queue and fans out to channel senders.
pub struct Dispatcher {
    pool: DbPool,
    email: Arc<dyn EmailSender>,
    push: Arc<dyn PushSender>,
    config: ReminderConfig,
}

impl Dispatcher {
    /// Create a dispatcher over the given pool, senders, and tuning.
    pub fn new(
        pool: DbPool,
        email: Arc<dyn EmailSender>,
        push: Arc<dyn PushSender>,
        config: ReminderConfig,
    ) -> Self {
        Self {
            pool,
            email,
            push,
            config,
        }
    }

    /// Run one dispatch batch.
    ///
    /// Releases expired claims from earlier truncated runs, claims up to the
    /// configured batch of due rows, and settles each independently. A
    /// failure settling one row never aborts the rest.
    pub async fn run(&self) -> Result<DispatchReport, sqlx::Error> {
        let released =
            QueueRepo::release_stale_claims(&self.pool, self.config.claim_lease_minutes).await?;
        if released > 0 {
            tracing::warn!(released, "Released stale claims from a truncated run");
        }

        let batch = QueueRepo::claim_due_batch(&self.pool, self.config.batch_limit).await?;

        let mut report = DispatchReport::default();
        for row in &batch {
            report.processed += 1;
            match self.process_row(row).await {
                Ok(RowOutcome::Sent) => report.sent += 1,
                Ok(RowOutcome::Failed) => report.failed += 1,
                Ok(RowOutcome::Requeued) => report.requeued += 1,
                Err(e) => {
                    // The row stays `processing`; the lease will release it
                    // for a later run.
                    tracing::error!(
                        notification_id = row.id,
                        error = %e,
                        "Failed to settle notification"
                    );
                }
            }
        }

        tracing::info!(
            processed = report.processed,
            sent = report.sent,
            failed = report.failed,
            requeued = report.requeued,
            "Dispatch batch complete"
        );
        Ok(report)
    }

    /// Attempt delivery for one claimed row and settle it.
    async fn process_row(&self, row: &QueuedNotification) -> Result<RowOutcome, sqlx::Error> {
        let requested = row.channel_list();

        // Resolve email contact data up front. Push resolution is owned by
        // the push sender (device-subscription lookup).
        let email_address = if requested.iter().any(|c| c == CHANNEL_EMAIL) {
            UserRepo::get(&self.pool, row.user_id)
                .await?
                .and_then(|u| u.email)
        } else {
            None
        };

        let email_resolvable = email_address.is_some();
        let any_resolvable = requested
            .iter()
            .any(|c| c == CHANNEL_PUSH || (c == CHANNEL_EMAIL && email_resolvable));

        if !any_resolvable {
            // No sender is invoked at all.
            QueueRepo::mark_failed(&self.pool, row.id, NO_CONTACT_INFO).await?;
            self.record_history(row, &requested, &[], STATUS_FAILED).await;
            tracing::warn!(
                notification_id = row.id,
                user_id = row.user_id,
                "Notification failed: no resolvable contact data"
            );
            return Ok(RowOutcome::Failed);
        }

        // Attempt every requested channel independently; a hung or failing
        // channel is isolated to its own outcome.
        let mut outcomes = Vec::with_capacity(requested.len());
        for channel in &requested {
            let outcome = if channel == CHANNEL_EMAIL && !email_resolvable {
                ChannelOutcome {
                    channel: channel.clone(),
                    result: Err("no email address on file".to_string()),
                }
            } else {
                self.attempt_channel(channel, row, email_address.as_deref())
                    .await
            };
            if let Err(reason) = &outcome.result {
                tracing::warn!(
                    notification_id = row.id,
                    channel = %outcome.channel,
                    error = %reason,
                    "Channel attempt failed"
                );
            }
            outcomes.push(outcome);
        }

        let succeeded = succeeded_channels(&outcomes);
        if !succeeded.is_empty() {
            QueueRepo::mark_sent(&self.pool, row.id).await?;
            self.record_history(row, &requested, &succeeded, STATUS_SENT).await;
            return Ok(RowOutcome::Sent);
        }

        let joined = join_failures(&outcomes);
        let attempts_after = row.attempts + 1;
        if attempts_after < row.max_attempts {
            let delay = retry_delay(attempts_after, self.config.retry_backoff_minutes);
            QueueRepo::requeue_for_retry(&self.pool, row.id, Utc::now() + delay, &joined).await?;
            tracing::info!(
                notification_id = row.id,
                attempts = attempts_after,
                backoff_minutes = delay.num_minutes(),
                "All channels failed, requeued for retry"
            );
            Ok(RowOutcome::Requeued)
        } else {
            QueueRepo::mark_failed(&self.pool, row.id, &joined).await?;
            self.record_history(row, &requested, &[], STATUS_FAILED).await;
            Ok(RowOutcome::Failed)
        }
    }

    /// Invoke the matching sender for one channel under the send timeout.
    async fn attempt_channel(
        &self,
        channel: &str,
        row: &QueuedNotification,
        email_address: Option<&str>,
    ) -> ChannelOutcome {
        let bound = StdDuration::from_secs(self.config.send_timeout_secs);
        let result = match channel {
            CHANNEL_EMAIL => {
                // Resolvability was checked by the caller.
                let to = email_address.unwrap_or_default();
                match tokio::time::timeout(bound, self.email.send(to, &row.title, &row.message))
                    .await
                {
                    Ok(Ok(())) => Ok(()),
                    Ok(Err(e)) => Err(e.to_string()),
                    Err(_) => Err(format!("timed out after {}s", bound.as_secs())),
                }
            }
            CHANNEL_PUSH => {
                let send = self
                    .push
                    .send(row.user_id, &row.title, &row.message, &row.data);
                match tokio::time::timeout(bound, send).await {
                    Ok(Ok(receipt)) if receipt.is_delivered() => Ok(()),
                    Ok(Ok(receipt)) => Err(if receipt.errors.is_empty() {
                        "no devices accepted the push".to_string()
                    } else {
                        receipt.errors.join("; ")
                    }),
                    Ok(Err(e)) => Err(e.to_string()),
                    Err(_) => Err(format!("timed out after {}s", bound.as_secs())),
                }
            }
            other => Err(format!("unknown channel: {other}")),
        };
        ChannelOutcome {
            channel: channel.to_string(),
            result,
        }
    }

    /// Append a history row; history failures are logged, never fatal.
    async fn record_history(
        &self,
        row: &QueuedNotification,
        attempted: &[String],
        succeeded: &[String],
        status: &str,
    ) {
        if let Err(e) = HistoryRepo::insert(
            &self.pool,
            row.user_id,
            &row.kind,
            &row.title,
            &row.message,
            attempted,
            succeeded,
            status,
            &row.data,
        )
        .await
        {
            tracing::error!(
                notification_id = row.id,
                error = %e,
                "Failed to append notification history"
            );
        }
    }
}

// ---------------------------------------------------------------------------
// Pure outcome helpers
// ---------------------------------------------------------------------------

/// The channels that reported success.
fn succeeded_channels(outcomes: &[ChannelOutcome]) -> Vec<String> {
    outcomes
        .iter()
        .filter(|o| o.result.is_ok())
        .map(|o| o.channel.clone())
        .collect()
}

/// Join per-channel failure messages into one `error_message` value.
fn join_failures(outcomes: &[ChannelOutcome]) -> String {
    outcomes
        .iter()
        .filter_map(|o| {
            o.result
                .as_ref()
                .err()
                .map(|reason| format!("{}: {reason}", o.channel))
        })
        .collect::<Vec<_>>()
        .join("; ")
}

/// Linear backoff before the next retry: `attempts * step` minutes.
fn retry_delay(attempts: i32, step_minutes: i64) -> Duration {
    Duration::minutes(attempts as i64 * step_minutes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ok(channel: &str) -> ChannelOutcome {
        ChannelOutcome {
            channel: channel.to_string(),
            result: Ok(()),
        }
    }

    fn err(channel: &str, reason: &str) -> ChannelOutcome {
        ChannelOutcome {
            channel: channel.to_string(),
            result: Err(reason.to_string()),
        }
    }

    #[test]
    fn succeeded_channels_keeps_order() {
        let outcomes = [err("email", "timeout"), ok("push")];
        assert_eq!(succeeded_channels(&outcomes), vec!["push"]);
    }

    #[test]
    fn join_failures_names_each_channel() {
        let outcomes = [err("email", "timed out after 10s"), err("push", "no devices")];
        assert_eq!(
            join_failures(&outcomes),
            "email: timed out after 10s; push: no devices"
        );
    }

    #[test]
    fn join_failures_skips_successes() {
        let outcomes = [ok("email"), err("push", "gone")];
        assert_eq!(join_failures(&outcomes), "push: gone");
    }

    #[test]
    fn retry_delay_grows_linearly() {
        assert_eq!(retry_delay(1, 5), Duration::minutes(5));
        assert_eq!(retry_delay(2, 5), Duration::minutes(10));
    }
}
