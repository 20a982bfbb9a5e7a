//! Reminder candidate generators.
//!
//! One run per domain (calendar events, tasks): scan items due within the
//! lookahead window, resolve eligible recipients and their preferences,
//! compute reminder instants from the configured offset schedule, and
//! idempotently enqueue notifications. An error resolving one item or one
//! recipient is logged and that unit skipped; the batch continues.

use serde::Serialize;
use tandem_core::quiet_hours::QuietHours;
use tandem_core::reminder::{plan_instants, PlannedInstant, ReminderKind};
use tandem_core::types::{DbId, Timestamp};
use tandem_db::models::preference::NotificationPreference;
use tandem_db::models::queue::NewQueuedNotification;
use tandem_db::repositories::{CalendarEventRepo, PairRepo, PreferenceRepo, QueueRepo, TaskRepo};
use tandem_db::DbPool;

use crate::config::ReminderConfig;

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// Summary of one generator run.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct GeneratorReport {
    /// Items found in the lookahead window.
    pub processed: u64,
    /// Queue rows actually inserted (deduplicated inserts not counted).
    pub queued: u64,
}

// ---------------------------------------------------------------------------
// Candidate item
// ---------------------------------------------------------------------------

/// Domain-neutral view of one due-soon item.
struct CandidateItem {
    kind: ReminderKind,
    id: DbId,
    pair_id: DbId,
    title: String,
    due_at: Timestamp,
    assignee: Option<DbId>,
}

// ---------------------------------------------------------------------------
// ReminderGenerator
// ---------------------------------------------------------------------------

/// Scans one domain for due-soon items and idempotently enqueues reminders.
pub struct ReminderGenerator {
    pool: DbPool,
    config: ReminderConfig,
}

impl ReminderGenerator {
    /// Create a generator over the given pool and tuning.
    pub fn new(pool: DbPool, config: ReminderConfig) -> Self {
        Self { pool, config }
    }

    /// Generate reminders for calendar events starting within the lookahead
    /// window from `now`.
    pub async fn run_events(&self, now: Timestamp) -> Result<GeneratorReport, sqlx::Error> {
        let window_end = now + self.config.lookahead;
        let events = CalendarEventRepo::list_starting_between(&self.pool, now, window_end).await?;

        let items = events.into_iter().map(|e| CandidateItem {
            kind: ReminderKind::EventReminder,
            id: e.id,
            pair_id: e.pair_id,
            title: e.title,
            due_at: e.starts_at,
            assignee: e.assignee,
        });
        let report = self.enqueue_batch(items, now).await;

        tracing::info!(
            processed = report.processed,
            queued = report.queued,
            "Event reminder generation complete"
        );
        Ok(report)
    }

    /// Generate reminders for open tasks due within the lookahead window
    /// from `now`.
    pub async fn run_tasks(&self, now: Timestamp) -> Result<GeneratorReport, sqlx::Error> {
        let window_end = now + self.config.lookahead;
        let tasks = TaskRepo::list_due_between(&self.pool, now, window_end).await?;

        let items = tasks.into_iter().map(|t| CandidateItem {
            kind: ReminderKind::TaskReminder,
            id: t.id,
            pair_id: t.pair_id,
            title: t.title,
            due_at: t.due_at,
            assignee: t.assignee,
        });
        let report = self.enqueue_batch(items, now).await;

        tracing::info!(
            processed = report.processed,
            queued = report.queued,
            "Task reminder generation complete"
        );
        Ok(report)
    }

    /// Process every item, isolating per-item failures.
    async fn enqueue_batch(
        &self,
        items: impl Iterator<Item = CandidateItem>,
        now: Timestamp,
    ) -> GeneratorReport {
        let mut report = GeneratorReport::default();
        for item in items {
            report.processed += 1;
            match self.enqueue_for_item(&item, now).await {
                Ok(queued) => report.queued += queued,
                Err(e) => {
                    tracing::warn!(
                        kind = %item.kind,
                        source_id = item.id,
                        error = %e,
                        "Skipping item after resolution error"
                    );
                }
            }
        }
        report
    }

    /// Enqueue all candidate reminders for one item.
    async fn enqueue_for_item(
        &self,
        item: &CandidateItem,
        now: Timestamp,
    ) -> Result<u64, sqlx::Error> {
        let planned = plan_instants(
            self.config.offsets_for(item.kind),
            item.due_at,
            now,
            self.config.dispatch_horizon,
        );
        if planned.is_empty() {
            return Ok(0);
        }

        // The explicit assignee if set, else every member of the owning pair.
        let recipients = match item.assignee {
            Some(user_id) => vec![user_id],
            None => PairRepo::member_ids(&self.pool, item.pair_id).await?,
        };

        let mut queued = 0;
        for user_id in recipients {
            match self.enqueue_for_recipient(item, user_id, &planned).await {
                Ok(n) => queued += n,
                Err(e) => {
                    tracing::warn!(
                        kind = %item.kind,
                        source_id = item.id,
                        user_id,
                        error = %e,
                        "Skipping recipient after resolution error"
                    );
                }
            }
        }
        Ok(queued)
    }

    /// Enqueue the planned instants for one recipient, honoring preferences
    /// and the dedup key.
    async fn enqueue_for_recipient(
        &self,
        item: &CandidateItem,
        user_id: DbId,
        planned: &[PlannedInstant],
    ) -> Result<u64, sqlx::Error> {
        let pref = PreferenceRepo::get_or_default(&self.pool, user_id).await?;
        if !pref.category_enabled(item.kind) {
            return Ok(0);
        }

        let mut queued = 0;
        for instant in planned {
            let channels = delivery_channels(&pref, instant.scheduled_for);
            if channels.is_empty() {
                continue;
            }
            let new = build_notification(item, user_id, channels, *instant);
            if QueueRepo::insert_if_absent(&self.pool, &new).await?.is_some() {
                queued += 1;
            }
        }
        Ok(queued)
    }
}

// ---------------------------------------------------------------------------
// Pure planning helpers
// ---------------------------------------------------------------------------

/// The channels a reminder at `instant` may use for this recipient.
///
/// Disabled channels are dropped; quiet hours additionally suppress push
/// (email is unaffected). An empty result means the recipient is skipped
/// for this instant.
fn delivery_channels(pref: &NotificationPreference, instant: Timestamp) -> Vec<String> {
    let mut channels = pref.enabled_channels();
    let quiet = QuietHours::from_preference(
        pref.quiet_hours_start.as_deref(),
        pref.quiet_hours_end.as_deref(),
        &pref.timezone,
    );
    if let Some(window) = quiet {
        if window.contains(instant) {
            channels.retain(|c| c != tandem_core::channels::CHANNEL_PUSH);
        }
    }
    channels
}

/// Human phrasing for an offset, e.g. "1 hour" or "15 minutes".
fn offset_phrase(minutes: i64) -> String {
    if minutes % 60 == 0 {
        let hours = minutes / 60;
        if hours == 1 {
            "1 hour".to_string()
        } else {
            format!("{hours} hours")
        }
    } else {
        format!("{minutes} minutes")
    }
}

/// Build the queue row DTO for one (item, recipient, instant) candidate.
fn build_notification(
    item: &CandidateItem,
    user_id: DbId,
    channels: Vec<String>,
    instant: PlannedInstant,
) -> NewQueuedNotification {
    let phrase = offset_phrase(instant.offset_minutes);
    let message = match item.kind {
        ReminderKind::EventReminder => format!("\"{}\" starts in {phrase}.", item.title),
        ReminderKind::TaskReminder => format!("\"{}\" is due in {phrase}.", item.title),
    };
    NewQueuedNotification {
        user_id,
        kind: item.kind.as_str().to_string(),
        title: format!("Reminder: {}", item.title),
        message,
        channels,
        scheduled_for: instant.scheduled_for,
        pair_id: Some(item.pair_id),
        source_id: item.id,
        offset_minutes: instant.offset_minutes as i32,
        data: serde_json::json!({
            "source_id": item.id,
            "offset_minutes": instant.offset_minutes,
            "due_at": item.due_at,
        }),
    }
}
