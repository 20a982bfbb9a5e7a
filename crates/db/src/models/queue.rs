//! Queued notification entity model and insert DTO.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use tandem_core::types::{DbId, Timestamp};

/// Default attempts budget for a new queue row.
pub const DEFAULT_MAX_ATTEMPTS: i32 = 3;

/// A row from the `queued_notifications` table.
///
/// Created only by a candidate generator; mutated only by the dispatcher
/// (status, attempts, sent_at, claimed_at, error_message); never deleted by
/// this subsystem.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct QueuedNotification {
    pub id: DbId,
    pub user_id: DbId,
    /// `event_reminder` or `task_reminder`.
    pub kind: String,
    pub title: String,
    pub message: String,
    /// JSONB array of channel names; non-empty by construction.
    pub channels: serde_json::Value,
    pub scheduled_for: Timestamp,
    pub status: String,
    pub attempts: i32,
    pub max_attempts: i32,
    pub pair_id: Option<DbId>,
    /// The calendar event or task this reminder is about.
    pub source_id: DbId,
    /// Minutes before the item's due instant this reminder fires. Together
    /// with `user_id`, `kind`, and `source_id` this forms the dedup key.
    pub offset_minutes: i32,
    /// Payload snapshot delivered with the push channel and copied into
    /// history.
    pub data: serde_json::Value,
    pub error_message: Option<String>,
    pub sent_at: Option<Timestamp>,
    pub claimed_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

impl QueuedNotification {
    /// The requested channel names, decoded from the JSONB array.
    pub fn channel_list(&self) -> Vec<String> {
        serde_json::from_value(self.channels.clone()).unwrap_or_default()
    }
}

/// DTO for inserting a queue row.
#[derive(Debug, Clone, Deserialize)]
pub struct NewQueuedNotification {
    pub user_id: DbId,
    pub kind: String,
    pub title: String,
    pub message: String,
    pub channels: Vec<String>,
    pub scheduled_for: Timestamp,
    pub pair_id: Option<DbId>,
    pub source_id: DbId,
    pub offset_minutes: i32,
    pub data: serde_json::Value,
}
