//! Notification history entity model (append-only).

use serde::Serialize;
use sqlx::FromRow;
use tandem_core::types::{DbId, Timestamp};

/// A row from the `notification_history` table. Written once per terminal
/// queue outcome and never updated.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct NotificationHistory {
    pub id: DbId,
    pub user_id: DbId,
    pub kind: String,
    pub title: String,
    pub message: String,
    /// JSONB array of channels the dispatcher tried.
    pub channels_attempted: serde_json::Value,
    /// JSONB array of channels that reported success.
    pub channels_succeeded: serde_json::Value,
    /// Terminal status: `sent` or `failed`.
    pub status: String,
    pub data: serde_json::Value,
    pub created_at: Timestamp,
}
