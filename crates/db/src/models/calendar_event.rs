//! Calendar event entity model (read-only to this subsystem).

use serde::Serialize;
use sqlx::FromRow;
use tandem_core::types::{DbId, Timestamp};

/// Lifecycle status in which an event is actionable for reminders.
pub const EVENT_STATUS_SCHEDULED: &str = "scheduled";

/// A row from the `calendar_events` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CalendarEvent {
    pub id: DbId,
    pub pair_id: DbId,
    pub title: String,
    pub starts_at: Timestamp,
    /// When set, only this member is reminded; otherwise both pair members.
    pub assignee: Option<DbId>,
    pub status: String,
    pub created_at: Timestamp,
}
