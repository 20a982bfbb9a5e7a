//! Task entity model (read-only to this subsystem).

use serde::Serialize;
use sqlx::FromRow;
use tandem_core::types::{DbId, Timestamp};

/// Lifecycle status in which a task is actionable for reminders.
pub const TASK_STATUS_OPEN: &str = "open";

/// A row from the `tasks` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Task {
    pub id: DbId,
    pub pair_id: DbId,
    pub title: String,
    pub due_at: Timestamp,
    /// When set, only this member is reminded; otherwise both pair members.
    pub assignee: Option<DbId>,
    pub status: String,
    pub created_at: Timestamp,
}
