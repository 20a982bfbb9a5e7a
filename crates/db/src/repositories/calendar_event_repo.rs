//! Repository for the `calendar_events` table (read-only).

use sqlx::PgPool;
use tandem_core::types::Timestamp;

use crate::models::calendar_event::{CalendarEvent, EVENT_STATUS_SCHEDULED};

/// Column list for `calendar_events` queries.
const COLUMNS: &str = "id, pair_id, title, starts_at, assignee, status, created_at";

/// Read access to calendar events.
pub struct CalendarEventRepo;

impl CalendarEventRepo {
    /// List actionable events starting within `[from, to]`, soonest first.
    pub async fn list_starting_between(
        pool: &PgPool,
        from: Timestamp,
        to: Timestamp,
    ) -> Result<Vec<CalendarEvent>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM calendar_events \
             WHERE status = $1 AND starts_at >= $2 AND starts_at <= $3 \
             ORDER BY starts_at"
        );
        sqlx::query_as::<_, CalendarEvent>(&query)
            .bind(EVENT_STATUS_SCHEDULED)
            .bind(from)
            .bind(to)
            .fetch_all(pool)
            .await
    }
}
