//! Repository for the `tasks` table (read-only).

use sqlx::PgPool;
use tandem_core::types::Timestamp;

use crate::models::task::{Task, TASK_STATUS_OPEN};

/// Column list for `tasks` queries.
const COLUMNS: &str = "id, pair_id, title, due_at, assignee, status, created_at";

/// Read access to tasks.
pub struct TaskRepo;

impl TaskRepo {
    /// List open tasks due within `[from, to]`, soonest first.
    pub async fn list_due_between(
        pool: &PgPool,
        from: Timestamp,
        to: Timestamp,
    ) -> Result<Vec<Task>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM tasks \
             WHERE status = $1 AND due_at >= $2 AND due_at <= $3 \
             ORDER BY due_at"
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(TASK_STATUS_OPEN)
            .bind(from)
            .bind(to)
            .fetch_all(pool)
            .await
    }
}
