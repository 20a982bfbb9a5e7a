//! Repository for the `notification_history` table (append-only).

use sqlx::PgPool;
use tandem_core::types::DbId;

use crate::models::history::NotificationHistory;

/// Column list for `notification_history` queries.
const COLUMNS: &str = "id, user_id, kind, title, message, channels_attempted, \
    channels_succeeded, status, data, created_at";

/// Append and read access to the delivery audit trail.
pub struct HistoryRepo;

impl HistoryRepo {
    /// Append a history row for a terminal delivery outcome, returning the
    /// generated ID.
    #[allow(clippy::too_many_arguments)]
    pub async fn insert(
        pool: &PgPool,
        user_id: DbId,
        kind: &str,
        title: &str,
        message: &str,
        channels_attempted: &[String],
        channels_succeeded: &[String],
        status: &str,
        data: &serde_json::Value,
    ) -> Result<DbId, sqlx::Error> {
        let attempted = serde_json::to_value(channels_attempted)
            .map_err(|e| sqlx::Error::Encode(Box::new(e)))?;
        let succeeded = serde_json::to_value(channels_succeeded)
            .map_err(|e| sqlx::Error::Encode(Box::new(e)))?;

        sqlx::query_scalar(
            "INSERT INTO notification_history \
                (user_id, kind, title, message, channels_attempted, \
                 channels_succeeded, status, data) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING id",
        )
        .bind(user_id)
        .bind(kind)
        .bind(title)
        .bind(message)
        .bind(attempted)
        .bind(succeeded)
        .bind(status)
        .bind(data)
        .fetch_one(pool)
        .await
    }

    /// List a user's history rows, newest first.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
        limit: i64,
    ) -> Result<Vec<NotificationHistory>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM notification_history \
             WHERE user_id = $1 \
             ORDER BY created_at DESC, id DESC \
             LIMIT $2"
        );
        sqlx::query_as::<_, NotificationHistory>(&query)
            .bind(user_id)
            .bind(limit)
            .fetch_all(pool)
            .await
    }
}
