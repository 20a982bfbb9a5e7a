//! Repository for the `queued_notifications` table.
//!
//! This is the only shared mutable state of the reminder pipeline. The
//! discipline is "claim, then mutate" per row: [`QueueRepo::claim_due_batch`]
//! atomically flips due pending rows to `processing`, and every settling
//! update is conditional on the row still being `processing`, so overlapping
//! dispatcher runs never double-handle a row.

use sqlx::PgPool;
use tandem_core::queue::{STATUS_FAILED, STATUS_PENDING, STATUS_PROCESSING, STATUS_SENT};
use tandem_core::types::{DbId, Timestamp};

use crate::models::queue::{NewQueuedNotification, QueuedNotification, DEFAULT_MAX_ATTEMPTS};

/// Column list for `queued_notifications` queries.
const COLUMNS: &str = "id, user_id, kind, title, message, channels, scheduled_for, status, \
    attempts, max_attempts, pair_id, source_id, offset_minutes, data, error_message, \
    sent_at, claimed_at, created_at";

/// Queue operations for the generators (insert) and dispatcher (claim,
/// settle).
pub struct QueueRepo;

impl QueueRepo {
    /// Whether a row already exists for the dedup key
    /// `(user_id, kind, source_id, offset_minutes)`.
    pub async fn exists(
        pool: &PgPool,
        user_id: DbId,
        kind: &str,
        source_id: DbId,
        offset_minutes: i32,
    ) -> Result<bool, sqlx::Error> {
        let found: Option<DbId> = sqlx::query_scalar(
            "SELECT id FROM queued_notifications \
             WHERE user_id = $1 AND kind = $2 AND source_id = $3 AND offset_minutes = $4",
        )
        .bind(user_id)
        .bind(kind)
        .bind(source_id)
        .bind(offset_minutes)
        .fetch_optional(pool)
        .await?;
        Ok(found.is_some())
    }

    /// Insert a pending row unless the dedup key already exists.
    ///
    /// The unique index `uq_queued_notifications_dedup` backstops the
    /// existence check: `ON CONFLICT DO NOTHING` makes a concurrent
    /// duplicate insert a no-op rather than an error. Returns the new ID,
    /// or `None` when the row was deduplicated.
    pub async fn insert_if_absent(
        pool: &PgPool,
        new: &NewQueuedNotification,
    ) -> Result<Option<DbId>, sqlx::Error> {
        if Self::exists(pool, new.user_id, &new.kind, new.source_id, new.offset_minutes).await? {
            return Ok(None);
        }

        let channels = serde_json::to_value(&new.channels)
            .map_err(|e| sqlx::Error::Encode(Box::new(e)))?;

        sqlx::query_scalar(
            "INSERT INTO queued_notifications \
                (user_id, kind, title, message, channels, scheduled_for, status, \
                 max_attempts, pair_id, source_id, offset_minutes, data) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) \
             ON CONFLICT (user_id, kind, source_id, offset_minutes) DO NOTHING \
             RETURNING id",
        )
        .bind(new.user_id)
        .bind(&new.kind)
        .bind(&new.title)
        .bind(&new.message)
        .bind(channels)
        .bind(new.scheduled_for)
        .bind(STATUS_PENDING)
        .bind(DEFAULT_MAX_ATTEMPTS)
        .bind(new.pair_id)
        .bind(new.source_id)
        .bind(new.offset_minutes)
        .bind(&new.data)
        .fetch_optional(pool)
        .await
    }

    /// Atomically claim up to `limit` due rows for processing.
    ///
    /// Selects `pending` rows with `scheduled_for <= NOW()` and attempts
    /// budget remaining, most urgent first, and flips them to `processing`
    /// in the same statement. `FOR UPDATE SKIP LOCKED` makes concurrent
    /// dispatcher runs partition the due set instead of blocking or
    /// double-claiming.
    pub async fn claim_due_batch(
        pool: &PgPool,
        limit: i64,
    ) -> Result<Vec<QueuedNotification>, sqlx::Error> {
        let query = format!(
            "UPDATE queued_notifications q \
             SET status = $1, claimed_at = NOW() \
             WHERE q.id IN ( \
                 SELECT id FROM queued_notifications \
                 WHERE status = $2 AND scheduled_for <= NOW() AND attempts < max_attempts \
                 ORDER BY scheduled_for \
                 LIMIT $3 \
                 FOR UPDATE SKIP LOCKED \
             ) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, QueuedNotification>(&query)
            .bind(STATUS_PROCESSING)
            .bind(STATUS_PENDING)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Release `processing` rows whose claim lease has expired.
    ///
    /// A dispatcher run killed mid-batch leaves its claimed rows in
    /// `processing`; once `claimed_at` is older than `lease_minutes` they go
    /// back to `pending` for the next run. Returns the number of rows
    /// released.
    pub async fn release_stale_claims(
        pool: &PgPool,
        lease_minutes: i64,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE queued_notifications \
             SET status = $1, claimed_at = NULL \
             WHERE status = $2 \
               AND claimed_at < NOW() - make_interval(mins => $3)",
        )
        .bind(STATUS_PENDING)
        .bind(STATUS_PROCESSING)
        .bind(lease_minutes as i32)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Settle a claimed row as sent.
    ///
    /// Conditional on the row still being `processing`; returns `false` when
    /// another actor already settled it.
    pub async fn mark_sent(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE queued_notifications \
             SET status = $1, sent_at = NOW(), attempts = attempts + 1, \
                 claimed_at = NULL, error_message = NULL \
             WHERE id = $2 AND status = $3",
        )
        .bind(STATUS_SENT)
        .bind(id)
        .bind(STATUS_PROCESSING)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Requeue a claimed row for a later retry after an all-channel failure.
    pub async fn requeue_for_retry(
        pool: &PgPool,
        id: DbId,
        next_attempt_at: Timestamp,
        error_message: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE queued_notifications \
             SET status = $1, scheduled_for = $2, attempts = attempts + 1, \
                 claimed_at = NULL, error_message = $3 \
             WHERE id = $4 AND status = $5",
        )
        .bind(STATUS_PENDING)
        .bind(next_attempt_at)
        .bind(error_message)
        .bind(id)
        .bind(STATUS_PROCESSING)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Settle a claimed row as terminally failed.
    pub async fn mark_failed(
        pool: &PgPool,
        id: DbId,
        error_message: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE queued_notifications \
             SET status = $1, attempts = attempts + 1, claimed_at = NULL, \
                 error_message = $2 \
             WHERE id = $3 AND status = $4",
        )
        .bind(STATUS_FAILED)
        .bind(error_message)
        .bind(id)
        .bind(STATUS_PROCESSING)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Fetch a row by ID.
    pub async fn get(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<QueuedNotification>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM queued_notifications WHERE id = $1");
        sqlx::query_as::<_, QueuedNotification>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
