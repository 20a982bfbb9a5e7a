//! Repository for the `notification_preferences` table (read-only).

use sqlx::PgPool;
use tandem_core::types::DbId;

use crate::models::preference::NotificationPreference;

/// Column list for `notification_preferences` queries.
const COLUMNS: &str = "id, user_id, event_reminders, task_reminders, email_enabled, \
    push_enabled, quiet_hours_start, quiet_hours_end, timezone, created_at, updated_at";

/// Read access to notification preferences.
pub struct PreferenceRepo;

impl PreferenceRepo {
    /// Fetch the stored preference for a user.
    pub async fn get_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Option<NotificationPreference>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM notification_preferences WHERE user_id = $1");
        sqlx::query_as::<_, NotificationPreference>(&query)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Fetch the preference for a user, falling back to the all-enabled
    /// defaults when no row exists.
    pub async fn get_or_default(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<NotificationPreference, sqlx::Error> {
        Ok(Self::get_for_user(pool, user_id)
            .await?
            .unwrap_or_else(|| NotificationPreference::defaults_for(user_id)))
    }
}
