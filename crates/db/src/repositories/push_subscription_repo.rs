//! Repository for the `push_subscriptions` table (read-only).

use sqlx::PgPool;
use tandem_core::types::DbId;

use crate::models::push_subscription::PushSubscription;

/// Column list for `push_subscriptions` queries.
const COLUMNS: &str = "id, user_id, endpoint, auth, revoked, created_at";

/// Read access to push device subscriptions.
pub struct PushSubscriptionRepo;

impl PushSubscriptionRepo {
    /// List a user's non-revoked device subscriptions.
    pub async fn list_active_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<PushSubscription>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM push_subscriptions \
             WHERE user_id = $1 AND revoked = false \
             ORDER BY id"
        );
        sqlx::query_as::<_, PushSubscription>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }
}
