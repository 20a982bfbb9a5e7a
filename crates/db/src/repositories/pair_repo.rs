//! Repository for the `pairs` and `pair_members` tables (read-only).

use sqlx::PgPool;
use tandem_core::types::DbId;

/// Read access to pair membership.
pub struct PairRepo;

impl PairRepo {
    /// List the active member user IDs of a pair, in join order.
    pub async fn member_ids(pool: &PgPool, pair_id: DbId) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT pm.user_id FROM pair_members pm \
             JOIN users u ON u.id = pm.user_id \
             WHERE pm.pair_id = $1 AND u.is_active = true \
             ORDER BY pm.user_id",
        )
        .bind(pair_id)
        .fetch_all(pool)
        .await
    }
}
