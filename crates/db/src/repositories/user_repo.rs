//! Repository for the `users` table (read-only).

use sqlx::PgPool;
use tandem_core::types::DbId;

use crate::models::user::User;

/// Column list for `users` queries.
const COLUMNS: &str = "id, email, display_name, is_active, created_at";

/// Read access to user records.
pub struct UserRepo;

impl UserRepo {
    /// Fetch a user by ID.
    pub async fn get(pool: &PgPool, user_id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }
}
