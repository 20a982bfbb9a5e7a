//! User entity model (read-only to this subsystem).

use serde::Serialize;
use sqlx::FromRow;
use tandem_core::types::{DbId, Timestamp};

/// A row from the `users` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: DbId,
    /// Missing when the account was created through a channel that never
    /// collected an address; the email channel is unresolvable then.
    pub email: Option<String>,
    pub display_name: String,
    pub is_active: bool,
    pub created_at: Timestamp,
}
